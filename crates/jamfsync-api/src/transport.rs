// HTTP settings for talking to a Jamf Pro server
//
// Jamf Cloud tenants present publicly trusted certificates. On-premises
// servers frequently sit behind an internal CA or a self-signed
// certificate, which `TlsMode` covers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the server certificate is verified.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    #[default]
    System,
    /// Trust an additional CA from a PEM file.
    CustomCa(PathBuf),
    /// Skip verification entirely (`--insecure`).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// The single HTTP client both API surfaces and the token exchange use.
    pub fn http_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("jamfsync/", env!("CARGO_PKG_VERSION")));

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(read_ca_certificate(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot set up HTTP client: {e}")))
    }
}

fn read_ca_certificate(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA certificate {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}
