// ── Core error types ──
//
// Errors the engine and its callers reason about. Transport details are
// folded into a small taxonomy: fatal classes abort a run before the
// device loop, per-device classes are caught at the loop boundary and
// turned into report lines.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fatal: abort before any device is processed ──────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Scope {scope} could not be resolved: {reason}")]
    SourceUnavailable { scope: String, reason: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Cannot connect to Jamf Pro: {reason}")]
    Connection { reason: String },

    #[error("Request to Jamf Pro timed out")]
    Timeout,

    // ── Per-device: recorded, then the run continues ─────────────────
    #[error("Device {id} could not be read: {message}")]
    DeviceUnreadable {
        id: String,
        /// HTTP status of the failed read, when the server answered.
        status: Option<u16>,
        message: String,
    },

    #[error("Write of {attribute} on device {id} rejected: {message}")]
    WriteRejected {
        id: String,
        attribute: String,
        status: Option<u16>,
        message: String,
    },

    // ── Everything else ──────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
}

impl CoreError {
    /// Whether this error ends the run instead of a single device.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::SourceUnavailable { .. }
                | Self::Authentication { .. }
                | Self::Connection { .. }
                | Self::Timeout
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::DeviceUnreadable { status, .. }
            | Self::WriteRejected { status, .. }
            | Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<jamfsync_api::Error> for CoreError {
    fn from(err: jamfsync_api::Error) -> Self {
        match err {
            jamfsync_api::Error::Authentication { message } => CoreError::Authentication { message },
            jamfsync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::Connection {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map(|s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            jamfsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            jamfsync_api::Error::Tls(msg) => CoreError::Connection {
                reason: format!("TLS error: {msg}"),
            },
            jamfsync_api::Error::Api { status, message } => CoreError::Api {
                status: Some(status),
                message,
            },
            jamfsync_api::Error::Deserialization { message, .. } => CoreError::Api {
                status: None,
                message: format!("Unexpected response: {message}"),
            },
        }
    }
}
