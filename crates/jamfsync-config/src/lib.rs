//! Settings for jamfsync.
//!
//! Layered with figment, lowest to highest: built-in defaults, the TOML
//! config file, `JSS_*` then `JAMF_*` environment variables, and finally
//! command-line overrides. Commands ask for exactly the settings they
//! need (`require_*`), so a missing value fails before any network call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use jamfsync_api::{ClientCredentials, TlsMode, TransportConfig};
use jamfsync_core::{AttributeTarget, DeviceKind};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{key}` (set {env} or `{key}` in the config file)")]
    Missing { key: String, env: String },

    #[error("invalid {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl ConfigError {
    fn missing(key: &str) -> Self {
        Self::Missing {
            key: key.to_owned(),
            env: format!("JAMF_{}", key.to_uppercase()),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Lenient scalars ─────────────────────────────────────────────────

/// Environment values like `42` arrive as numbers; ids and names are
/// strings regardless.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Flag(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()))
}

fn lenient_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(lenient_string(deserializer)?.map(SecretString::from))
}

// ── Settings ────────────────────────────────────────────────────────

fn default_timeout() -> u64 {
    30
}

fn default_log_file() -> PathBuf {
    PathBuf::from("output.log")
}

/// Every setting jamfsync understands. All are optional at load time.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Server root, e.g. `https://example.jamfcloud.com`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub client_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_secret")]
    pub client_secret: Option<SecretString>,

    /// Computer static group.
    #[serde(default, deserialize_with = "lenient_string")]
    pub static_group_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile_static_group_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_name_1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_id_1: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_name_2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub xea_id_2: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile_xea_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile_xea_id: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// PEM file with an extra trusted CA.
    pub ca_cert: Option<PathBuf>,

    /// Persistent log, truncated at the start of each run.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

/// Values given on the command line; `None` leaves lower layers alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Which configured custom attribute a command writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSlot {
    /// `xea_name` / `xea_id`
    Primary,
    /// `xea_name_1` / `xea_id_1`
    First,
    /// `xea_name_2` / `xea_id_2`
    Second,
    /// `mobile_xea_name` / `mobile_xea_id`
    Mobile,
}

impl AttributeSlot {
    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Self::Primary => ("xea_name", "xea_id"),
            Self::First => ("xea_name_1", "xea_id_1"),
            Self::Second => ("xea_name_2", "xea_id_2"),
            Self::Mobile => ("mobile_xea_name", "mobile_xea_id"),
        }
    }
}

/// Everything needed to build a `JamfClient`.
#[derive(Debug)]
pub struct Connection {
    pub url: Url,
    pub credentials: ClientCredentials,
    pub transport: TransportConfig,
}

impl Settings {
    pub fn require_connection(&self) -> Result<Connection, ConfigError> {
        let raw = self.url.as_deref().ok_or_else(|| ConfigError::missing("url"))?;
        let url = parse_server_url(raw)?;
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| ConfigError::missing("client_id"))?;
        let client_secret = self
            .client_secret
            .clone()
            .ok_or_else(|| ConfigError::missing("client_secret"))?;

        Ok(Connection {
            url,
            credentials: ClientCredentials::new(client_id, client_secret),
            transport: self.transport(),
        })
    }

    /// Static group id for the given inventory.
    pub fn require_group(&self, kind: DeviceKind) -> Result<String, ConfigError> {
        let (key, value) = match kind {
            DeviceKind::Computer => ("static_group_id", &self.static_group_id),
            DeviceKind::MobileDevice => ("mobile_static_group_id", &self.mobile_static_group_id),
        };
        value.clone().ok_or_else(|| ConfigError::missing(key))
    }

    pub fn require_attribute(&self, slot: AttributeSlot) -> Result<AttributeTarget, ConfigError> {
        let (name_key, id_key) = slot.keys();
        let (name, id) = self.slot_values(slot);
        let name = name.ok_or_else(|| ConfigError::missing(name_key))?;
        let id = id.ok_or_else(|| ConfigError::missing(id_key))?;
        Ok(AttributeTarget::new(name, id))
    }

    /// The attribute in `slot`, if both its name and id are set.
    pub fn attribute(&self, slot: AttributeSlot) -> Option<AttributeTarget> {
        match self.slot_values(slot) {
            (Some(name), Some(id)) => Some(AttributeTarget::new(name, id)),
            _ => None,
        }
    }

    fn slot_values(&self, slot: AttributeSlot) -> (Option<String>, Option<String>) {
        let (name, id) = match slot {
            AttributeSlot::Primary => (&self.xea_name, &self.xea_id),
            AttributeSlot::First => (&self.xea_name_1, &self.xea_id_1),
            AttributeSlot::Second => (&self.xea_name_2, &self.xea_id_2),
            AttributeSlot::Mobile => (&self.mobile_xea_name, &self.mobile_xea_id),
        };
        (name.clone(), id.clone())
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ca) = &self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Accept bare hosts (`jss.example.edu:8443`) by assuming HTTPS.
fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate).map_err(|e| ConfigError::Invalid {
        key: "url".into(),
        reason: format!("{raw}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: "url".into(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

// ── Loading ─────────────────────────────────────────────────────────

/// Platform config file location, e.g. `~/.config/jamfsync/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "jamfsync", "jamfsync").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load settings. An explicit `path` must exist; the default location
/// is optional.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
        Some(p) => Some(p.to_path_buf()),
        None => config_path(),
    };

    let mut figment = Figment::new();
    if let Some(file) = file {
        figment = figment.merge(Toml::file(file));
    }
    let settings = figment
        .merge(Env::prefixed("JSS_"))
        .merge(Env::prefixed("JAMF_"))
        .merge(Serialized::defaults(overrides))
        .extract()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn load_in(jail: &Jail, overrides: &Overrides) -> Result<Settings, figment::Error> {
        let path = jail.directory().join("jamfsync.toml");
        if !path.exists() {
            jail.create_file("jamfsync.toml", "")?;
        }
        load(Some(&path), overrides).map_err(|e| figment::Error::from(e.to_string()))
    }

    #[test]
    fn environment_values_load() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JAMF_URL", "https://example.jamfcloud.com");
            jail.set_env("JAMF_CLIENT_ID", "a1b2c3");
            jail.set_env("JAMF_CLIENT_SECRET", "s3cret");
            jail.set_env("JAMF_STATIC_GROUP_ID", "42");
            jail.set_env("JAMF_xEA_NAME", "Jamf Site");
            jail.set_env("JAMF_xEA_ID", "12");

            let settings = load_in(jail, &Overrides::default())?;

            assert_eq!(settings.require_group(DeviceKind::Computer).unwrap(), "42");
            assert_eq!(
                settings.require_attribute(AttributeSlot::Primary).unwrap(),
                AttributeTarget::new("Jamf Site", "12")
            );
            let connection = settings.require_connection().unwrap();
            assert_eq!(connection.url.as_str(), "https://example.jamfcloud.com/");
            assert_eq!(connection.credentials.client_secret.expose_secret(), "s3cret");
            Ok(())
        });
    }

    #[test]
    fn defaults_apply() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let settings = load_in(jail, &Overrides::default())?;

            assert_eq!(settings.timeout, 30);
            assert!(!settings.insecure);
            assert_eq!(settings.log_file, PathBuf::from("output.log"));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "jamfsync.toml",
                r#"
                    url = "https://file.example.com"
                    client_id = "from-file"
                    timeout = 10
                "#,
            )?;
            jail.set_env("JAMF_URL", "https://env.example.com");

            let settings = load_in(jail, &Overrides::default())?;

            assert_eq!(settings.url.as_deref(), Some("https://env.example.com"));
            assert_eq!(settings.client_id.as_deref(), Some("from-file"));
            assert_eq!(settings.timeout, 10);
            Ok(())
        });
    }

    #[test]
    fn jamf_prefix_wins_over_jss_prefix() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JSS_URL", "https://jss.example.edu:8443");
            jail.set_env("JSS_CLIENT_ID", "legacy-id");
            jail.set_env("JAMF_CLIENT_ID", "current-id");

            let settings = load_in(jail, &Overrides::default())?;

            assert_eq!(settings.url.as_deref(), Some("https://jss.example.edu:8443"));
            assert_eq!(settings.client_id.as_deref(), Some("current-id"));
            Ok(())
        });
    }

    #[test]
    fn command_line_overrides_everything() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JAMF_TIMEOUT", "60");
            let overrides = Overrides {
                timeout: Some(5),
                insecure: Some(true),
                ..Overrides::default()
            };

            let settings = load_in(jail, &overrides)?;

            assert_eq!(settings.timeout, 5);
            assert!(matches!(settings.transport().tls, TlsMode::DangerAcceptInvalid));
            Ok(())
        });
    }

    #[test]
    fn missing_secret_names_the_variable() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JAMF_URL", "https://example.jamfcloud.com");
            jail.set_env("JAMF_CLIENT_ID", "a1b2c3");

            let settings = load_in(jail, &Overrides::default())?;
            let err = settings.require_connection().unwrap_err();

            assert!(
                matches!(err, ConfigError::Missing { ref key, ref env } if key == "client_secret" && env == "JAMF_CLIENT_SECRET")
            );
            Ok(())
        });
    }

    #[test]
    fn attribute_needs_name_and_id() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JAMF_xEA_NAME_2", "Previous Inventory Date");

            let settings = load_in(jail, &Overrides::default())?;

            assert!(settings.attribute(AttributeSlot::Second).is_none());
            let err = settings.require_attribute(AttributeSlot::Second).unwrap_err();
            assert_eq!(
                err.to_string(),
                "missing required setting `xea_id_2` (set JAMF_XEA_ID_2 or `xea_id_2` in the config file)"
            );
            Ok(())
        });
    }

    #[test]
    fn blank_values_count_as_missing() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JAMF_MOBILE_STATIC_GROUP_ID", "  ");

            let settings = load_in(jail, &Overrides::default())?;

            assert!(settings.require_group(DeviceKind::MobileDevice).is_err());
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = load(Some(Path::new("/nonexistent/jamfsync.toml")), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn server_url_forms() {
        assert_eq!(
            parse_server_url("jss.example.edu:8443").unwrap().as_str(),
            "https://jss.example.edu:8443/"
        );
        assert_eq!(
            parse_server_url("http://localhost:8080").unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert!(parse_server_url("ftp://example.com").is_err());
    }
}
