//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use jamfsync_config::ConfigError;
use jamfsync_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    /// Raised by clap itself on bad arguments.
    #[allow(dead_code)]
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const SCOPE: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
    pub const DEVICE_ERRORS: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting `{key}`")]
    #[diagnostic(
        code(jamfsync::config_missing),
        help(
            "Set {env} in the environment or `{key}` in the config file.\n\
             Config file: {path}"
        )
    )]
    ConfigMissing {
        key: String,
        env: String,
        path: String,
    },

    #[error("Invalid value for {key}: {reason}")]
    #[diagnostic(code(jamfsync::config_invalid))]
    ConfigInvalid { key: String, reason: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(jamfsync::no_config),
        help("Check the --config path, or omit it to use the default location.")
    )]
    NoConfig { path: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(jamfsync::config))]
    Config { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Jamf Pro")]
    #[diagnostic(
        code(jamfsync::connection_failed),
        help(
            "Check that the server URL is right and reachable.\n\
             Self-signed certificate? Try --insecure or set ca_cert."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to Jamf Pro timed out")]
    #[diagnostic(
        code(jamfsync::timeout),
        help("Increase the timeout with --timeout or JAMF_TIMEOUT.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(jamfsync::auth_failed),
        help(
            "Verify JAMF_CLIENT_ID and JAMF_CLIENT_SECRET.\n\
             The API client needs read and update privileges for the inventory it touches."
        )
    )]
    AuthFailed { message: String },

    // ── Scope ────────────────────────────────────────────────────────
    #[error("Could not enumerate {scope}")]
    #[diagnostic(
        code(jamfsync::scope_unavailable),
        help("Check the static group id and that the API client can read it.\n{reason}")
    )]
    ScopeUnavailable { scope: String, reason: String },

    // ── Run outcome ──────────────────────────────────────────────────
    #[error("Completed with errors: {errored} device(s) failed, {partial} partially updated")]
    #[diagnostic(
        code(jamfsync::device_errors),
        help("Each failing device is listed above and in the log file.")
    )]
    DeviceErrors { errored: usize, partial: usize },

    #[error("{command} was rejected for all {devices} device(s): {message}")]
    #[diagnostic(code(jamfsync::command_rejected))]
    CommandRejected {
        command: String,
        devices: usize,
        message: String,
    },

    #[error("Interrupted before every device was processed")]
    #[diagnostic(
        code(jamfsync::cancelled),
        help("Devices already written stay written; rerun to finish the rest.")
    )]
    Cancelled,

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(jamfsync::api_error))]
    ApiError { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigMissing { .. }
            | Self::ConfigInvalid { .. }
            | Self::NoConfig { .. }
            | Self::Config { .. } => exit_code::CONFIG,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ScopeUnavailable { .. } => exit_code::SCOPE,
            Self::DeviceErrors { .. } | Self::CommandRejected { .. } => exit_code::DEVICE_ERRORS,
            Self::Cancelled | Self::ApiError { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { key, env } => CliError::ConfigMissing {
                key,
                env,
                path: jamfsync_config::config_path()
                    .map_or_else(|| "(none)".into(), |p| p.display().to_string()),
            },
            ConfigError::Invalid { key, reason } => CliError::ConfigInvalid { key, reason },
            ConfigError::NotFound(path) => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Figment(err) => CliError::Config {
                message: err.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Config { message },

            CoreError::SourceUnavailable { scope, reason } => {
                CliError::ScopeUnavailable { scope, reason }
            }

            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::Connection { reason } => CliError::ConnectionFailed {
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            err @ (CoreError::DeviceUnreadable { .. }
            | CoreError::WriteRejected { .. }
            | CoreError::Api { .. }) => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classes_have_distinct_exit_codes() {
        let auth = CliError::from(CoreError::Authentication {
            message: "invalid_client".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let scope = CliError::from(CoreError::SourceUnavailable {
            scope: "group 42".into(),
            reason: "404".into(),
        });
        assert_eq!(scope.exit_code(), exit_code::SCOPE);

        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::from(CoreError::Connection {
                reason: "refused".into()
            })
            .exit_code(),
            exit_code::CONNECTION
        );
    }

    #[test]
    fn missing_setting_names_the_variable() {
        let err = CliError::from(ConfigError::Missing {
            key: "client_secret".into(),
            env: "JAMF_CLIENT_SECRET".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert!(matches!(err, CliError::ConfigMissing { ref env, .. } if env == "JAMF_CLIENT_SECRET"));
    }

    #[test]
    fn invalid_server_url_is_a_config_error() {
        let err = CliError::from(CoreError::Config {
            message: "Invalid URL: relative URL without a base".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn per_device_failures_exit_ten() {
        let err = CliError::DeviceErrors {
            errored: 1,
            partial: 0,
        };
        assert_eq!(err.exit_code(), exit_code::DEVICE_ERRORS);
    }
}
