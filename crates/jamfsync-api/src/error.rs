use thiserror::Error;

/// Top-level error type for the `jamfsync-api` crate.
///
/// Covers every failure mode across both API surfaces: OAuth token
/// exchange, transport, Classic (`/JSSResource`) and Pro (`/api`) calls.
/// `jamfsync-core` maps these into the reconciliation error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed or the server rejected the bearer token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status from either API surface.
    ///
    /// `message` holds a bounded preview of the response body. The
    /// Classic API answers errors with a small HTML page, the Pro API
    /// with a JSON `errors` array.
    #[error("Jamf Pro API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the token was rejected or could not be obtained.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the API client lacks the privilege for the call.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Returns `true` for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status == 503,
            _ => false,
        }
    }
}

/// Bounded, char-boundary-safe preview of a response body for error messages.
pub(crate) fn body_preview(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= LIMIT {
        trimmed.to_owned()
    } else {
        let mut preview: String = trimmed.chars().take(LIMIT).collect();
        preview.push('…');
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let not_found = Error::Api {
            status: 404,
            message: "Not Found".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_server_error());

        let forbidden = Error::Api {
            status: 403,
            message: "Forbidden".into(),
        };
        assert!(forbidden.is_forbidden());

        let unavailable = Error::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(unavailable.is_server_error());
        assert!(unavailable.is_transient());
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "é".repeat(300);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), 201);
        assert!(preview.ends_with('…'));
        assert_eq!(body_preview("  short  "), "short");
    }
}
