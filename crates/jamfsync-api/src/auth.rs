// OAuth client-credentials authentication
//
// Jamf Pro API clients exchange a client id + secret for a short-lived
// bearer token at `/api/oauth/token`. The token is shared by Classic and
// Pro calls; it is fetched on first use and refreshed shortly before it
// expires.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::{JamfClient, check_status};
use crate::error::Error;

/// Refresh the token this long before the server-reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// API client credentials (Settings > API Roles and Clients).
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// A cached bearer token with its local expiry deadline.
pub(crate) struct AccessToken {
    value: SecretString,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

impl JamfClient {
    /// Fetch a token now, failing fast on bad credentials.
    ///
    /// Callers use this before touching any device so an authentication
    /// problem aborts the run instead of surfacing once per device.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.bearer().await.map(drop)
    }

    /// Return a valid bearer token, exchanging credentials if needed.
    pub(crate) async fn bearer(&self) -> Result<SecretString, Error> {
        let mut slot = self.token_slot().lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// `POST /api/oauth/token` with `grant_type=client_credentials`.
    async fn request_token(&self) -> Result<AccessToken, Error> {
        let url = self.pro_url("oauth/token")?;
        debug!("requesting access token at {url}");

        let credentials = self.credentials();
        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self.http().post(url).form(&form).send().await?;
        let resp = check_status(resp).await.map_err(|e| match e {
            Error::Api { status, message } => Error::Authentication {
                message: format!("token request failed (HTTP {status}): {message}"),
            },
            other => other,
        })?;

        let body: TokenResponse = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("malformed token response: {e}"),
        })?;

        debug!(expires_in = body.expires_in, "access token issued");
        Ok(AccessToken {
            value: SecretString::from(body.access_token),
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }

    /// Revoke the current token, if one was issued.
    ///
    /// `POST /api/v1/auth/invalidate-token`
    pub async fn invalidate_token(&self) -> Result<(), Error> {
        let Some(token) = self.token_slot().lock().await.take() else {
            return Ok(());
        };

        let url = self.pro_url("v1/auth/invalidate-token")?;
        debug!("invalidating access token");

        let resp = self
            .http()
            .post(url)
            .bearer_auth(token.value.expose_secret())
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }
}
