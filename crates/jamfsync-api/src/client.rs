// Jamf Pro HTTP client
//
// Wraps `reqwest::Client` with Jamf-specific URL construction, bearer
// token injection, and status-to-error mapping. Endpoint groups (Classic,
// Pro) are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AccessToken, ClientCredentials};
use crate::error::{Error, body_preview};
use crate::transport::TransportConfig;

/// Async client for a single Jamf Pro server.
///
/// Both API surfaces share one `reqwest::Client` and one OAuth access
/// token. Classic endpoints live under `/JSSResource/`, Pro endpoints
/// under `/api/`. Every request carries `Authorization: Bearer <token>`;
/// the token is fetched lazily and refreshed shortly before it expires.
pub struct JamfClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: ClientCredentials,
    token: Mutex<Option<AccessToken>>,
}

impl JamfClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root, e.g. `https://example.jamfcloud.com`
    /// or `https://jss.example.edu:8443`.
    pub fn new(
        base_url: Url,
        credentials: ClientCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.http_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: ClientCredentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            token: Mutex::new(None),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    pub(crate) fn token_slot(&self) -> &Mutex<Option<AccessToken>> {
        &self.token
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn join(&self, prefix: &str, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{prefix}/{path}"))?)
    }

    /// Classic API URL: `{base}/JSSResource/{path}`
    pub(crate) fn classic_url(&self, path: &str) -> Result<Url, Error> {
        self.join("JSSResource", path)
    }

    /// Pro API URL: `{base}/api/{path}`
    pub(crate) fn pro_url(&self, path: &str) -> Result<Url, Error> {
        self.join("api", path)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.bearer().await?;
        Ok(builder.bearer_auth(token.expose_secret()))
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        self.get_json_with_params(url, &[]).await
    }

    /// Send a GET request with query parameters and decode the JSON body.
    pub(crate) async fn get_json_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let builder = self
            .http
            .get(url)
            .query(params)
            .header(ACCEPT, "application/json");
        let resp = self.authorized(builder).await?.send().await?;

        parse_json(check_status(resp).await?).await
    }

    /// Send a PUT request with an XML body (Classic API writes).
    pub(crate) async fn put_xml(&self, url: Url, body: String) -> Result<(), Error> {
        debug!("PUT {url}");
        trace!(%body, "XML payload");

        let builder = self
            .http
            .put(url)
            .header(CONTENT_TYPE, "application/xml")
            .body(body);
        let resp = self.authorized(builder).await?.send().await?;

        check_status(resp).await.map(drop)
    }

    /// Send a PATCH request with a JSON body (Pro API writes).
    pub(crate) async fn patch_json<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("PATCH {url}");

        let builder = self
            .http
            .patch(url)
            .header(ACCEPT, "application/json")
            .json(body);
        let resp = self.authorized(builder).await?.send().await?;

        check_status(resp).await.map(drop)
    }

    /// Send a POST request without a body (Classic API commands).
    pub(crate) async fn post_empty(&self, url: Url) -> Result<(), Error> {
        debug!("POST {url}");

        let builder = self.http.post(url).header(ACCEPT, "application/json");
        let resp = self.authorized(builder).await?.send().await?;

        check_status(resp).await.map(drop)
    }
}

/// Map non-success statuses to typed errors, passing successful responses through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: format!("token rejected (HTTP 401): {}", body_preview(&body)),
        });
    }

    Err(Error::Api {
        status: status.as_u16(),
        message: body_preview(&body),
    })
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", body_preview(&body)),
        body,
    })
}
