// ONOS REST HTTP client
//
// Wraps `reqwest::Client` with base-URL normalization, basic auth, and
// per-endpoint status expectations. Endpoint groups (topology, ACL,
// meters/flows, intents) live in sibling modules as inherent methods.

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default REST root on a controller host.
pub const DEFAULT_API_PATH: &str = "/onos/v1";

/// Username/password pair sent as HTTP basic auth on every request.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Async client for the ONOS northbound REST API.
///
/// All methods are single-attempt: a non-success status surfaces as an
/// error and is never retried here.
pub struct OnosClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Option<BasicAuth>,
}

impl OnosClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a controller URL and transport config.
    ///
    /// `base_url` may be the bare controller root (`http://10.0.0.10:8181`)
    /// or already include the REST prefix (`http://10.0.0.10:8181/onos/v1`).
    pub fn new(
        base_url: &str,
        auth: Option<BasicAuth>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http, auth)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        http: reqwest::Client,
        auth: Option<BasicAuth>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Ensure the base URL ends with `/onos/v1/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with(DEFAULT_API_PATH) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{DEFAULT_API_PATH}/"));
        }

        Ok(url)
    }

    /// The normalized REST root (always ends with `/onos/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL.
    ///
    /// Device ids look like `of:0000000000000001`; joining them as a
    /// relative URL string would parse `of:` as a scheme, so segments are
    /// pushed individually.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth {
            Some(auth) => builder.basic_auth(&auth.username, Some(auth.password.expose_secret())),
            None => builder,
        }
    }

    /// GET and decode a JSON body; any 2xx is success.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(status, StatusCode::OK, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }

    /// POST a JSON body and require exactly `201 Created`.
    ///
    /// Returns the response so callers can read headers such as `Location`.
    pub(crate) async fn post_created<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<reqwest::Response, Error> {
        debug!("POST {url}");
        let resp = self.request(Method::POST, url).json(body).send().await?;
        Self::expect(resp, StatusCode::CREATED).await
    }

    /// DELETE and require exactly `204 No Content`.
    pub(crate) async fn delete_no_content(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.request(Method::DELETE, url).send().await?;
        Self::expect(resp, StatusCode::NO_CONTENT).await.map(|_| ())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn expect(resp: reqwest::Response, expected: StatusCode) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status == expected {
            Ok(resp)
        } else {
            Err(Self::status_error(status, expected, resp).await)
        }
    }

    async fn status_error(status: StatusCode, expected: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "controller rejected credentials (HTTP 401)".into(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        Error::UnexpectedStatus {
            status: status.as_u16(),
            expected: expected.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                preview(&raw).to_owned()
            },
        }
    }
}

/// First 200 characters of a response body, for error messages.
fn preview(body: &str) -> &str {
    body.char_indices().nth(200).map_or(body, |(idx, _)| &body[..idx])
}
