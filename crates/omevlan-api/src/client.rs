// OME REST HTTP client
//
// Wraps `reqwest::Client` with OME URL construction, session-token
// injection, and error-document extraction. Endpoint groups (sessions,
// networks, templates) are inherent methods in separate files to keep
// this module focused on transport mechanics.

use reqwest::Method;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ODataCollection;
use crate::transport::TransportConfig;

/// Header carrying the session token on every authenticated request.
pub(crate) const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Upper bound on followed `@odata.nextLink` pages for one collection.
const MAX_PAGES: usize = 1000;

/// An authenticated OME session.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub id: String,
    pub token: SecretString,
}

/// Outcome of a raw [`OmeClient::invoke`] call that succeeded at the HTTP
/// level.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body, `None` when the service returned no content.
    pub json: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Whether the status code is in the 2xx range.
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw HTTP client for the OME REST API.
///
/// All paths are relative to the API root (`https://host:port/api/`).
/// Non-success statuses become [`Error::Http`] carrying the service's
/// error document; connection failures become [`Error::Unreachable`].
pub struct OmeClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    session: Option<Session>,
}

impl OmeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, as produced by [`OmeClient::api_root`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_secs: transport.timeout_secs(),
            session: None,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout_secs: 0,
            session: None,
        }
    }

    /// Build the API root URL for an appliance: `https://{host}:{port}/api/`.
    ///
    /// Bare IPv6 literals are bracketed.
    pub fn api_root(hostname: &str, port: u16) -> Result<Url, Error> {
        let host = if hostname.contains(':') && !hostname.starts_with('[') {
            format!("[{hostname}]")
        } else {
            hostname.to_owned()
        };
        Ok(Url::parse(&format!("https://{host}:{port}/api/"))?)
    }

    /// The underlying HTTP client (for session flows that need headers).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a session token is currently held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn set_session(&mut self, session: Session) {
        debug!(session_id = %session.id, "storing session token");
        self.session = Some(session);
    }

    pub(crate) fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Resolve a path against the API root.
    ///
    /// Relative paths (`"TemplateService/Templates"`) land under `/api/`;
    /// absolute paths such as OData next links (`"/api/...?$skip=50"`)
    /// replace the root path.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and return the parsed body.
    ///
    /// This is the narrow interface the reconciliation engine is written
    /// against; the typed endpoint methods are thin wrappers over it.
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(session) = &self.session {
            let mut value = HeaderValue::from_str(session.token.expose_secret()).map_err(|e| {
                Error::Authentication {
                    message: format!("invalid session token header value: {e}"),
                }
            })?;
            value.set_sensitive(true);
            builder = builder.header(AUTH_TOKEN_HEADER, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.classify(e))?;
        self.handle_response(resp).await
    }

    /// GET a single resource and deserialize it.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.invoke(Method::GET, path, None).await?;
        let json = resp.json.ok_or_else(|| Error::Deserialization {
            message: format!("empty response body for {path}"),
            body: String::new(),
        })?;
        T::deserialize(&json).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: json.to_string(),
        })
    }

    /// GET every page of an OData collection.
    ///
    /// Follows `@odata.nextLink` until the service stops returning one.
    pub async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut next = Some(path.to_owned());
        let mut pages = 0_usize;

        while let Some(current) = next.take() {
            let page: ODataCollection<T> = self.get_json(&current).await?;
            pages += 1;
            let received = page.value.len();
            all.extend(page.value);
            trace!(path = %current, received, total = all.len(), "collection page");

            if received == 0 || pages >= MAX_PAGES {
                break;
            }
            next = page.next_link.filter(|link| !link.is_empty());
        }

        Ok(all)
    }

    // ── Response handling ────────────────────────────────────────────

    pub(crate) fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::from(err)
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<ApiResponse, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        if body.trim().is_empty() {
            return Ok(ApiResponse {
                status: status.as_u16(),
                json: None,
            });
        }

        let json = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        Ok(ApiResponse {
            status: status.as_u16(),
            json: Some(json),
        })
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: format!("session rejected (HTTP {status})"),
            };
        }

        let body = serde_json::from_str::<serde_json::Value>(&raw).ok();
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw)
                }
            });

        Error::Http {
            status: status.as_u16(),
            message,
            body,
        }
    }
}

/// First 200 characters of a response body.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Pull a readable message out of an OME error document.
///
/// Prefers the first `@Message.ExtendedInfo` entry, which names the
/// actual problem, over the generic top-level message.
fn error_message(doc: &serde_json::Value) -> Option<String> {
    let error = doc.get("error")?;
    error
        .get("@Message.ExtendedInfo")
        .and_then(|info| info.get(0))
        .and_then(|first| first.get("Message"))
        .or_else(|| error.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}
