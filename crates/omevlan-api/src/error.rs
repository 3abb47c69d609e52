use thiserror::Error;

/// Top-level error type for the `omevlan-api` crate.
///
/// Splits failures the way callers need to react to them: an HTTP-level
/// rejection carries the service's structured error document, an
/// unreachable appliance is kept apart from other transport failures, and
/// everything else is a protocol or I/O problem. `omevlan-core` maps these
/// into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Session creation failed or the token was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The appliance could not be reached (connection refused, DNS failure,
    /// no route to host).
    #[error("Appliance unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Any other HTTP transport error.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// Non-success HTTP status. `body` holds the service's JSON error
    /// document when the response carried one.
    #[error("HTTP Error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unreachable {
                url: err
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: err.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

impl Error {
    /// Returns `true` if the appliance could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// The service's structured error document, if any.
    pub fn error_info(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
