// ── Core error types ──
//
// User-facing errors from omevlan-core. Declaration problems, lookup
// failures, and scope violations are named precisely so the CLI can print
// them verbatim. The `From<omevlan_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Declaration shape ────────────────────────────────────────────
    #[error("Either tagged_networks | untagged_networks data needs to be provided")]
    NoDeclaration,

    #[error("port {port} is repeated for untagged networks")]
    RepeatedPort { port: u32 },

    #[error(
        "Options untagged_network_name | untagged_network_id are mutually exclusive for port {port}"
    )]
    MutuallyExclusive { port: u32 },

    #[error("No untagged_network_id or untagged_network_name provided for port {port}")]
    MissingUntaggedNetwork { port: u32 },

    #[error("No tagged_networks provided or valid tagged_networks not found for port {port}")]
    MissingTaggedNetworks { port: u32 },

    #[error("exactly one of template_name | template_id must be provided")]
    TemplateSelection,

    #[error("missing required argument: {field}")]
    MissingField { field: &'static str },

    // ── Resolution ───────────────────────────────────────────────────
    #[error("{field}: {id} is not a valid vlan id for port {port}")]
    UnknownVlanId {
        field: &'static str,
        id: u32,
        port: u32,
    },

    #[error("{field}: {name} is not a valid vlan name for port {port}")]
    UnknownVlanName {
        field: &'static str,
        name: String,
        port: u32,
    },

    #[error("vlan name '{name}' for port {port} is ambiguous: shared by networks {ids:?}")]
    AmbiguousVlanName { name: String, port: u32, ids: Vec<u32> },

    #[error("Template with name '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("NIC with name '{nic}' not found for template with id {template_id}")]
    NicNotFound { nic: String, template_id: u32 },

    #[error("malformed '{attribute}' value {value:?} for port {port}")]
    MalformedAttribute {
        port: u32,
        attribute: String,
        value: String,
    },

    // ── Conflict / scope ─────────────────────────────────────────────
    #[error(
        "vlan {vlan}('{}') cannot be in both tagged and untagged list for port {port}",
        name.as_deref().unwrap_or("None")
    )]
    VlanConflict {
        vlan: u32,
        name: Option<String>,
        port: u32,
    },

    #[error("{}", describe_invalid_ports(untagged, tagged))]
    InvalidPorts { untagged: Vec<u32>, tagged: Vec<u32> },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach appliance at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Appliance request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
        /// The service's structured error document.
        error_info: Option<serde_json::Value>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_invalid_ports(untagged: &[u32], tagged: &[u32]) -> String {
    let mut parts = Vec::new();
    if !untagged.is_empty() {
        parts.push(format!("Invalid port(s) {untagged:?} found for untagged vLAN"));
    }
    if !tagged.is_empty() {
        parts.push(format!("Invalid port(s) {tagged:?} found for tagged vLAN"));
    }
    parts.join("; ")
}

impl CoreError {
    /// Returns `true` for declaration problems detected before or without
    /// touching the appliance state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoDeclaration
                | Self::RepeatedPort { .. }
                | Self::MutuallyExclusive { .. }
                | Self::MissingUntaggedNetwork { .. }
                | Self::MissingTaggedNetworks { .. }
                | Self::TemplateSelection
                | Self::MissingField { .. }
                | Self::UnknownVlanId { .. }
                | Self::UnknownVlanName { .. }
                | Self::AmbiguousVlanName { .. }
                | Self::VlanConflict { .. }
                | Self::InvalidPorts { .. }
        )
    }

    /// Returns `true` if the appliance could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// The service's structured error document, if the failure carried one.
    pub fn error_info(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { error_info, .. } => error_info.as_ref(),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<omevlan_api::Error> for CoreError {
    fn from(err: omevlan_api::Error) -> Self {
        match err {
            omevlan_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            omevlan_api::Error::Unreachable { url, reason } => {
                CoreError::Unreachable { url, reason }
            }
            omevlan_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            omevlan_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
                error_info: None,
            },
            omevlan_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            omevlan_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            omevlan_api::Error::Http {
                status,
                message,
                body,
            } => CoreError::Api {
                message: format!("HTTP Error {status}: {message}"),
                status: Some(status),
                error_info: body,
            },
            omevlan_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
