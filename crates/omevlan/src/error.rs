//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use omevlan_config::ConfigError;
use omevlan_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to appliance at {url}: {reason}")]
    #[diagnostic(
        code(omevlan::connection_failed),
        help(
            "Check that the appliance is running and reachable.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(omevlan::auth_failed),
        help("Verify the username and password for profile '{profile}'.")
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(omevlan::no_credentials),
        help(
            "Pass --username and --password, set OMEVLAN_USERNAME / OMEVLAN_PASSWORD,\n\
             or add username and password_env to the profile in {path}."
        )
    )]
    NoCredentials { profile: String, path: String },

    #[error("No appliance hostname configured for profile '{profile}'")]
    #[diagnostic(
        code(omevlan::no_hostname),
        help("Pass --hostname, set OMEVLAN_HOSTNAME, or add a profile to {path}.")
    )]
    NoHostname { profile: String, path: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(omevlan::not_found), help("{hint}"))]
    NotFound { message: String, hint: String },

    #[error("{message}")]
    #[diagnostic(
        code(omevlan::conflict),
        help("A VLAN may be untagged or tagged on a port, not both.")
    )]
    Conflict { message: String },

    // ── Declaration / validation ─────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(omevlan::declaration))]
    Declaration { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(omevlan::validation))]
    Validation { field: String, reason: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(omevlan::api_error))]
    Api {
        message: String,
        /// The appliance's error document, pretty-printed.
        #[help]
        error_info: Option<String>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(code(omevlan::config))]
    Config { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(omevlan::timeout),
        help("Increase the timeout with --timeout or check appliance responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid declaration file {path}: {reason}")]
    #[diagnostic(
        code(omevlan::declaration_file),
        help("Declaration files are YAML or JSON with untagged_networks / tagged_networks lists.")
    )]
    DeclarationFile { path: String, reason: String },

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(omevlan::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Declaration { .. }
            | Self::Validation { .. }
            | Self::NoHostname { .. }
            | Self::DeclarationFile { .. } => exit_code::USAGE,
            Self::Api { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "current".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            err @ CoreError::TemplateNotFound { .. } => CliError::NotFound {
                message: err.to_string(),
                hint: "Template names are matched exactly, including case.".into(),
            },

            err @ CoreError::NicNotFound { .. } => CliError::NotFound {
                message: err.to_string(),
                hint: "NIC names are matched exactly. Run: omevlan show to list the template's ports."
                    .into(),
            },

            err @ CoreError::VlanConflict { .. } => CliError::Conflict {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Config { message },

            err if err.is_validation() => CliError::Declaration {
                message: err.to_string(),
            },

            // Api, MalformedAttribute, Internal
            other => CliError::Api {
                message: other.to_string(),
                error_info: other
                    .error_info()
                    .and_then(|doc| serde_json::to_string_pretty(doc).ok()),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = omevlan_config::config_path().display().to_string();
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile, path },
            ConfigError::NoHostname { profile } => CliError::NoHostname { profile, path },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let cases = [
            (
                CoreError::Unreachable {
                    url: "https://ome".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "bad".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::TemplateNotFound { name: "t".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::VlanConflict {
                    vlan: 1,
                    name: None,
                    port: 1,
                },
                exit_code::CONFLICT,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
            (CoreError::NoDeclaration, exit_code::USAGE),
            (
                CoreError::InvalidPorts {
                    untagged: vec![9],
                    tagged: vec![],
                },
                exit_code::USAGE,
            ),
            (CoreError::Internal("x".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn declaration_errors_print_verbatim() {
        let err = CliError::from(CoreError::MutuallyExclusive { port: 3 });
        assert!(matches!(err, CliError::Declaration { .. }));
        assert_eq!(
            err.to_string(),
            "Options untagged_network_name | untagged_network_id are mutually exclusive for port 3"
        );
    }

    #[test]
    fn malformed_attribute_is_an_api_error_without_document() {
        let err = CliError::from(CoreError::MalformedAttribute {
            port: 1,
            attribute: "Vlan Tagged".into(),
            value: "x".into(),
        });
        match err {
            CliError::Api { error_info, .. } => assert!(error_info.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn api_error_keeps_error_document_as_help() {
        let err = CliError::from(CoreError::Api {
            message: "HTTP Error 400: Bad Request".into(),
            status: Some(400),
            error_info: Some(serde_json::json!({ "error": { "code": "Base.1.0.GeneralError" } })),
        });
        match err {
            CliError::Api { error_info, .. } => {
                assert!(error_info.is_some_and(|doc| doc.contains("GeneralError")));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
