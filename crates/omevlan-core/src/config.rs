// ── Runtime connection configuration ──
//
// These types describe *how* to reach an OME appliance. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ConnectionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Default HTTPS port of the appliance.
pub const DEFAULT_PORT: u16 = 443;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for appliances.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one appliance session.
///
/// Built by the CLI, passed to [`Connection::open`](crate::Connection::open).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Appliance hostname or IP address.
    pub hostname: String,
    /// HTTPS port.
    pub port: u16,
    /// Account used to open the API session.
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub(crate) fn transport(&self) -> omevlan_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => omevlan_api::TlsMode::System,
            TlsVerification::CustomCa(path) => omevlan_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => omevlan_api::TlsMode::DangerAcceptInvalid,
        };
        omevlan_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
