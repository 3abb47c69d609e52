//! Configuration for the omevlan CLI.
//!
//! TOML appliance profiles, credential resolution (env + keyring +
//! plaintext), and translation to `omevlan_core::ConnectionConfig`.
//! Command-line overrides are layered on top by the binary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use omevlan_core::{ConnectionConfig, DEFAULT_PORT, TlsVerification};

/// Service name used for keyring entries.
pub const KEYRING_SERVICE: &str = "omevlan";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no hostname configured for profile '{profile}'")]
    NoHostname { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

/// A named appliance profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance hostname or IP address.
    pub hostname: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: Option<String>,

    /// Plaintext password (prefer `password_env` or the keyring).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            hostname: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "omevlan", "omevlan").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("omevlan");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, overlaid by `OMEVLAN_*` variables.
///
/// Nested keys use a double underscore, e.g.
/// `OMEVLAN_PROFILES__LAB__HOSTNAME`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OMEVLAN_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password for a profile: `password_env`, then the system
/// keyring (`omevlan` / `<profile>/password`), then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env -> env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// TLS strategy for a profile. Accept-invalid wins over a CA path.
pub fn tls_for(profile: &Profile, force_insecure: bool) -> TlsVerification {
    if force_insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ConnectionConfig` from a profile alone, no CLI overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ConnectionConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    build_connection_config(profile, profile_name, password)
}

/// Build a `ConnectionConfig` from a profile and an already resolved
/// password.
pub fn build_connection_config(
    profile: &Profile,
    profile_name: &str,
    password: SecretString,
) -> Result<ConnectionConfig, ConfigError> {
    let hostname = profile
        .hostname
        .clone()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConfigError::NoHostname {
            profile: profile_name.into(),
        })?;
    let username = profile
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    if profile.port == 0 {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }

    Ok(ConnectionConfig {
        hostname,
        port: profile.port,
        username,
        password,
        tls: tls_for(profile, false),
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
    })
}
