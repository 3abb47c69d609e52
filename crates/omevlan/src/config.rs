//! CLI-side configuration: layers global flags over the selected profile
//! and produces the `omevlan_core::ConnectionConfig` handed to core.

use std::io::IsTerminal;

use secrecy::SecretString;

use omevlan_config::{Config, ConfigError, Profile};
use omevlan_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The selected profile with command-line overrides applied.
///
/// A profile that does not exist in the file is not an error as long as
/// the flags supply what is needed.
pub fn effective_profile(global: &GlobalOpts, config: &Config, profile_name: &str) -> Profile {
    let mut profile = config.profiles.get(profile_name).cloned().unwrap_or_default();

    if let Some(ref hostname) = global.hostname {
        profile.hostname = Some(hostname.clone());
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure || (profile.insecure.is_none() && config.defaults.insecure) {
        profile.insecure = Some(true);
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(config.defaults.timeout));

    profile
}

/// Build the connection config from config file, profile, flags and,
/// as a last resort on a terminal, an interactive password prompt.
///
/// Password order: `--password` / `OMEVLAN_PASSWORD`, the profile's
/// `password_env`, the system keyring, plaintext in the profile.
pub fn build_connection_config(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let config = omevlan_config::load_config()?;
    let profile_name = active_profile_name(global, &config);
    let profile = effective_profile(global, &config, &profile_name);

    if profile.hostname.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::NoHostname {
            profile: profile_name,
        }
        .into());
    }

    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => match omevlan_config::resolve_password(&profile, &profile_name) {
            Ok(pw) => pw,
            Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
                prompt_password(&profile)?
            }
            Err(e) => return Err(e.into()),
        },
    };

    tracing::debug!(profile = %profile_name, "resolved connection config");
    Ok(omevlan_config::build_connection_config(
        &profile,
        &profile_name,
        password,
    )?)
}

fn prompt_password(profile: &Profile) -> Result<SecretString, CliError> {
    let user = profile.username.as_deref().unwrap_or("user");
    let host = profile.hostname.as_deref().unwrap_or_default();
    let pw = rpassword::prompt_password(format!("Password for {user}@{host}: "))?;
    Ok(SecretString::from(pw))
}
