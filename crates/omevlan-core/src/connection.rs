// ── Appliance connection ──
//
// Owns an authenticated `OmeClient` for the duration of one command.
// Callers must `close()` to release the server-side session.

use tracing::{debug, info};

use omevlan_api::OmeClient;

use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::pipeline::Reconciler;

/// An open API session against one appliance.
pub struct Connection {
    client: OmeClient,
}

impl Connection {
    /// Build the HTTP client and log in.
    pub async fn open(config: &ConnectionConfig) -> Result<Self, CoreError> {
        let base_url = OmeClient::api_root(&config.hostname, config.port)?;
        debug!(url = %base_url, "connecting");
        let mut client = OmeClient::new(base_url, &config.transport())?;
        client.login(&config.username, &config.password).await?;
        info!(hostname = %config.hostname, username = %config.username, "session opened");
        Ok(Self { client })
    }

    /// Wrap an already authenticated client.
    pub fn from_client(client: OmeClient) -> Self {
        Self { client }
    }

    pub fn reconciler(&self) -> Reconciler<'_, OmeClient> {
        Reconciler::new(&self.client)
    }

    /// Delete the session. Failures are logged, not returned.
    pub async fn close(mut self) {
        self.client.logout().await;
    }
}
