// Network configuration service endpoints

use tracing::debug;

use crate::client::OmeClient;
use crate::error::Error;
use crate::models::Network;

/// Bulk page size requested from the service; next links cover the rest.
const PAGE_SIZE: u32 = 9999;

impl OmeClient {
    /// List every VLAN network defined on the appliance.
    ///
    /// `GET NetworkConfigurationService/Networks?$top=9999`, following
    /// next links until the collection is exhausted.
    pub async fn list_networks(&self) -> Result<Vec<Network>, Error> {
        debug!("listing VLAN networks");
        self.get_all(&format!("NetworkConfigurationService/Networks?$top={PAGE_SIZE}"))
            .await
    }
}
