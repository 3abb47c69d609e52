// ── Management service seam ──
//
// The reconciliation engine reads and writes through `ManagementApi`
// rather than the HTTP client directly, so the pipeline runs unchanged
// against an in-memory fake in tests.

use std::future::Future;

use tracing::debug;

use omevlan_api::{
    AttributeViewDetails, NETWORK_HIERARCHY_VIEW, OmeClient, Template, UpdateNetworkConfig,
};

use crate::catalog::VlanNetwork;
use crate::error::CoreError;
use crate::plan::UpdatePlan;

/// The operations the engine needs from the management service.
pub trait ManagementApi {
    /// Every VLAN network known to the appliance.
    fn list_networks(&self) -> impl Future<Output = Result<Vec<VlanNetwork>, CoreError>>;

    /// Every configuration template.
    fn list_templates(&self) -> impl Future<Output = Result<Vec<Template>, CoreError>>;

    /// The network hierarchy attribute view of one template.
    fn network_hierarchy(
        &self,
        template_id: u32,
    ) -> impl Future<Output = Result<AttributeViewDetails, CoreError>>;

    /// Submit one combined VLAN update.
    fn submit(&self, plan: &UpdatePlan) -> impl Future<Output = Result<(), CoreError>>;
}

impl ManagementApi for OmeClient {
    async fn list_networks(&self) -> Result<Vec<VlanNetwork>, CoreError> {
        let networks = OmeClient::list_networks(self).await?;
        Ok(networks.into_iter().map(VlanNetwork::from).collect())
    }

    async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
        Ok(OmeClient::list_templates(self).await?)
    }

    async fn network_hierarchy(&self, template_id: u32) -> Result<AttributeViewDetails, CoreError> {
        Ok(self.attribute_view(template_id, NETWORK_HIERARCHY_VIEW).await?)
    }

    async fn submit(&self, plan: &UpdatePlan) -> Result<(), CoreError> {
        let payload = UpdateNetworkConfig::from(plan);
        let resp = self.update_network_config(&payload).await?;
        debug!(status = resp.status, "network config update accepted");
        if resp.success() {
            Ok(())
        } else {
            Err(CoreError::Api {
                message: format!("update rejected with HTTP {}", resp.status),
                status: Some(resp.status),
                error_info: resp.json,
            })
        }
    }
}
