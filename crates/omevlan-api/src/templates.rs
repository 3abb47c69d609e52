// Template service endpoints
//
// Templates are listed for name lookup; the attribute view with id 4 is
// the network hierarchy (NIC -> port -> partition -> attribute).

use reqwest::Method;
use tracing::debug;

use crate::client::{ApiResponse, OmeClient};
use crate::error::Error;
use crate::models::{AttributeViewDetails, Template, UpdateNetworkConfig};

/// Attribute view id of the network hierarchy in a template.
pub const NETWORK_HIERARCHY_VIEW: u32 = 4;

const UPDATE_NETWORK_CONFIG: &str =
    "TemplateService/Actions/TemplateService.UpdateNetworkConfig";

impl OmeClient {
    /// List every template.
    ///
    /// `GET TemplateService/Templates`
    pub async fn list_templates(&self) -> Result<Vec<Template>, Error> {
        debug!("listing templates");
        self.get_all("TemplateService/Templates").await
    }

    /// Fetch one attribute view of a template.
    ///
    /// `GET TemplateService/Templates({id})/Views({view})/AttributeViewDetails`
    pub async fn attribute_view(
        &self,
        template_id: u32,
        view_id: u32,
    ) -> Result<AttributeViewDetails, Error> {
        debug!(template_id, view_id, "fetching template attribute view");
        self.get_json(&format!(
            "TemplateService/Templates({template_id})/Views({view_id})/AttributeViewDetails"
        ))
        .await
    }

    /// Submit a VLAN update for a template's NIC ports.
    ///
    /// `POST TemplateService/Actions/TemplateService.UpdateNetworkConfig`
    pub async fn update_network_config(
        &self,
        payload: &UpdateNetworkConfig,
    ) -> Result<ApiResponse, Error> {
        debug!(
            template_id = payload.template_id,
            ports = payload.vlan_attributes.len(),
            "submitting network config update"
        );
        let body = serde_json::to_value(payload).map_err(|e| Error::Deserialization {
            message: format!("failed to encode update payload: {e}"),
            body: String::new(),
        })?;
        self.invoke(Method::POST, UPDATE_NETWORK_CONFIG, Some(&body))
            .await
    }
}
