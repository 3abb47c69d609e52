// OME REST response and request types
//
// Collections come back in the OData envelope
// `{ "@odata.count": N, "value": [...], "@odata.nextLink": "..." }`.
// Field names on the wire are PascalCase; fields use `#[serde(default)]`
// liberally because appliance firmware versions disagree on presence.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// One page of an OData collection.
#[derive(Debug, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

// ── Sessions ─────────────────────────────────────────────────────────

/// Body of `POST SessionService/Sessions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SessionRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
    pub session_type: &'a str,
}

/// Session resource returned on login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfo {
    pub id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

// ── Networks ─────────────────────────────────────────────────────────

/// A VLAN network from `NetworkConfigurationService/Networks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vlan_minimum: Option<u32>,
    #[serde(default)]
    pub vlan_maximum: Option<u32>,
    #[serde(rename = "Type", default)]
    pub network_type: Option<u32>,
}

// ── Templates ────────────────────────────────────────────────────────

/// A configuration template from `TemplateService/Templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_type_id: Option<u32>,
}

/// `TemplateService/Templates({id})/Views({view})/AttributeViewDetails`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeViewDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attribute_groups: Vec<AttributeGroup>,
}

/// A group node in the template attribute tree.
///
/// The same shape is used at every depth: NIC, port, partition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeGroup {
    #[serde(default)]
    pub group_name_id: Option<u32>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub sub_attribute_groups: Vec<AttributeGroup>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A leaf in the template attribute tree.
///
/// `value` is free text on most firmware, but some versions emit bare
/// numbers, so it is kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    #[serde(default)]
    pub attribute_id: Option<i64>,
    #[serde(default)]
    pub custom_id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl Attribute {
    /// The leaf value as text: strings verbatim, numbers formatted, null as empty.
    pub fn value_text(&self) -> String {
        match &self.value {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

// ── Network config update ────────────────────────────────────────────

/// Body of `TemplateService/Actions/TemplateService.UpdateNetworkConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateNetworkConfig {
    pub template_id: u32,
    pub vlan_attributes: Vec<VlanAttribute>,
}

/// Per-port entry of the update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VlanAttribute {
    pub component_id: i64,
    pub untagged: Option<u32>,
    pub tagged: Vec<u32>,
}
