// ── Template port topology ──
//
// Reads the network hierarchy view of a template and extracts, per
// configurable port of one NIC, the component id and the current
// untagged/tagged VLAN assignment.
//
// The view is a generic tree: NIC groups -> port groups -> partition
// groups -> attribute leaves. Only leaves with a nonzero `CustomId` are
// configurable slots.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::EnumString;
use tracing::{debug, warn};

use omevlan_api::{Attribute, AttributeGroup, AttributeViewDetails};

use crate::api::ManagementApi;
use crate::error::CoreError;

// ── Tree view ───────────────────────────────────────────────────────

/// A node of the attribute tree: either a group or a leaf attribute.
#[derive(Debug, Clone, Copy)]
pub enum AttributeNode<'a> {
    Group(&'a AttributeGroup),
    Leaf(&'a Attribute),
}

impl<'a> AttributeNode<'a> {
    /// Direct children: sub-groups first, then leaves. Leaves have none.
    pub fn children(self) -> impl Iterator<Item = AttributeNode<'a>> {
        let (groups, leaves): (&'a [AttributeGroup], &'a [Attribute]) = match self {
            Self::Group(g) => (g.sub_attribute_groups.as_slice(), g.attributes.as_slice()),
            Self::Leaf(_) => (&[], &[]),
        };
        groups
            .iter()
            .map(AttributeNode::Group)
            .chain(leaves.iter().map(AttributeNode::Leaf))
    }

    fn as_group(self) -> Option<&'a AttributeGroup> {
        match self {
            Self::Group(g) => Some(g),
            Self::Leaf(_) => None,
        }
    }

    fn as_leaf(self) -> Option<&'a Attribute> {
        match self {
            Self::Leaf(a) => Some(a),
            Self::Group(_) => None,
        }
    }
}

/// The two leaf display names that carry VLAN state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum VlanMarker {
    #[strum(serialize = "vlan untagged")]
    Untagged,
    #[strum(serialize = "vlan tagged")]
    Tagged,
}

// ── Port state ──────────────────────────────────────────────────────

/// Current VLAN state of one configurable port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortState {
    pub component_id: i64,
    /// `None` when the port has no untagged leaf.
    pub untagged: Option<u32>,
    /// `None` when the port has no tagged leaf.
    pub tagged: Option<Vec<u32>>,
}

/// Configurable ports of one NIC, keyed by port group id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortTopology {
    nic: String,
    ports: BTreeMap<u32, PortState>,
}

impl PortTopology {
    /// Fetch the template's network hierarchy and extract the NIC's ports.
    pub async fn read<A: ManagementApi>(
        api: &A,
        template_id: u32,
        nic: &str,
    ) -> Result<Self, CoreError> {
        let view = api.network_hierarchy(template_id).await?;
        let topology = Self::from_view(&view, template_id, nic)?;
        debug!(template_id, nic, ports = topology.len(), "read port topology");
        Ok(topology)
    }

    /// Extract the ports of `nic` from an already fetched view.
    ///
    /// The NIC is matched by exact display name among the children of the
    /// first top-level group.
    pub fn from_view(
        view: &AttributeViewDetails,
        template_id: u32,
        nic: &str,
    ) -> Result<Self, CoreError> {
        let not_found = || CoreError::NicNotFound {
            nic: nic.to_owned(),
            template_id,
        };

        let root = view.attribute_groups.first().ok_or_else(not_found)?;
        let nic_group = AttributeNode::Group(root)
            .children()
            .filter_map(AttributeNode::as_group)
            .find(|g| g.display_name.as_deref() == Some(nic))
            .ok_or_else(not_found)?;

        let mut ports = BTreeMap::new();
        for port_group in AttributeNode::Group(nic_group)
            .children()
            .filter_map(AttributeNode::as_group)
        {
            let Some(port) = port_group.group_name_id else {
                warn!(
                    display_name = port_group.display_name.as_deref().unwrap_or_default(),
                    "port group without GroupNameId; skipped"
                );
                continue;
            };

            let leaves = AttributeNode::Group(port_group)
                .children()
                .filter(|n| matches!(n, AttributeNode::Group(_)))
                .flat_map(AttributeNode::children)
                .filter_map(AttributeNode::as_leaf)
                .filter(|leaf| leaf.custom_id != 0);

            for leaf in leaves {
                let state: &mut PortState = ports.entry(port).or_default();
                state.component_id = leaf.custom_id;
                match leaf.display_name.parse::<VlanMarker>() {
                    Ok(VlanMarker::Untagged) => {
                        state.untagged = Some(parse_untagged(port, leaf)?);
                    }
                    Ok(VlanMarker::Tagged) => {
                        state.tagged = Some(parse_tagged(port, leaf)?);
                    }
                    Err(_) => {}
                }
            }
        }

        Ok(Self {
            nic: nic.to_owned(),
            ports,
        })
    }

    pub fn nic(&self) -> &str {
        &self.nic
    }

    pub fn get(&self, port: u32) -> Option<&PortState> {
        self.ports.get(&port)
    }

    pub fn contains(&self, port: u32) -> bool {
        self.ports.contains_key(&port)
    }

    /// Ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PortState)> {
        self.ports.iter().map(|(&port, state)| (port, state))
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

fn malformed(port: u32, leaf: &Attribute, value: &str) -> CoreError {
    CoreError::MalformedAttribute {
        port,
        attribute: leaf.display_name.clone(),
        value: value.to_owned(),
    }
}

fn parse_untagged(port: u32, leaf: &Attribute) -> Result<u32, CoreError> {
    let text = leaf.value_text();
    text.trim().parse().map_err(|_| malformed(port, leaf, &text))
}

fn parse_tagged(port: u32, leaf: &Attribute) -> Result<Vec<u32>, CoreError> {
    let text = leaf.value_text();
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(Vec::new());
    }
    compact
        .split(',')
        .map(|part| part.parse().map_err(|_| malformed(port, leaf, &text)))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    use omevlan_api::AttributeViewDetails;

    /// One port group with a single partition holding untagged and tagged
    /// leaves that share `component` as their `CustomId`.
    pub(crate) fn port(port: u32, component: i64, untagged: Value, tagged: Value) -> Value {
        json!({
            "GroupNameId": port,
            "DisplayName": format!("Port {port}"),
            "SubAttributeGroups": [{
                "GroupNameId": 1,
                "DisplayName": "Partition 1",
                "SubAttributeGroups": [],
                "Attributes": [
                    { "AttributeId": 1, "CustomId": component, "DisplayName": "Vlan Untagged", "Value": untagged },
                    { "AttributeId": 2, "CustomId": component, "DisplayName": "Vlan Tagged", "Value": tagged },
                    { "AttributeId": 3, "CustomId": 0, "DisplayName": "Vlan Untagged", "Value": "999" }
                ]
            }],
            "Attributes": []
        })
    }

    pub(crate) fn view(nic: &str, ports: Vec<Value>) -> AttributeViewDetails {
        let value = json!({
            "Name": "NetworkHierarchy",
            "AttributeGroups": [{
                "GroupNameId": 1001,
                "DisplayName": "NICModel",
                "SubAttributeGroups": [
                    { "DisplayName": "Other NIC", "SubAttributeGroups": [], "Attributes": [] },
                    { "DisplayName": nic, "SubAttributeGroups": ports, "Attributes": [] }
                ],
                "Attributes": []
            }]
        });
        match serde_json::from_value(value) {
            Ok(view) => view,
            Err(e) => panic!("fixture view: {e}"),
        }
    }
}
