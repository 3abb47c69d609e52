// ── VLAN catalog ──
//
// Name <-> id lookup over the appliance's VLAN networks. Built fresh for
// every run. The sentinel id 0 ("no VLAN") is never a catalog entry; the
// validator decides where it is legal.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::ManagementApi;
use crate::error::CoreError;

/// The id that means "no VLAN" / "clear this assignment".
pub const SENTINEL_VLAN: u32 = 0;

/// The name that resolves to [`SENTINEL_VLAN`] for untagged entries.
pub const SENTINEL_NAME: &str = "0";

/// A VLAN network as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanNetwork {
    pub id: u32,
    pub name: String,
    pub vlan_minimum: Option<u32>,
    pub vlan_maximum: Option<u32>,
}

impl From<omevlan_api::Network> for VlanNetwork {
    fn from(n: omevlan_api::Network) -> Self {
        Self {
            id: n.id,
            name: n.name,
            vlan_minimum: n.vlan_minimum,
            vlan_maximum: n.vlan_maximum,
        }
    }
}

/// Result of looking a VLAN up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameLookup {
    Found(u32),
    /// The appliance holds several networks with this name.
    Ambiguous(Vec<u32>),
    Unknown,
}

/// Bidirectional VLAN lookup.
#[derive(Debug, Clone, Default)]
pub struct VlanCatalog {
    networks: Vec<VlanNetwork>,
    by_name: HashMap<String, u32>,
    by_id: BTreeMap<u32, String>,
    duplicates: HashMap<String, BTreeSet<u32>>,
}

impl VlanCatalog {
    /// Build the catalog from a network listing.
    ///
    /// Names shared by networks with different ids are remembered; looking
    /// one of them up yields [`NameLookup::Ambiguous`] instead of whichever
    /// came last.
    pub fn from_networks(networks: impl IntoIterator<Item = VlanNetwork>) -> Self {
        let mut catalog = Self::default();
        for network in networks {
            if let Some(&previous) = catalog.by_name.get(&network.name) {
                if previous != network.id {
                    warn!(name = %network.name, previous, id = network.id, "duplicate VLAN name");
                    catalog
                        .duplicates
                        .entry(network.name.clone())
                        .or_default()
                        .extend([previous, network.id]);
                }
            }
            catalog.by_name.insert(network.name.clone(), network.id);
            catalog.by_id.insert(network.id, network.name.clone());
            catalog.networks.push(network);
        }
        catalog
    }

    /// Fetch the full network listing and build the catalog.
    pub async fn fetch<A: ManagementApi>(api: &A) -> Result<Self, CoreError> {
        let networks = api.list_networks().await?;
        debug!(count = networks.len(), "fetched VLAN catalog");
        Ok(Self::from_networks(networks))
    }

    /// Whether `id` is a real catalog entry (the sentinel is not).
    pub fn contains_id(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn lookup_name(&self, name: &str) -> NameLookup {
        if let Some(ids) = self.duplicates.get(name) {
            return NameLookup::Ambiguous(ids.iter().copied().collect());
        }
        self.by_name
            .get(name)
            .map_or(NameLookup::Unknown, |&id| NameLookup::Found(id))
    }

    /// Reverse lookup for messages.
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Networks in the order the appliance returned them.
    pub fn networks(&self) -> &[VlanNetwork] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn network(id: u32, name: &str) -> VlanNetwork {
    VlanNetwork {
        id,
        name: name.into(),
        vlan_minimum: None,
        vlan_maximum: None,
    }
}
