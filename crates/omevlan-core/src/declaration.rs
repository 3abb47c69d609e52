// ── Declared VLAN state ──
//
// The caller's desired untagged/tagged assignments, as written in a
// declaration file or assembled from CLI flags, and the validator that
// normalizes them into per-port maps against the VLAN catalog.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::catalog::{NameLookup, SENTINEL_NAME, SENTINEL_VLAN, VlanCatalog};
use crate::error::CoreError;

// ── Input types ─────────────────────────────────────────────────────

/// Desired untagged VLAN for one port: by id or by name, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntaggedEntry {
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untagged_network_id: Option<u32>,
    #[serde(
        default,
        deserialize_with = "opt_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub untagged_network_name: Option<String>,
}

/// Desired tagged VLANs for one port: ids and names are combined.
///
/// `Some(vec![])` in either list is an explicit "clear tagged VLANs";
/// `None` means the list was not given at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntry {
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged_network_ids: Option<Vec<u32>>,
    #[serde(
        default,
        deserialize_with = "opt_names",
        skip_serializing_if = "Option::is_none"
    )]
    pub tagged_network_names: Option<Vec<String>>,
}

/// The two independent declaration lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub untagged_networks: Vec<UntaggedEntry>,
    #[serde(default)]
    pub tagged_networks: Vec<TaggedEntry>,
}

// VLAN names may be written as bare numbers in YAML (`untagged_network_name: 0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum NameValue {
    Text(String),
    Number(i64),
}

impl From<NameValue> for String {
    fn from(v: NameValue) -> Self {
        match v {
            NameValue::Text(s) => s,
            NameValue::Number(n) => n.to_string(),
        }
    }
}

fn opt_name<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<NameValue>::deserialize(d)?.map(String::from))
}

fn opt_names<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(Option::<Vec<NameValue>>::deserialize(d)?
        .map(|names| names.into_iter().map(String::from).collect()))
}

// ── Normalized output ───────────────────────────────────────────────

/// Canonical desired state, keyed by port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    pub untagged: BTreeMap<u32, u32>,
    pub tagged: BTreeMap<u32, BTreeSet<u32>>,
}

// ── Validation ──────────────────────────────────────────────────────

impl Declaration {
    pub fn is_empty(&self) -> bool {
        self.untagged_networks.is_empty() && self.tagged_networks.is_empty()
    }

    /// Structural checks that need no catalog: something declared, no
    /// repeated untagged port, id XOR name per untagged port, at least one
    /// list per tagged port.
    ///
    /// Runs before any network call.
    pub fn check_shape(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::NoDeclaration);
        }

        let mut seen = HashSet::new();
        for entry in &self.untagged_networks {
            let port = entry.port;
            match (entry.untagged_network_id, non_empty(&entry.untagged_network_name)) {
                (Some(_), Some(_)) => return Err(CoreError::MutuallyExclusive { port }),
                (None, None) => return Err(CoreError::MissingUntaggedNetwork { port }),
                _ => {}
            }
            if !seen.insert(port) {
                return Err(CoreError::RepeatedPort { port });
            }
        }

        for entry in &self.tagged_networks {
            if entry.tagged_network_ids.is_none() && entry.tagged_network_names.is_none() {
                return Err(CoreError::MissingTaggedNetworks { port: entry.port });
            }
        }

        Ok(())
    }

    /// Validate against the catalog and normalize into [`DesiredState`].
    ///
    /// Fails on the first violated rule. A tagged set replaces the port's
    /// current tagged VLANs; an explicitly empty list clears them.
    pub fn validate(&self, catalog: &VlanCatalog) -> Result<DesiredState, CoreError> {
        self.check_shape()?;

        let mut desired = DesiredState::default();

        for entry in &self.untagged_networks {
            let port = entry.port;
            let vlan = if let Some(id) = entry.untagged_network_id {
                if id != SENTINEL_VLAN && !catalog.contains_id(id) {
                    return Err(CoreError::UnknownVlanId {
                        field: "untagged_network_id",
                        id,
                        port,
                    });
                }
                id
            } else if let Some(name) = non_empty(&entry.untagged_network_name) {
                if name == SENTINEL_NAME {
                    SENTINEL_VLAN
                } else {
                    resolve_name(catalog, name, port, "untagged_network_name")?
                }
            } else {
                return Err(CoreError::MissingUntaggedNetwork { port });
            };
            desired.untagged.insert(port, vlan);
        }

        for entry in &self.tagged_networks {
            let port = entry.port;
            let mut set = BTreeSet::new();

            for &id in entry.tagged_network_ids.iter().flatten() {
                if !catalog.contains_id(id) {
                    return Err(CoreError::UnknownVlanId {
                        field: "tagged_network_ids",
                        id,
                        port,
                    });
                }
                set.insert(id);
            }
            for name in entry.tagged_network_names.iter().flatten() {
                set.insert(resolve_name(catalog, name, port, "tagged_network_names")?);
            }

            if desired.tagged.insert(port, set).is_some() {
                warn!(port, "port repeated in tagged_networks; last entry wins");
            }
        }

        for (&port, &vlan) in &desired.untagged {
            let conflicts = desired
                .tagged
                .get(&port)
                .is_some_and(|set| set.contains(&vlan));
            if conflicts {
                return Err(CoreError::VlanConflict {
                    vlan,
                    name: catalog.name_of(vlan).map(str::to_owned),
                    port,
                });
            }
        }

        Ok(desired)
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

fn resolve_name(
    catalog: &VlanCatalog,
    name: &str,
    port: u32,
    field: &'static str,
) -> Result<u32, CoreError> {
    match catalog.lookup_name(name) {
        NameLookup::Found(id) => Ok(id),
        NameLookup::Ambiguous(ids) => Err(CoreError::AmbiguousVlanName {
            name: name.to_owned(),
            port,
            ids,
        }),
        NameLookup::Unknown => Err(CoreError::UnknownVlanName {
            field,
            name: name.to_owned(),
            port,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::network;
    use pretty_assertions::assert_eq;

    fn catalog() -> VlanCatalog {
        VlanCatalog::from_networks([network(100, "vlan2"), network(101, "vlan3")])
    }

    fn untagged_id(port: u32, id: u32) -> UntaggedEntry {
        UntaggedEntry {
            port,
            untagged_network_id: Some(id),
            untagged_network_name: None,
        }
    }

    fn untagged_name(port: u32, name: &str) -> UntaggedEntry {
        UntaggedEntry {
            port,
            untagged_network_id: None,
            untagged_network_name: Some(name.into()),
        }
    }

    fn tagged(port: u32, ids: Option<Vec<u32>>, names: Option<Vec<&str>>) -> TaggedEntry {
        TaggedEntry {
            port,
            tagged_network_ids: ids,
            tagged_network_names: names.map(|n| n.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn empty_declaration_is_rejected() {
        let err = Declaration::default().validate(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::NoDeclaration));
    }

    #[test]
    fn id_and_name_together_fail_shape_check() {
        let decl = Declaration {
            untagged_networks: vec![UntaggedEntry {
                port: 1,
                untagged_network_id: Some(100),
                untagged_network_name: Some("vlan2".into()),
            }],
            ..Declaration::default()
        };
        let err = decl.check_shape().unwrap_err();
        assert!(matches!(err, CoreError::MutuallyExclusive { port: 1 }));
    }

    #[test]
    fn repeated_untagged_port_is_rejected() {
        let decl = Declaration {
            untagged_networks: vec![untagged_id(1, 100), untagged_name(1, "vlan3")],
            ..Declaration::default()
        };
        let err = decl.check_shape().unwrap_err();
        assert!(matches!(err, CoreError::RepeatedPort { port: 1 }));
    }

    #[test]
    fn untagged_entry_without_network_is_rejected() {
        let decl = Declaration {
            untagged_networks: vec![UntaggedEntry {
                port: 3,
                untagged_network_id: None,
                untagged_network_name: Some(String::new()),
            }],
            ..Declaration::default()
        };
        let err = decl.check_shape().unwrap_err();
        assert!(matches!(err, CoreError::MissingUntaggedNetwork { port: 3 }));
    }

    #[test]
    fn tagged_entry_without_lists_is_rejected() {
        let decl = Declaration {
            tagged_networks: vec![tagged(2, None, None)],
            ..Declaration::default()
        };
        let err = decl.check_shape().unwrap_err();
        assert!(matches!(err, CoreError::MissingTaggedNetworks { port: 2 }));
    }

    #[test]
    fn sentinel_clears_untagged_by_id_and_by_name() {
        let decl = Declaration {
            untagged_networks: vec![untagged_id(1, 0), untagged_name(2, "0")],
            ..Declaration::default()
        };
        let desired = decl.validate(&catalog()).unwrap();
        assert_eq!(desired.untagged, BTreeMap::from([(1, 0), (2, 0)]));
    }

    #[test]
    fn sentinel_is_not_a_tagged_vlan() {
        let decl = Declaration {
            tagged_networks: vec![tagged(1, Some(vec![0]), None)],
            ..Declaration::default()
        };
        let err = decl.validate(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::UnknownVlanId { id: 0, port: 1, .. }));

        let decl = Declaration {
            tagged_networks: vec![tagged(1, None, Some(vec!["0"]))],
            ..Declaration::default()
        };
        let err = decl.validate(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::UnknownVlanName { port: 1, .. }));
    }

    #[test]
    fn unknown_untagged_id_names_port() {
        let decl = Declaration {
            untagged_networks: vec![untagged_id(4, 555)],
            ..Declaration::default()
        };
        let err = decl.validate(&catalog()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "untagged_network_id: 555 is not a valid vlan id for port 4"
        );
    }

    #[test]
    fn unknown_untagged_name_is_rejected() {
        let decl = Declaration {
            untagged_networks: vec![untagged_name(4, "nope")],
            ..Declaration::default()
        };
        let err = decl.validate(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::UnknownVlanName { port: 4, .. }));
    }

    #[test]
    fn tagged_ids_and_names_are_combined_and_deduplicated() {
        let decl = Declaration {
            tagged_networks: vec![tagged(1, Some(vec![101, 100]), Some(vec!["vlan2"]))],
            ..Declaration::default()
        };
        let desired = decl.validate(&catalog()).unwrap();
        assert_eq!(desired.tagged[&1], BTreeSet::from([100, 101]));
    }

    #[test]
    fn repeated_tagged_port_keeps_last_entry() {
        let decl = Declaration {
            untagged_networks: vec![untagged_id(1, 100)],
            tagged_networks: vec![
                tagged(1, Some(vec![100]), None),
                tagged(2, Some(vec![100]), None),
                tagged(1, None, Some(vec!["vlan3"])),
            ],
        };
        // The first entry for port 1 would conflict with its untagged VLAN;
        // only the last one counts.
        let desired = decl.validate(&catalog()).unwrap();
        assert_eq!(desired.tagged[&1], BTreeSet::from([101]));
        assert_eq!(desired.tagged[&2], BTreeSet::from([100]));
        assert_eq!(desired.tagged.len(), 2);
    }

    #[test]
    fn explicit_empty_tagged_list_clears() {
        let decl = Declaration {
            tagged_networks: vec![
                tagged(1, Some(vec![]), None),
                tagged(2, None, Some(vec![])),
            ],
            ..Declaration::default()
        };
        let desired = decl.validate(&catalog()).unwrap();
        assert_eq!(desired.tagged[&1], BTreeSet::new());
        assert_eq!(desired.tagged[&2], BTreeSet::new());
    }

    #[test]
    fn name_and_id_normalize_identically() {
        let by_id = Declaration {
            untagged_networks: vec![untagged_id(1, 100)],
            tagged_networks: vec![tagged(2, Some(vec![101]), None)],
        };
        let by_name = Declaration {
            untagged_networks: vec![untagged_name(1, "vlan2")],
            tagged_networks: vec![tagged(2, None, Some(vec!["vlan3"]))],
        };
        assert_eq!(
            by_id.validate(&catalog()).unwrap(),
            by_name.validate(&catalog()).unwrap()
        );
    }

    #[test]
    fn same_vlan_tagged_and_untagged_conflicts() {
        let decl = Declaration {
            untagged_networks: vec![untagged_name(1, "vlan2")],
            tagged_networks: vec![tagged(1, Some(vec![100, 101]), None)],
        };
        let err = decl.validate(&catalog()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "vlan 100('vlan2') cannot be in both tagged and untagged list for port 1"
        );
    }

    #[test]
    fn same_vlan_on_different_ports_is_fine() {
        let decl = Declaration {
            untagged_networks: vec![untagged_id(1, 100)],
            tagged_networks: vec![tagged(2, Some(vec![100]), None)],
        };
        assert!(decl.validate(&catalog()).is_ok());
    }

    #[test]
    fn ambiguous_name_is_a_resolution_error() {
        let catalog =
            VlanCatalog::from_networks([network(100, "prod"), network(200, "prod")]);
        let decl = Declaration {
            untagged_networks: vec![untagged_name(1, "prod")],
            ..Declaration::default()
        };
        let err = decl.validate(&catalog).unwrap_err();
        assert!(matches!(
            err,
            CoreError::AmbiguousVlanName { port: 1, ref ids, .. } if ids == &vec![100, 200]
        ));
    }

    #[test]
    fn numeric_names_deserialize_as_text() {
        let decl: Declaration = serde_json::from_value(serde_json::json!({
            "untagged_networks": [{ "port": 2, "untagged_network_name": 0 }],
            "tagged_networks": [{ "port": 1, "tagged_network_ids": [] }]
        }))
        .unwrap();
        assert_eq!(decl.untagged_networks[0].untagged_network_name.as_deref(), Some("0"));
        assert_eq!(decl.tagged_networks[0].tagged_network_ids, Some(vec![]));
        assert_eq!(decl.tagged_networks[0].tagged_network_names, None);
    }
}
