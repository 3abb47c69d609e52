// ── Reconciliation planning ──
//
// Pure diff of desired state against the current port topology. Produces
// either "no change" or a single combined update covering every touched
// port.

use std::collections::BTreeSet;

use serde::Serialize;

use omevlan_api::{UpdateNetworkConfig, VlanAttribute};

use crate::declaration::DesiredState;
use crate::error::CoreError;
use crate::topology::PortTopology;

/// Final VLAN assignment for one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortUpdate {
    pub port: u32,
    pub component_id: i64,
    pub untagged: Option<u32>,
    pub tagged: Vec<u32>,
}

/// One combined update for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    pub template_id: u32,
    /// Ascending port order.
    pub ports: Vec<PortUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    NoChange,
    Update(UpdatePlan),
}

impl From<&UpdatePlan> for UpdateNetworkConfig {
    fn from(plan: &UpdatePlan) -> Self {
        Self {
            template_id: plan.template_id,
            vlan_attributes: plan
                .ports
                .iter()
                .map(|p| VlanAttribute {
                    component_id: p.component_id,
                    untagged: p.untagged,
                    tagged: p.tagged.clone(),
                })
                .collect(),
        }
    }
}

/// Whether every declared port already holds the declared values.
///
/// Tagged sets compare order-insensitively. A declared port the topology
/// does not know is always a difference.
pub fn is_satisfied(topology: &PortTopology, desired: &DesiredState) -> bool {
    let untagged_ok = desired.untagged.iter().all(|(&port, &vlan)| {
        topology
            .get(port)
            .is_some_and(|state| state.untagged == Some(vlan))
    });
    let tagged_ok = desired.tagged.iter().all(|(&port, want)| {
        topology.get(port).is_some_and(|state| {
            state
                .tagged
                .as_ref()
                .is_some_and(|have| have.iter().copied().collect::<BTreeSet<_>>() == *want)
        })
    });
    untagged_ok && tagged_ok
}

/// Diff `desired` against `topology`.
///
/// Ports not mentioned in `desired` are left out of the plan. A declared
/// tagged set replaces the port's current one. Declared ports missing from
/// the topology fail the whole plan.
pub fn plan(
    template_id: u32,
    topology: &PortTopology,
    desired: &DesiredState,
) -> Result<PlanOutcome, CoreError> {
    if is_satisfied(topology, desired) {
        return Ok(PlanOutcome::NoChange);
    }

    let ports = topology
        .iter()
        .filter(|(port, _)| desired.untagged.contains_key(port) || desired.tagged.contains_key(port))
        .map(|(port, state)| PortUpdate {
            port,
            component_id: state.component_id,
            untagged: desired.untagged.get(&port).copied().or(state.untagged),
            tagged: desired.tagged.get(&port).map_or_else(
                || state.tagged.clone().unwrap_or_default(),
                |set| set.iter().copied().collect(),
            ),
        })
        .collect();

    let invalid_untagged: Vec<u32> = desired
        .untagged
        .keys()
        .copied()
        .filter(|&port| !topology.contains(port))
        .collect();
    let invalid_tagged: Vec<u32> = desired
        .tagged
        .keys()
        .copied()
        .filter(|&port| !topology.contains(port))
        .collect();
    if !invalid_untagged.is_empty() || !invalid_tagged.is_empty() {
        return Err(CoreError::InvalidPorts {
            untagged: invalid_untagged,
            tagged: invalid_tagged,
        });
    }

    Ok(PlanOutcome::Update(UpdatePlan { template_id, ports }))
}
