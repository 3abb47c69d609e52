//! `show` handler: current VLAN state of a template NIC.

use serde::Serialize;
use tabled::Tabled;

use omevlan_core::{Connection, PortTopology};

use crate::cli::{GlobalOpts, ShowArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::apply::join_ids;
use super::util;

#[derive(Debug, Serialize)]
struct PortView {
    port: u32,
    component_id: i64,
    untagged: Option<u32>,
    tagged: Option<Vec<u32>>,
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Component")]
    component_id: i64,
    #[tabled(rename = "Untagged")]
    untagged: String,
    #[tabled(rename = "Tagged")]
    tagged: String,
}

impl From<&PortView> for PortRow {
    fn from(p: &PortView) -> Self {
        Self {
            port: p.port,
            component_id: p.component_id,
            untagged: p.untagged.map_or_else(|| "-".into(), |v| v.to_string()),
            tagged: p.tagged.as_deref().map_or_else(|| "-".into(), join_ids),
        }
    }
}

fn views(topology: &PortTopology) -> Vec<PortView> {
    topology
        .iter()
        .map(|(port, state)| PortView {
            port,
            component_id: state.component_id,
            untagged: state.untagged,
            tagged: state.tagged.clone(),
        })
        .collect()
}

pub async fn handle(args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (template, nic) = util::target(&args.target)?;
    let conn_config = config::build_connection_config(global)?;

    let conn = Connection::open(&conn_config).await?;
    let result = conn.reconciler().topology(&template, &nic).await;
    conn.close().await;
    let (template_id, topology) = result?;
    tracing::debug!(template_id, ports = topology.len(), "topology loaded");

    let ports = views(&topology);
    let rendered = output::render_list(
        &global.output,
        &ports,
        |p| PortRow::from(p),
        |p| format!("{}\t{}", p.port, p.component_id),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
