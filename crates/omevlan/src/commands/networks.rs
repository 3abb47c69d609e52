//! `networks` handler: the appliance's VLAN catalog.

use tabled::Tabled;

use omevlan_core::{Connection, VlanNetwork};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
}

impl From<&VlanNetwork> for NetworkRow {
    fn from(n: &VlanNetwork) -> Self {
        Self {
            id: n.id,
            name: n.name.clone(),
            vlan: vlan_range(n),
        }
    }
}

fn vlan_range(n: &VlanNetwork) -> String {
    match (n.vlan_minimum, n.vlan_maximum) {
        (Some(lo), Some(hi)) if lo == hi => lo.to_string(),
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        (Some(v), None) | (None, Some(v)) => v.to_string(),
        (None, None) => "-".into(),
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let conn_config = config::build_connection_config(global)?;

    let conn = Connection::open(&conn_config).await?;
    let result = conn.reconciler().catalog().await;
    conn.close().await;
    let catalog = result?;

    let rendered = output::render_list(
        &global.output,
        catalog.networks(),
        |n| NetworkRow::from(n),
        |n| format!("{}\t{}", n.id, n.name),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
