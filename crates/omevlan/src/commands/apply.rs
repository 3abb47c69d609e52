//! `apply` and `plan` handlers.

use serde::Serialize;
use tabled::Tabled;

use omevlan_core::{Connection, CoreError, Mode, Outcome, PortUpdate, UpdatePlan};

use crate::cli::{GlobalOpts, ReconcileArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Report ──────────────────────────────────────────────────────────

/// What a reconcile run prints, in every output format.
#[derive(Debug, Serialize)]
pub struct Report {
    pub msg: String,
    pub changed: bool,
    pub unreachable: bool,
    pub plan: Option<UpdatePlan>,
}

impl Report {
    fn from_outcome(outcome: Outcome) -> Self {
        let msg = outcome.message().to_owned();
        let changed = outcome.changed();
        let plan = match outcome {
            Outcome::Applied(plan) | Outcome::Planned(plan) => Some(plan),
            Outcome::NoChange => None,
        };
        Self {
            msg,
            changed,
            unreachable: false,
            plan,
        }
    }

    fn unreachable(err: &CoreError) -> Self {
        Self {
            msg: err.to_string(),
            changed: false,
            unreachable: true,
            plan: None,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

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

impl From<&PortUpdate> for PortRow {
    fn from(p: &PortUpdate) -> Self {
        Self {
            port: p.port,
            component_id: p.component_id,
            untagged: p.untagged.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            tagged: join_ids(&p.tagged),
        }
    }
}

pub(super) fn join_ids(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "-".into();
    }
    ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

fn detail(report: &Report, color: bool) -> String {
    let mut out = output::status_line(&report.msg, report.changed, color);
    if let Some(ref plan) = report.plan {
        let rows: Vec<PortRow> = plan.ports.iter().map(PortRow::from).collect();
        out.push_str(&format!("\nTemplate: {}\n", plan.template_id));
        out.push_str(&output::render_table(&rows));
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReconcileArgs, mode: Mode, global: &GlobalOpts) -> Result<(), CliError> {
    let request = util::build_request(&args)?;
    request.declaration.check_shape()?;

    let conn_config = config::build_connection_config(global)?;

    let report = match run(&conn_config, &request, mode).await {
        Ok(outcome) => Report::from_outcome(outcome),
        Err(err) if err.is_unreachable() => {
            tracing::warn!(error = %err, "appliance unreachable");
            Report::unreachable(&err)
        }
        Err(err) => return Err(err.into()),
    };

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| r.msg.clone(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

async fn run(
    conn_config: &omevlan_core::ConnectionConfig,
    request: &omevlan_core::ReconcileRequest,
    mode: Mode,
) -> Result<Outcome, CoreError> {
    let conn = Connection::open(conn_config).await?;
    let result = conn.reconciler().run(request, mode).await;
    conn.close().await;
    result
}
