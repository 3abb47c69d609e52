// ── Reconciliation pipeline ──
//
// One sequential run: shape check, catalog, validation, template lookup,
// topology, plan, and at most one write. Every intermediate value lives
// on the stack of `Reconciler::run`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ManagementApi;
use crate::catalog::VlanCatalog;
use crate::declaration::Declaration;
use crate::error::CoreError;
use crate::locator::TemplateRef;
use crate::plan::{PlanOutcome, UpdatePlan, plan};
use crate::topology::PortTopology;

pub const APPLIED_MESSAGE: &str = "Successfully applied the network settings to the template";
pub const NO_CHANGES_MESSAGE: &str = "No changes found to be applied";
pub const PENDING_MESSAGE: &str = "Changes found to be applied";

/// Everything needed to reconcile one template NIC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub template: TemplateRef,
    pub nic_identifier: String,
    pub declaration: Declaration,
}

/// A declaration file: template selection, NIC, and the two lists.
///
/// Every field is optional here so that command-line options can fill in
/// or override what the file leaves out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_identifier: Option<String>,
    #[serde(flatten)]
    pub declaration: Declaration,
}

impl DeclarationDocument {
    pub fn into_request(self) -> Result<ReconcileRequest, CoreError> {
        let template = TemplateRef::from_parts(self.template_id, self.template_name)?;
        let nic_identifier = self
            .nic_identifier
            .filter(|nic| !nic.is_empty())
            .ok_or(CoreError::MissingField {
                field: "nic_identifier",
            })?;
        Ok(ReconcileRequest {
            template,
            nic_identifier,
            declaration: self.declaration,
        })
    }
}

/// Whether a computed plan is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Apply,
    DryRun,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The plan was submitted and accepted.
    Applied(UpdatePlan),
    /// A plan was computed but not submitted.
    Planned(UpdatePlan),
    NoChange,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Applied(_) => APPLIED_MESSAGE,
            Self::Planned(_) => PENDING_MESSAGE,
            Self::NoChange => NO_CHANGES_MESSAGE,
        }
    }

    pub fn changed(&self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub fn plan(&self) -> Option<&UpdatePlan> {
        match self {
            Self::Applied(plan) | Self::Planned(plan) => Some(plan),
            Self::NoChange => None,
        }
    }
}

/// Runs the reconciliation pipeline against a management service.
pub struct Reconciler<'a, A> {
    api: &'a A,
}

impl<'a, A: ManagementApi> Reconciler<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Reconcile one template NIC.
    ///
    /// Declaration shape problems are reported before the first request.
    /// Any failure aborts the run before the write.
    pub async fn run(&self, request: &ReconcileRequest, mode: Mode) -> Result<Outcome, CoreError> {
        request.declaration.check_shape()?;

        let catalog = VlanCatalog::fetch(self.api).await?;
        let desired = request.declaration.validate(&catalog)?;
        info!(
            untagged = desired.untagged.len(),
            tagged = desired.tagged.len(),
            "declaration validated"
        );

        let template_id = request.template.resolve(self.api).await?;
        let topology = PortTopology::read(self.api, template_id, &request.nic_identifier).await?;

        let update = match plan(template_id, &topology, &desired)? {
            PlanOutcome::NoChange => {
                info!(template_id, "no changes");
                return Ok(Outcome::NoChange);
            }
            PlanOutcome::Update(update) => update,
        };

        match mode {
            Mode::DryRun => {
                info!(template_id, ports = update.ports.len(), "plan computed (dry run)");
                Ok(Outcome::Planned(update))
            }
            Mode::Apply => {
                self.api.submit(&update).await?;
                info!(template_id, ports = update.ports.len(), "network settings applied");
                Ok(Outcome::Applied(update))
            }
        }
    }

    /// Current port topology of a template NIC.
    pub async fn topology(
        &self,
        template: &TemplateRef,
        nic: &str,
    ) -> Result<(u32, PortTopology), CoreError> {
        let template_id = template.resolve(self.api).await?;
        let topology = PortTopology::read(self.api, template_id, nic).await?;
        Ok((template_id, topology))
    }

    /// The VLAN catalog.
    pub async fn catalog(&self) -> Result<VlanCatalog, CoreError> {
        VlanCatalog::fetch(self.api).await
    }
}
