//! VLAN reconciliation engine for OpenManage Enterprise template NICs.
//!
//! Given a declaration of untagged/tagged VLANs per NIC port, this crate
//! computes the minimal update for a configuration template and submits it
//! through the management service:
//!
//! - **[`VlanCatalog`]**: name/id lookup over the appliance's VLAN networks,
//!   with the sentinel id `0` ("no VLAN") for untagged entries.
//! - **[`TemplateRef`]**: template selection by id or exact name.
//! - **[`PortTopology`]**: per-port component ids and current VLAN state,
//!   read from the template's network hierarchy view.
//! - **[`Declaration`]**: the desired state, validated into a
//!   [`DesiredState`].
//! - **[`plan()`]**: the diff, either [`PlanOutcome::NoChange`] or one combined
//!   [`UpdatePlan`].
//! - **[`Reconciler`]**: the sequential pipeline tying these together over
//!   any [`ManagementApi`] implementation.
//! - **[`Connection`]**: an authenticated session against a real appliance.

pub mod api;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod declaration;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod plan;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::ManagementApi;
pub use catalog::{NameLookup, SENTINEL_NAME, SENTINEL_VLAN, VlanCatalog, VlanNetwork};
pub use config::{ConnectionConfig, DEFAULT_PORT, TlsVerification};
pub use connection::Connection;
pub use declaration::{Declaration, DesiredState, TaggedEntry, UntaggedEntry};
pub use error::CoreError;
pub use locator::TemplateRef;
pub use pipeline::{
    APPLIED_MESSAGE, DeclarationDocument, Mode, NO_CHANGES_MESSAGE, Outcome, PENDING_MESSAGE,
    ReconcileRequest, Reconciler,
};
pub use plan::{PlanOutcome, PortUpdate, UpdatePlan, plan};
pub use topology::{PortState, PortTopology};
