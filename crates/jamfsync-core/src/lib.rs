//! Reconciliation core between `jamfsync-api` and the CLI.
//!
//! - **[`engine`]**: the per-device loop. [`run`](engine::run) enumerates a
//!   [`Scope`], fetches each device, asks a [`Policy`] for the desired
//!   state, and writes only what differs.
//!   [`run_batch_command`](engine::run_batch_command) sends one MDM
//!   command to a whole scope in a single call.
//!
//! - **[`Inventory`]**: the remote contract the engine consumes, with
//!   [`JamfInventory`] as the Jamf Pro implementation.
//!
//! - **[`Classifier`]**: ordered first-match-wins rules mapping a model
//!   identifier to the newest supported macOS release.
//!
//! - **Policies** ([`policy`]): unmanage, site attribute, and macOS support.
//!
//! - **Reporting** ([`report`]): per-device [`ReportLine`]s delivered to a
//!   caller-owned [`Reporter`], plus [`RunReport`] / [`BatchReport`] totals.

pub mod classifier;
pub mod decision;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod model;
pub mod policy;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classifier::{ClassificationRule, Classifier};
pub use decision::{Action, Change, Decision, DesiredState, FieldUpdate};
pub use engine::{RunOptions, run, run_batch_command};
pub use error::CoreError;
pub use inventory::{Inventory, JamfInventory};
pub use model::{
    AttributeTarget, DeviceId, DeviceKind, DeviceRef, DeviceSnapshot, ExtensionAttribute, Field,
    Scope,
};
pub use policy::{MacOsSupportPolicy, Policy, SiteAttributePolicy, UnmanagePolicy};
pub use report::{
    BatchOutcome, BatchReport, MemoryReporter, Outcome, ReportLine, Reporter, RunReport,
};
