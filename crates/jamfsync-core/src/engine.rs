// ── Reconciliation engine ──
//
// Enumerate → fetch → decide → write, one device at a time. Only scope
// resolution can fail the run; every per-device error is recorded and
// the loop moves on. Cancellation is checked between devices, so a
// device's writes are never interrupted halfway and every line already
// recorded stays recorded.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::decision::{Decision, PlannedWrite};
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::model::{DeviceId, DeviceRef, Scope};
use crate::policy::Policy;
use crate::report::{
    BatchOutcome, BatchReport, FailedWrite, Outcome, ReportLine, Reporter, RunReport, Stage,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Decide and report, but never write.
    pub dry_run: bool,
}

/// How one device ended up, for the run totals.
enum Tally {
    Skipped,
    Updated,
    Partial,
    Errored,
}

/// Reconcile every device in `scope` against `policy`.
///
/// Fails only when the scope cannot be enumerated. Devices are processed
/// strictly in sequence; a device whose tracked fields already match is
/// skipped without a write and without a report line.
pub async fn run<I, P, R>(
    inventory: &I,
    scope: &Scope,
    policy: &P,
    reporter: &mut R,
    options: RunOptions,
    cancel: &CancellationToken,
) -> Result<RunReport, CoreError>
where
    I: Inventory,
    P: Policy + ?Sized,
    R: Reporter + ?Sized,
{
    let devices = inventory.list_devices(scope).await?;
    info!(
        policy = policy.name(),
        kind = %inventory.kind(),
        %scope,
        devices = devices.len(),
        dry_run = options.dry_run,
        "starting reconciliation"
    );

    let mut report = RunReport {
        policy: policy.name().to_owned(),
        scope: scope.to_string(),
        dry_run: options.dry_run,
        ..RunReport::default()
    };

    for device in &devices {
        if cancel.is_cancelled() {
            warn!(next = %device.id, "run cancelled");
            report.cancelled = true;
            break;
        }

        let (tally, line) = reconcile(inventory, policy, device, options).await;
        if let Some(line) = line {
            reporter.record(&line);
        }
        match tally {
            Tally::Skipped => report.skipped += 1,
            Tally::Updated => report.updated += 1,
            Tally::Partial => report.partial += 1,
            Tally::Errored => report.errored += 1,
        }
    }

    info!(%report, "reconciliation finished");
    Ok(report)
}

async fn reconcile<I, P>(
    inventory: &I,
    policy: &P,
    device: &DeviceRef,
    options: RunOptions,
) -> (Tally, Option<ReportLine>)
where
    I: Inventory,
    P: Policy + ?Sized,
{
    let snapshot = match inventory.get_device(&device.id, policy.fields()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(device = %device.id, error = %e, "could not read device");
            let line = ReportLine::new(
                device.clone(),
                Outcome::Failed {
                    stage: Stage::Fetch,
                    message: failure_message(&e),
                },
            );
            return (Tally::Errored, Some(line));
        }
    };

    let decision = Decision::evaluate(device, &snapshot, policy.desired(&snapshot));
    if decision.is_skip() {
        debug!(device = %device.id, "already reconciled");
        return (Tally::Skipped, None);
    }

    if options.dry_run {
        let line = ReportLine::new(
            device.clone(),
            Outcome::Planned {
                changes: decision.changes(),
            },
        );
        return (Tally::Updated, Some(line));
    }

    let (tally, outcome) = apply(inventory, &device.id, decision.writes).await;
    (tally, Some(ReportLine::new(device.clone(), outcome)))
}

/// Perform the planned writes in order.
///
/// A rejected tracked write ends the sequence: its dependents describe a
/// change that did not happen. Dependent writes are independent of each
/// other, so each one is attempted even if an earlier dependent failed.
async fn apply<I: Inventory>(inventory: &I, id: &DeviceId, writes: Vec<PlannedWrite>) -> (Tally, Outcome) {
    let mut written = Vec::new();
    let mut failed = Vec::new();
    let mut tracked_failed = false;

    for write in writes {
        if tracked_failed {
            debug!(device = %id, attribute = %write.change.attribute, "not written");
            continue;
        }

        match inventory.update_device(id, &write.update).await {
            Ok(()) => {
                debug!(device = %id, attribute = %write.change.attribute, value = %write.change.desired, "written");
                written.push(write.change);
            }
            Err(e) => {
                warn!(device = %id, attribute = %write.change.attribute, error = %e, "write rejected");
                tracked_failed = !write.dependent;
                failed.push(FailedWrite {
                    attribute: write.change.attribute,
                    message: failure_message(&e),
                });
            }
        }
    }

    if failed.is_empty() {
        return (Tally::Updated, Outcome::Updated { changes: written });
    }
    if written.is_empty() {
        let message = failed
            .into_iter()
            .map(|f| format!("{}: {}", f.attribute, f.message))
            .collect::<Vec<_>>()
            .join("; ");
        return (
            Tally::Errored,
            Outcome::Failed {
                stage: Stage::Write,
                message,
            },
        );
    }
    (Tally::Partial, Outcome::Partial { written, failed })
}

/// The remote's own wording, without the device id the line already carries.
fn failure_message(err: &CoreError) -> String {
    match err {
        CoreError::DeviceUnreadable { message, .. } | CoreError::WriteRejected { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

/// Send one MDM command to every device in `scope` in a single call.
///
/// The server accepts or rejects the list as a whole and does not report
/// per-device delivery, so an accepted command is recorded for each
/// device as sent, not as confirmed.
pub async fn run_batch_command<I, R>(
    inventory: &I,
    scope: &Scope,
    command: &str,
    reporter: &mut R,
    options: RunOptions,
    cancel: &CancellationToken,
) -> Result<BatchReport, CoreError>
where
    I: Inventory,
    R: Reporter + ?Sized,
{
    let devices = inventory.list_devices(scope).await?;
    info!(command, kind = %inventory.kind(), %scope, devices = devices.len(), "batch command");

    let outcome = if devices.is_empty() {
        BatchOutcome::Empty
    } else if cancel.is_cancelled() {
        BatchOutcome::Cancelled
    } else if options.dry_run {
        BatchOutcome::Planned
    } else {
        let ids: Vec<DeviceId> = devices.iter().map(|d| d.id.clone()).collect();
        match inventory.issue_command(command, &ids).await {
            Ok(()) => {
                for device in &devices {
                    reporter.record(&ReportLine::new(
                        device.clone(),
                        Outcome::Commanded {
                            command: command.to_owned(),
                        },
                    ));
                }
                BatchOutcome::Accepted
            }
            Err(e) => {
                warn!(command, error = %e, "batch command rejected");
                let message = failure_message(&e);
                for device in &devices {
                    reporter.record(&ReportLine::new(
                        device.clone(),
                        Outcome::Failed {
                            stage: Stage::Command,
                            message: message.clone(),
                        },
                    ));
                }
                BatchOutcome::Rejected { message }
            }
        }
    };

    let report = BatchReport {
        command: command.to_owned(),
        scope: scope.to_string(),
        devices,
        outcome,
        dry_run: options.dry_run,
    };
    info!(%report, "batch command finished");
    Ok(report)
}
