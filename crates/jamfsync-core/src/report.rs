// ── Run reporting ──
//
// One `ReportLine` per device that was written, would have been written,
// or failed. Skipped devices produce no line. The `Reporter` is owned by
// the caller and handed to the engine; lines for one device are always
// recorded together.

use std::fmt;

use serde::Serialize;
use strum::Display;

use crate::decision::Change;
use crate::model::DeviceRef;

/// Where a per-device failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Fetch,
    Write,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedWrite {
    pub attribute: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Every planned write succeeded.
    Updated { changes: Vec<Change> },
    /// Dry run: these writes would have been made.
    Planned { changes: Vec<Change> },
    /// Some writes landed, some did not.
    Partial {
        written: Vec<Change>,
        failed: Vec<FailedWrite>,
    },
    /// Nothing was written for this device.
    Failed { stage: Stage, message: String },
    /// Included in a batch command the server accepted. Whether the
    /// command reached this device is not reported back.
    Commanded { command: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub device: DeviceRef,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ReportLine {
    pub fn new(device: DeviceRef, outcome: Outcome) -> Self {
        Self { device, outcome }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Failed { .. } | Outcome::Partial { .. }
        )
    }
}

fn join_changes(f: &mut fmt::Formatter<'_>, changes: &[Change]) -> fmt::Result {
    for change in changes {
        write!(f, ", {change}")?;
    }
    Ok(())
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.outcome {
            Outcome::Updated { .. } => "Updated",
            Outcome::Planned { .. } => "Would update",
            Outcome::Partial { .. } => "Partially updated",
            Outcome::Failed { .. } => "Error",
            Outcome::Commanded { .. } => "Command sent",
        };
        write!(
            f,
            "{prefix} - JSS ID: {}, Name: {}",
            self.device.id, self.device.name
        )?;

        match &self.outcome {
            Outcome::Updated { changes } | Outcome::Planned { changes } => join_changes(f, changes),
            Outcome::Partial { written, failed } => {
                join_changes(f, written)?;
                for failure in failed {
                    write!(f, ", {} failed: {}", failure.attribute, failure.message)?;
                }
                Ok(())
            }
            Outcome::Failed { stage, message } => write!(f, ", {stage} failed: {message}"),
            Outcome::Commanded { command } => {
                write!(f, ", {command} (delivery not confirmed per device)")
            }
        }
    }
}

/// Sink for report lines.
pub trait Reporter {
    fn record(&mut self, line: &ReportLine);
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub lines: Vec<ReportLine>,
}

impl Reporter for MemoryReporter {
    fn record(&mut self, line: &ReportLine) {
        self.lines.push(line.clone());
    }
}

// ── Run summaries ───────────────────────────────────────────────────

/// Counts for a per-device run. Each count is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub policy: String,
    pub scope: String,
    /// Already reconciled; no write attempted.
    pub skipped: usize,
    /// All writes succeeded (or, on a dry run, would have been attempted).
    pub updated: usize,
    /// Device could not be read, or its first write was rejected.
    pub errored: usize,
    /// Some writes succeeded and at least one failed.
    pub partial: usize,
    /// Stopped before every device was visited.
    pub cancelled: bool,
    pub dry_run: bool,
}

impl RunReport {
    /// Devices for which a decision was reached.
    pub fn evaluated(&self) -> usize {
        self.skipped + self.updated + self.partial
    }

    pub fn has_failures(&self) -> bool {
        self.errored > 0 || self.partial > 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "to update" } else { "updated" };
        write!(
            f,
            "{} on {}: {} skipped, {} {verb}, {} errored",
            self.policy, self.scope, self.skipped, self.updated, self.errored
        )?;
        if self.partial > 0 {
            write!(f, ", {} partially updated", self.partial)?;
        }
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// The server accepted the command for the whole list.
    Accepted,
    /// Dry run; nothing was sent.
    Planned,
    /// The scope was empty; nothing to send.
    Empty,
    /// The server rejected the request; applies to every device listed.
    Rejected { message: String },
    /// Cancelled before the command was sent.
    Cancelled,
}

/// Result of a single batch command call.
///
/// The remote service answers once for the whole list, so acceptance
/// means the command was queued for every device, not that each device
/// has processed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub command: String,
    pub scope: String,
    pub devices: Vec<DeviceRef>,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub dry_run: bool,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Rejected { .. })
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.devices.len();
        match &self.outcome {
            BatchOutcome::Accepted => write!(
                f,
                "{} queued for {count} device(s) on {}; per-device results are not confirmed by this call",
                self.command, self.scope
            ),
            BatchOutcome::Planned => {
                write!(f, "{} would be sent to {count} device(s) on {}", self.command, self.scope)
            }
            BatchOutcome::Empty => write!(f, "{}: no devices in {}", self.command, self.scope),
            BatchOutcome::Rejected { message } => write!(
                f,
                "{} rejected for all {count} device(s) on {}: {message}",
                self.command, self.scope
            ),
            BatchOutcome::Cancelled => write!(f, "{} cancelled before sending", self.command),
        }
    }
}
