//! Output formatting: plain, table, JSON, YAML.
//!
//! Plain streams one line per device as the run progresses and ends with
//! a summary line. The structured formats and the table are rendered once
//! the run is over, from the lines the reporter collected.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

use jamfsync_core::{BatchReport, Outcome, ReportLine, Reporter, RunReport};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Reporter ─────────────────────────────────────────────────────────

/// Sends every line to the log (target `jamfsync::report`), echoes it to
/// stdout in plain mode, and keeps it for the final rendering.
pub struct CliReporter {
    stream: bool,
    lines: Vec<ReportLine>,
}

impl CliReporter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self {
            stream: format == OutputFormat::Plain && !quiet,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }
}

impl Reporter for CliReporter {
    fn record(&mut self, line: &ReportLine) {
        info!(target: "jamfsync::report", "{line}");
        if self.stream {
            print_output(&line.to_string(), false);
        }
        self.lines.push(line.clone());
    }
}

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "JSS ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ReportLine> for LineRow {
    fn from(line: &ReportLine) -> Self {
        let (outcome, detail) = match &line.outcome {
            Outcome::Updated { changes } => ("updated", join(changes)),
            Outcome::Planned { changes } => ("would update", join(changes)),
            Outcome::Partial { written, failed } => {
                let mut parts: Vec<String> = written.iter().map(ToString::to_string).collect();
                parts.extend(
                    failed
                        .iter()
                        .map(|f| format!("{} failed: {}", f.attribute, f.message)),
                );
                ("partial", parts.join("; "))
            }
            Outcome::Failed { stage, message } => ("error", format!("{stage}: {message}")),
            Outcome::Commanded { command } => ("command sent", command.clone()),
        };
        Self {
            id: line.device.id.to_string(),
            name: line.device.name.clone(),
            outcome,
            detail,
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ── Render dispatchers ───────────────────────────────────────────────

#[derive(Serialize)]
struct Document<'a, S: Serialize> {
    summary: &'a S,
    devices: &'a [ReportLine],
}

/// Render a finished run. In plain mode the device lines were already
/// streamed, so only the summary remains.
pub fn render_run(
    format: OutputFormat,
    report: &RunReport,
    lines: &[ReportLine],
) -> Result<String, CliError> {
    render(format, report, lines)
}

pub fn render_batch(
    format: OutputFormat,
    report: &BatchReport,
    lines: &[ReportLine],
) -> Result<String, CliError> {
    render(format, report, lines)
}

fn render<S>(format: OutputFormat, summary: &S, lines: &[ReportLine]) -> Result<String, CliError>
where
    S: Serialize + std::fmt::Display,
{
    let document = Document {
        summary,
        devices: lines,
    };
    match format {
        OutputFormat::Plain => Ok(summary.to_string()),
        OutputFormat::Table => {
            let rows: Vec<LineRow> = lines.iter().map(LineRow::from).collect();
            if rows.is_empty() {
                return Ok(summary.to_string());
            }
            Ok(format!("{}\n{summary}", render_table(&rows)))
        }
        OutputFormat::Json => render_json(&document, false),
        OutputFormat::JsonCompact => render_json(&document, true),
        OutputFormat::Yaml => render_yaml(&document),
    }
}

/// Render plain rows without a run summary. Plain mode is left to the
/// caller.
pub fn render_rows<R>(format: OutputFormat, rows: &[R]) -> Result<String, CliError>
where
    R: Serialize + Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
        OutputFormat::Yaml => render_yaml(rows),
        OutputFormat::Plain => Ok(String::new()),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(|e| CliError::Io(io::Error::other(e)))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Io(io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use jamfsync_core::{Change, DeviceRef};

    use super::*;

    fn updated_line() -> ReportLine {
        ReportLine::new(
            DeviceRef::new("7", "Lab-Mac-07"),
            Outcome::Updated {
                changes: vec![Change {
                    attribute: "Jamf Site".into(),
                    previous: Some("Old".into()),
                    desired: "North".into(),
                    compared: true,
                }],
            },
        )
    }

    fn summary() -> RunReport {
        RunReport {
            policy: "site-attribute".into(),
            scope: "all devices".into(),
            skipped: 2,
            updated: 1,
            ..RunReport::default()
        }
    }

    #[test]
    fn plain_prints_only_the_summary() {
        let out = render_run(OutputFormat::Plain, &summary(), &[updated_line()]).unwrap();
        assert_eq!(out, summary().to_string());
    }

    #[test]
    fn json_carries_summary_and_lines() {
        let out = render_run(OutputFormat::JsonCompact, &summary(), &[updated_line()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["summary"]["skipped"], 2);
        assert_eq!(value["devices"][0]["outcome"], "updated");
        assert_eq!(value["devices"][0]["device"]["id"], "7");
    }

    #[test]
    fn table_lists_each_device() {
        let out = render_run(OutputFormat::Table, &summary(), &[updated_line()]).unwrap();
        assert!(out.contains("Lab-Mac-07"));
        assert!(out.contains("Jamf Site: North"));
        assert!(out.ends_with(&summary().to_string()));
    }

    #[test]
    fn reporter_keeps_lines_when_not_streaming() {
        let mut reporter = CliReporter::new(OutputFormat::Json, false);
        reporter.record(&updated_line());
        assert_eq!(reporter.lines().len(), 1);
    }
}
