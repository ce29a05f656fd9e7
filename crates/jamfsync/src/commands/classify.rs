//! Offline classifier lookup.

use serde::Serialize;
use tabled::Tabled;

use jamfsync_core::Classifier;

use crate::cli::{ClassifyArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct Classification<'a> {
    #[tabled(rename = "Model")]
    model: &'a str,
    #[tabled(rename = "Latest supported")]
    latest_supported: &'a str,
}

pub fn handle(args: &ClassifyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let classifier = Classifier::macos();
    let rows: Vec<Classification<'_>> = args
        .models
        .iter()
        .map(|model| Classification {
            model,
            latest_supported: classifier.classify(Some(model)),
        })
        .collect();

    let out = match global.output {
        OutputFormat::Plain => rows
            .iter()
            .map(|r| format!("{}: {}", r.model, r.latest_supported))
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_rows(format, &rows)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
