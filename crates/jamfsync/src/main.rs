mod cli;
mod commands;
mod error;
mod output;

use std::fs::File;
use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use jamfsync_config::Overrides;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "jamfsync", &mut std::io::stdout());
            Ok(())
        }

        // Offline: no settings, no log file
        Command::Classify(args) => {
            init_tracing(&cli.global, None)?;
            commands::classify::handle(&args, &cli.global)
        }

        cmd => {
            let settings = jamfsync_config::load(cli.global.config.as_deref(), &overrides(&cli.global))?;
            // Held until the command returns so the file writer flushes.
            let _guard = init_tracing(&cli.global, Some(&settings.log_file))?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &settings, &cli.global).await
        }
    }
}

fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        url: global.url.clone(),
        timeout: global.timeout,
        insecure: global.insecure.then_some(true),
        ca_cert: global.ca_cert.clone(),
        log_file: global.log_file.clone(),
    }
}

/// Console layer on stderr, plus a file layer when a log path is given.
///
/// The file is truncated so it holds exactly one run.
fn init_tracing(global: &GlobalOpts, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_level = if global.verbose >= 2 { "debug" } else { "info" };
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
    Ok(guard)
}
