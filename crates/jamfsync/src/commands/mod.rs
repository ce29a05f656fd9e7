//! Command dispatch: bridges CLI args -> core policies -> output formatting.

pub mod classify;
pub mod macos;
pub mod mdm;
pub mod site;
pub mod unmanage;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use jamfsync_api::JamfClient;
use jamfsync_config::Settings;
use jamfsync_core::{
    BatchOutcome, BatchReport, CoreError, DeviceKind, JamfInventory, Policy, RunOptions,
    RunReport, Scope,
};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, CliReporter};

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current device");
                cancel.cancel();
            }
        }
    });

    match cmd {
        Command::UnmanageComputers => unmanage::computers(settings, global, &cancel).await,
        Command::UnmanageMobileDevices => unmanage::mobile_devices(settings, global, &cancel).await,
        Command::CommandUnmanageMobileDevices => {
            mdm::unmanage_mobile_devices(settings, global, &cancel).await
        }
        Command::SiteAttribute(args) => site::handle(settings, args, global, &cancel).await,
        Command::MacosSupported(args) => macos::handle(settings, args, global, &cancel).await,
        // Classify and Completions are handled before dispatch
        Command::Classify(_) | Command::Completions(_) => unreachable!(),
    }
}

pub(crate) fn options(global: &GlobalOpts) -> RunOptions {
    RunOptions {
        dry_run: global.dry_run,
    }
}

pub(crate) fn scope_of(group: Option<String>) -> Scope {
    group.map_or(Scope::All, Scope::Group)
}

/// Build the client and fetch the first token, so bad credentials fail
/// before any device is touched.
pub(crate) async fn connect(settings: &Settings, kind: DeviceKind) -> Result<JamfInventory, CliError> {
    let conn = settings.require_connection()?;
    debug!(url = %conn.url, %kind, "connecting");
    let client = JamfClient::new(conn.url, conn.credentials, &conn.transport).map_err(CoreError::from)?;
    client.authenticate().await.map_err(CoreError::from)?;
    Ok(JamfInventory::new(Arc::new(client), kind))
}

pub(crate) async fn disconnect(inventory: &JamfInventory) {
    if let Err(e) = inventory.client().invalidate_token().await {
        debug!(error = %e, "token invalidation failed");
    }
}

/// Run `policy` over `scope` and render the result.
pub(crate) async fn reconcile<P: Policy + ?Sized>(
    inventory: &JamfInventory,
    scope: &Scope,
    policy: &P,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut reporter = CliReporter::new(global.output, global.quiet);
    let result =
        jamfsync_core::run(inventory, scope, policy, &mut reporter, options(global), cancel).await;
    disconnect(inventory).await;

    let report = result?;
    let out = output::render_run(global.output, &report, reporter.lines())?;
    output::print_output(&out, global.quiet);
    finish_run(&report)
}

fn finish_run(report: &RunReport) -> Result<(), CliError> {
    if report.has_failures() {
        return Err(CliError::DeviceErrors {
            errored: report.errored,
            partial: report.partial,
        });
    }
    if report.cancelled {
        return Err(CliError::Cancelled);
    }
    Ok(())
}

pub(crate) fn finish_batch(report: &BatchReport) -> Result<(), CliError> {
    match &report.outcome {
        BatchOutcome::Rejected { message } => Err(CliError::CommandRejected {
            command: report.command.clone(),
            devices: report.devices.len(),
            message: message.clone(),
        }),
        BatchOutcome::Cancelled => Err(CliError::Cancelled),
        BatchOutcome::Accepted | BatchOutcome::Planned | BatchOutcome::Empty => Ok(()),
    }
}
