//! Batch MDM command handlers.

use tokio_util::sync::CancellationToken;

use jamfsync_config::Settings;
use jamfsync_core::{DeviceKind, Scope};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, CliReporter};

const UNMANAGE_DEVICE: &str = "UnmanageDevice";

/// Send `UnmanageDevice` to every mobile device in the static group in a
/// single request.
pub async fn unmanage_mobile_devices(
    settings: &Settings,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let group = settings.require_group(DeviceKind::MobileDevice)?;
    let inventory = super::connect(settings, DeviceKind::MobileDevice).await?;

    let mut reporter = CliReporter::new(global.output, global.quiet);
    let result = jamfsync_core::run_batch_command(
        &inventory,
        &Scope::Group(group),
        UNMANAGE_DEVICE,
        &mut reporter,
        super::options(global),
        cancel,
    )
    .await;
    super::disconnect(&inventory).await;

    let report = result?;
    let out = output::render_batch(global.output, &report, reporter.lines())?;
    output::print_output(&out, global.quiet);
    super::finish_batch(&report)
}
