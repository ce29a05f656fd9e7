//! macOS support handler.

use tokio_util::sync::CancellationToken;

use jamfsync_config::{AttributeSlot, Settings};
use jamfsync_core::{DeviceKind, MacOsSupportPolicy};

use crate::cli::{GlobalOpts, ScopeArgs};
use crate::error::CliError;

pub async fn handle(
    settings: &Settings,
    args: ScopeArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let policy = MacOsSupportPolicy::new(settings.require_attribute(AttributeSlot::Primary)?);
    let scope = super::scope_of(args.group);

    let inventory = super::connect(settings, DeviceKind::Computer).await?;
    super::reconcile(&inventory, &scope, &policy, global, cancel).await
}
