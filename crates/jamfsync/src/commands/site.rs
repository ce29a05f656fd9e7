//! Site attribute handler.

use tokio_util::sync::CancellationToken;

use jamfsync_config::{AttributeSlot, Settings};
use jamfsync_core::{DeviceKind, SiteAttributePolicy};

use crate::cli::{GlobalOpts, InventoryKind, SiteAttributeArgs};
use crate::error::CliError;

pub async fn handle(
    settings: &Settings,
    args: SiteAttributeArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let kind = match args.kind {
        InventoryKind::Computer => DeviceKind::Computer,
        InventoryKind::Mobile => DeviceKind::MobileDevice,
    };
    let policy = SiteAttributePolicy::new(settings.require_attribute(AttributeSlot::Primary)?);
    let scope = super::scope_of(args.scope.group);

    let inventory = super::connect(settings, kind).await?;
    super::reconcile(&inventory, &scope, &policy, global, cancel).await
}
