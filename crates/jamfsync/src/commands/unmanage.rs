//! Unmanage handlers for computers and mobile devices.

use tokio_util::sync::CancellationToken;

use jamfsync_config::{AttributeSlot, Settings};
use jamfsync_core::{DeviceKind, Scope, UnmanagePolicy};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Computers in `static_group_id`: clear management, stamp the unmanaged
/// date (`xea_*_1`) and, when configured, the last inventory date
/// (`xea_*_2`).
pub async fn computers(
    settings: &Settings,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let unmanaged_date = settings.require_attribute(AttributeSlot::First)?;
    let group = settings.require_group(DeviceKind::Computer)?;

    let mut policy = UnmanagePolicy::new(unmanaged_date);
    if let Some(previous) = settings.attribute(AttributeSlot::Second) {
        policy = policy.with_previous_inventory(previous);
    }

    let inventory = super::connect(settings, DeviceKind::Computer).await?;
    super::reconcile(&inventory, &Scope::Group(group), &policy, global, cancel).await
}

/// Mobile devices in `mobile_static_group_id`: clear management and stamp
/// the unmanaged date (`mobile_xea_*`).
pub async fn mobile_devices(
    settings: &Settings,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let unmanaged_date = settings.require_attribute(AttributeSlot::Mobile)?;
    let group = settings.require_group(DeviceKind::MobileDevice)?;
    let policy = UnmanagePolicy::new(unmanaged_date);

    let inventory = super::connect(settings, DeviceKind::MobileDevice).await?;
    super::reconcile(&inventory, &Scope::Group(group), &policy, global, cancel).await
}
