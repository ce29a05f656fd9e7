// ── Reconciliation policies ──
//
// A policy names the record sections it needs and derives a desired state
// from a snapshot. Policies are pure apart from reading the clock.

use chrono::{DateTime, Utc};

use crate::classifier::Classifier;
use crate::decision::{DesiredState, FieldUpdate};
use crate::model::{AttributeTarget, DeviceSnapshot, Field};

/// Jamf's display format for dates written into custom attributes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Site name Jamf reports for records that belong to no site.
pub const NO_SITE: &str = "None";

/// Format a UTC instant the way Jamf displays dates.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Decides what a device should look like.
pub trait Policy {
    /// Short name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Record sections the snapshot must contain.
    fn fields(&self) -> &[Field];

    fn desired(&self, snapshot: &DeviceSnapshot) -> DesiredState;
}

// ── Unmanage ────────────────────────────────────────────────────────

/// Clear the management flag on managed devices and stamp when it
/// happened.
///
/// Only the flag is tracked, so devices that are already unmanaged are
/// skipped without any write. When the flag is cleared, the unmanaged
/// date is written next and then, if configured, the device's previous
/// inventory date.
pub struct UnmanagePolicy {
    unmanaged_date: AttributeTarget,
    previous_inventory: Option<AttributeTarget>,
    clock: fn() -> DateTime<Utc>,
}

impl UnmanagePolicy {
    pub fn new(unmanaged_date: AttributeTarget) -> Self {
        Self {
            unmanaged_date,
            previous_inventory: None,
            clock: Utc::now,
        }
    }

    /// Also record the last inventory date the device reported.
    pub fn with_previous_inventory(mut self, target: AttributeTarget) -> Self {
        self.previous_inventory = Some(target);
        self
    }

    /// Replace the wall clock (tests).
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

impl Policy for UnmanagePolicy {
    fn name(&self) -> &'static str {
        "unmanage"
    }

    fn fields(&self) -> &[Field] {
        &[Field::Management]
    }

    fn desired(&self, snapshot: &DeviceSnapshot) -> DesiredState {
        let now = format_timestamp((self.clock)());
        let mut desired = DesiredState::tracking(FieldUpdate::Managed(false))
            .then(FieldUpdate::attribute(self.unmanaged_date.clone(), now));

        if let Some(target) = &self.previous_inventory {
            match &snapshot.last_inventory_update {
                Some(date) => {
                    desired = desired.then(FieldUpdate::attribute(target.clone(), date.clone()));
                }
                None => tracing::debug!(device = %snapshot.id, "no previous inventory date to record"),
            }
        }
        desired
    }
}

// ── Site attribute ──────────────────────────────────────────────────

/// Mirror the live site name into a custom attribute, since sites cannot
/// be used as smart group criteria.
pub struct SiteAttributePolicy {
    target: AttributeTarget,
}

impl SiteAttributePolicy {
    pub fn new(target: AttributeTarget) -> Self {
        Self { target }
    }
}

impl Policy for SiteAttributePolicy {
    fn name(&self) -> &'static str {
        "site-attribute"
    }

    fn fields(&self) -> &[Field] {
        &[Field::Site, Field::ExtensionAttributes]
    }

    fn desired(&self, snapshot: &DeviceSnapshot) -> DesiredState {
        let site = snapshot.site_name.as_deref().unwrap_or(NO_SITE);
        DesiredState::tracking(FieldUpdate::attribute(self.target.clone(), site))
    }
}

// ── macOS support ───────────────────────────────────────────────────

/// Write the newest supported macOS release, derived from the model
/// identifier, into a custom attribute.
pub struct MacOsSupportPolicy<'a> {
    target: AttributeTarget,
    classifier: &'a Classifier,
}

impl MacOsSupportPolicy<'static> {
    pub fn new(target: AttributeTarget) -> Self {
        Self::with_classifier(target, Classifier::macos())
    }
}

impl<'a> MacOsSupportPolicy<'a> {
    pub fn with_classifier(target: AttributeTarget, classifier: &'a Classifier) -> Self {
        Self { target, classifier }
    }
}

impl Policy for MacOsSupportPolicy<'_> {
    fn name(&self) -> &'static str {
        "macos-supported"
    }

    fn fields(&self) -> &[Field] {
        &[Field::ModelIdentifier, Field::ExtensionAttributes]
    }

    fn desired(&self, snapshot: &DeviceSnapshot) -> DesiredState {
        let label = self.classifier.classify(snapshot.model_identifier.as_deref());
        DesiredState::tracking(FieldUpdate::attribute(self.target.clone(), label))
    }
}
