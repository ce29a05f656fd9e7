// ── Reconciliation decisions ──
//
// A policy describes the state a device should be in; `Decision::evaluate`
// compares that against the snapshot and produces the ordered list of
// writes, or SKIP when nothing tracked differs.

use std::fmt;

use serde::Serialize;
use strum::Display;

use crate::model::{AttributeTarget, DeviceRef, DeviceSnapshot};

/// A single field write against a device record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// The inventory record's management flag.
    Managed(bool),
    ExtensionAttribute {
        target: AttributeTarget,
        value: String,
    },
}

impl FieldUpdate {
    pub fn attribute(target: AttributeTarget, value: impl Into<String>) -> Self {
        Self::ExtensionAttribute {
            target,
            value: value.into(),
        }
    }

    /// Human-readable name of the field being written.
    pub fn label(&self) -> &str {
        match self {
            Self::Managed(_) => "managed",
            Self::ExtensionAttribute { target, .. } => &target.name,
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Managed(managed) => managed.to_string(),
            Self::ExtensionAttribute { value, .. } => value.clone(),
        }
    }

    /// Current value on the device, rendered the same way as `value()`.
    pub fn current(&self, snapshot: &DeviceSnapshot) -> Option<String> {
        match self {
            Self::Managed(_) => snapshot.managed.map(|m| m.to_string()),
            Self::ExtensionAttribute { target, .. } => snapshot
                .attribute_value(&target.definition_id)
                .map(str::to_owned),
        }
    }

    /// Exact comparison: booleans by value, strings case-sensitively.
    pub fn is_satisfied_by(&self, snapshot: &DeviceSnapshot) -> bool {
        match self {
            Self::Managed(want) => snapshot.managed == Some(*want),
            Self::ExtensionAttribute { target, value } => {
                snapshot.attribute_value(&target.definition_id) == Some(value.as_str())
            }
        }
    }

    fn change(&self, snapshot: &DeviceSnapshot) -> Change {
        Change {
            attribute: self.label().to_owned(),
            previous: self.current(snapshot),
            desired: self.value(),
            compared: true,
        }
    }

    /// Dependent writes are never compared, so their prior value is unknown.
    fn unread_change(&self) -> Change {
        Change {
            attribute: self.label().to_owned(),
            previous: None,
            desired: self.value(),
            compared: false,
        }
    }
}

/// What a policy wants a device to look like.
///
/// Only `tracked` updates are compared against current state. `dependent`
/// updates ride along, in order, whenever a tracked update is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub tracked: Vec<FieldUpdate>,
    pub dependent: Vec<FieldUpdate>,
}

impl DesiredState {
    pub fn tracking(update: FieldUpdate) -> Self {
        Self {
            tracked: vec![update],
            dependent: Vec::new(),
        }
    }

    /// Append a dependent write.
    pub fn then(mut self, update: FieldUpdate) -> Self {
        self.dependent.push(update);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Skip,
    Update,
}

/// One attribute transition, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub attribute: String,
    /// Value read from the device; `None` when it had none.
    pub previous: Option<String>,
    pub desired: String,
    /// False when the attribute was written without being read first.
    pub compared: bool,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let previous = match (&self.previous, self.compared) {
            (_, false) => "not read",
            (Some(value), true) => value.as_str(),
            (None, true) => "none",
        };
        write!(f, "{}: {} (previous: {previous})", self.attribute, self.desired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub update: FieldUpdate,
    pub change: Change,
    /// Written only because a tracked field changed.
    pub dependent: bool,
}

/// The per-device outcome of comparing current and desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub device: DeviceRef,
    pub action: Action,
    /// Tracked writes first, then dependents; empty on SKIP.
    pub writes: Vec<PlannedWrite>,
}

impl Decision {
    pub fn evaluate(device: &DeviceRef, snapshot: &DeviceSnapshot, desired: DesiredState) -> Self {
        let pending: Vec<FieldUpdate> = desired
            .tracked
            .into_iter()
            .filter(|update| !update.is_satisfied_by(snapshot))
            .collect();

        if pending.is_empty() {
            return Self {
                device: device.clone(),
                action: Action::Skip,
                writes: Vec::new(),
            };
        }

        let tracked = pending.into_iter().map(|update| (update, false));
        let dependent = desired.dependent.into_iter().map(|update| (update, true));
        let writes = tracked
            .chain(dependent)
            .map(|(update, dependent)| PlannedWrite {
                change: if dependent {
                    update.unread_change()
                } else {
                    update.change(snapshot)
                },
                update,
                dependent,
            })
            .collect();

        Self {
            device: device.clone(),
            action: Action::Update,
            writes,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.action == Action::Skip
    }

    pub fn changes(&self) -> Vec<Change> {
        self.writes.iter().map(|w| w.change.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ExtensionAttribute;

    fn site_target() -> AttributeTarget {
        AttributeTarget::new("Jamf Site", "12")
    }

    fn snapshot_with_site_attribute(value: &str) -> DeviceSnapshot {
        let mut snapshot = DeviceSnapshot::new("7", "LAB-MBP-07");
        snapshot.extension_attributes = vec![ExtensionAttribute {
            definition_id: "12".into(),
            name: Some("Jamf Site".into()),
            values: vec![value.into()],
        }];
        snapshot
    }

    #[test]
    fn equal_tracked_values_skip() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let snapshot = snapshot_with_site_attribute("Eau Claire");
        let desired = DesiredState::tracking(FieldUpdate::attribute(site_target(), "Eau Claire"));

        let decision = Decision::evaluate(&device, &snapshot, desired);

        assert!(decision.is_skip());
        assert!(decision.writes.is_empty());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let snapshot = snapshot_with_site_attribute("eau claire");
        let desired = DesiredState::tracking(FieldUpdate::attribute(site_target(), "Eau Claire"));

        let decision = Decision::evaluate(&device, &snapshot, desired);

        assert_eq!(decision.action, Action::Update);
        assert_eq!(
            decision.changes(),
            vec![Change {
                attribute: "Jamf Site".into(),
                previous: Some("eau claire".into()),
                desired: "Eau Claire".into(),
                compared: true,
            }]
        );
    }

    #[test]
    fn dependents_follow_tracked_writes() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let mut snapshot = DeviceSnapshot::new("7", "LAB-MBP-07");
        snapshot.managed = Some(true);
        let desired = DesiredState::tracking(FieldUpdate::Managed(false))
            .then(FieldUpdate::attribute(AttributeTarget::new("Unmanaged Date", "20"), "2024-03-08 14:02:51"));

        let decision = Decision::evaluate(&device, &snapshot, desired);

        let order: Vec<(&str, bool)> = decision
            .writes
            .iter()
            .map(|w| (w.update.label(), w.dependent))
            .collect();
        assert_eq!(order, vec![("managed", false), ("Unmanaged Date", true)]);
        assert_eq!(decision.writes[0].change.previous.as_deref(), Some("true"));
    }

    #[test]
    fn dependent_changes_do_not_claim_a_prior_value() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let mut snapshot = DeviceSnapshot::new("7", "LAB-MBP-07");
        snapshot.managed = Some(true);
        // Even a value the snapshot happens to carry was never compared.
        snapshot.extension_attributes = vec![ExtensionAttribute {
            definition_id: "20".into(),
            name: Some("Unmanaged Date".into()),
            values: vec!["2020-01-01 00:00:00".into()],
        }];
        let desired = DesiredState::tracking(FieldUpdate::Managed(false))
            .then(FieldUpdate::attribute(AttributeTarget::new("Unmanaged Date", "20"), "2024-03-08 14:02:51"));

        let decision = Decision::evaluate(&device, &snapshot, desired);

        let dependent = &decision.writes[1].change;
        assert!(!dependent.compared);
        assert_eq!(dependent.previous, None);
        assert_eq!(
            dependent.to_string(),
            "Unmanaged Date: 2024-03-08 14:02:51 (previous: not read)"
        );
        assert_eq!(decision.writes[0].change.to_string(), "managed: false (previous: true)");
    }

    #[test]
    fn dependents_alone_never_trigger_a_write() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let mut snapshot = DeviceSnapshot::new("7", "LAB-MBP-07");
        snapshot.managed = Some(false);
        let desired = DesiredState::tracking(FieldUpdate::Managed(false))
            .then(FieldUpdate::attribute(AttributeTarget::new("Unmanaged Date", "20"), "now"));

        assert!(Decision::evaluate(&device, &snapshot, desired).is_skip());
    }

    #[test]
    fn missing_attribute_counts_as_different() {
        let device = DeviceRef::new("7", "LAB-MBP-07");
        let snapshot = DeviceSnapshot::new("7", "LAB-MBP-07");
        let desired = DesiredState::tracking(FieldUpdate::attribute(site_target(), "None"));

        let decision = Decision::evaluate(&device, &snapshot, desired);

        assert_eq!(decision.action, Action::Update);
        assert_eq!(decision.writes[0].change.previous, None);
        assert_eq!(decision.writes[0].change.to_string(), "Jamf Site: None (previous: none)");
    }
}
