// ── Device domain model ──
//
// What the engine knows about a device: identity, the scope it was found
// in, and a snapshot of the fields a policy asked for. Snapshots are read
// fresh every run and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Remote-assigned device identifier (the "JSS ID").
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u64> for DeviceId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Which inventory a device lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceKind {
    Computer,
    MobileDevice,
}

/// `{id, name}` as produced by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub id: DeviceId,
    pub name: String,
}

impl DeviceRef {
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The set of devices a run acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Members of a static group, by group id.
    Group(String),
    /// The whole fleet.
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group {id}"),
            Self::All => f.write_str("all devices"),
        }
    }
}

/// Sections of a device record a policy needs.
///
/// The inventory adapter narrows its remote queries to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// Management flag plus last inventory date.
    Management,
    Site,
    ModelIdentifier,
    ExtensionAttributes,
}

/// A configured custom attribute: display name plus definition id.
///
/// Computers address attributes by definition id when writing, mobile
/// devices by name, so both are carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeTarget {
    pub name: String,
    pub definition_id: String,
}

impl AttributeTarget {
    pub fn new(name: impl Into<String>, definition_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition_id: definition_id.into(),
        }
    }
}

/// A custom attribute value as stored on a device record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionAttribute {
    pub definition_id: String,
    pub name: Option<String>,
    pub values: Vec<String>,
}

impl ExtensionAttribute {
    /// The scalar value of a single-valued attribute.
    ///
    /// `None` when the attribute has never been set.
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Current state of one device, limited to the requested `Field`s.
///
/// Fields that were not requested (or that the server left empty) are
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub name: String,
    pub managed: Option<bool>,
    pub site_name: Option<String>,
    /// Remote-formatted, echoed forward verbatim.
    pub last_inventory_update: Option<String>,
    pub model_identifier: Option<String>,
    pub extension_attributes: Vec<ExtensionAttribute>,
}

impl DeviceSnapshot {
    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attribute whose definition id equals `definition_id` exactly.
    pub fn attribute(&self, definition_id: &str) -> Option<&ExtensionAttribute> {
        self.extension_attributes
            .iter()
            .find(|ea| ea.definition_id == definition_id)
    }

    pub fn attribute_value(&self, definition_id: &str) -> Option<&str> {
        self.attribute(definition_id)
            .and_then(ExtensionAttribute::first_value)
    }
}
