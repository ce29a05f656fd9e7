// Wire types for the Classic and Pro APIs
//
// Classic reads are requested as JSON (`Accept: application/json`) and come
// back wrapped in a single-key envelope named after the resource. Pro
// responses are camelCase JSON without an envelope.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as a missing list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ── Classic API ─────────────────────────────────────────────────────

/// `{id, name}` pair as listed by group and inventory endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClassicDeviceRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassicSite {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteManagement {
    #[serde(default)]
    pub managed: bool,
}

#[derive(Deserialize)]
pub(crate) struct ComputerGroupEnvelope {
    pub computer_group: ComputerGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputerGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub computers: Vec<ClassicDeviceRef>,
}

#[derive(Deserialize)]
pub(crate) struct ComputersEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub computers: Vec<ClassicDeviceRef>,
}

#[derive(Deserialize)]
pub(crate) struct ComputerEnvelope {
    pub computer: ComputerSubset,
}

#[derive(Deserialize)]
pub(crate) struct ComputerSubset {
    pub general: ComputerGeneral,
}

/// `computers/id/{id}/subset/General`
#[derive(Debug, Clone, Deserialize)]
pub struct ComputerGeneral {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub site: Option<ClassicSite>,
    #[serde(default)]
    pub remote_management: RemoteManagement,
    /// Last inventory date as displayed by Jamf, e.g. `2024-03-08 14:02:51`.
    pub report_date: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct MobileDeviceGroupEnvelope {
    pub mobile_device_group: MobileDeviceGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MobileDeviceGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mobile_devices: Vec<ClassicDeviceRef>,
}

#[derive(Deserialize)]
pub(crate) struct MobileDevicesEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mobile_devices: Vec<ClassicDeviceRef>,
}

#[derive(Deserialize)]
pub(crate) struct MobileDeviceEnvelope {
    pub mobile_device: MobileDeviceSubset,
}

#[derive(Deserialize)]
pub(crate) struct MobileDeviceSubset {
    pub general: MobileDeviceGeneral,
}

/// `mobiledevices/id/{id}/subset/General`
#[derive(Debug, Clone, Deserialize)]
pub struct MobileDeviceGeneral {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub site: Option<ClassicSite>,
    #[serde(default)]
    pub managed: bool,
    pub last_inventory_update: Option<String>,
}

// ── Pro API ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProSite {
    pub name: Option<String>,
}

/// Extension attribute as reported inside computer inventory sections.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerExtensionAttribute {
    pub definition_id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
}

/// `GET /api/v1/computers-inventory/{id}` -- only requested sections are populated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventory {
    pub id: String,
    pub general: Option<ComputerInventoryGeneral>,
    pub hardware: Option<ComputerInventoryHardware>,
    pub operating_system: Option<ComputerInventoryOperatingSystem>,
    pub user_and_location: Option<ComputerInventoryUserAndLocation>,
    pub purchasing: Option<ComputerInventoryPurchasing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryGeneral {
    pub name: Option<String>,
    pub site: Option<ProSite>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<ComputerExtensionAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryHardware {
    pub model_identifier: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<ComputerExtensionAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryOperatingSystem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<ComputerExtensionAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryUserAndLocation {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<ComputerExtensionAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryPurchasing {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<ComputerExtensionAttribute>,
}

/// Extension attribute as reported by the mobile device detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MobileExtensionAttribute {
    pub id: String,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceIos {
    pub model_identifier: Option<String>,
}

/// `GET /api/v2/mobile-devices/{id}/detail`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceDetail {
    pub id: String,
    pub name: Option<String>,
    pub site: Option<ProSite>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extension_attributes: Vec<MobileExtensionAttribute>,
    pub ios: Option<MobileDeviceIos>,
}

// ── Pro API request bodies ──────────────────────────────────────────

/// `PATCH /api/v1/computers-inventory-detail/{id}` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerInventoryUpdate {
    pub extension_attributes: Vec<ComputerExtensionAttributeValue>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComputerExtensionAttributeValue {
    pub definition_id: String,
    pub values: Vec<String>,
}

/// `PATCH /api/v2/mobile-devices/{id}` body.
///
/// The mobile endpoint addresses extension attributes by display name,
/// not by definition id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDeviceUpdate {
    pub updated_extension_attributes: Vec<MobileExtensionAttributeValue>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MobileExtensionAttributeValue {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Vec<String>,
}

impl MobileExtensionAttributeValue {
    /// A single-valued `STRING` attribute.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "STRING".into(),
            value: vec![value.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn null_extension_attribute_values_decode_as_empty() {
        let ea: ComputerExtensionAttribute = serde_json::from_value(json!({
            "definitionId": "12",
            "name": "Site",
            "values": null
        }))
        .unwrap();
        assert!(ea.values.is_empty());
    }

    #[test]
    fn mobile_update_serializes_type_field() {
        let body = MobileDeviceUpdate {
            updated_extension_attributes: vec![MobileExtensionAttributeValue::string(
                "Jamf Site",
                "Eau Claire",
            )],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "updatedExtensionAttributes": [
                    { "name": "Jamf Site", "type": "STRING", "value": ["Eau Claire"] }
                ]
            })
        );
    }
}
