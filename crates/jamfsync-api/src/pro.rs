// Pro API endpoints (`/api/...`)
//
// Inventory reads narrow the payload with `section=` parameters; extension
// attribute writes go through the PATCH endpoints.

use tracing::debug;

use crate::client::JamfClient;
use crate::error::Error;
use crate::models::{
    ComputerExtensionAttributeValue, ComputerInventory, ComputerInventoryUpdate,
    MobileDeviceDetail, MobileDeviceUpdate, MobileExtensionAttributeValue,
};

/// Sections of a computer inventory record that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputerSection {
    General,
    Hardware,
    OperatingSystem,
    UserAndLocation,
    Purchasing,
}

impl ComputerSection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Hardware => "HARDWARE",
            Self::OperatingSystem => "OPERATING_SYSTEM",
            Self::UserAndLocation => "USER_AND_LOCATION",
            Self::Purchasing => "PURCHASING",
        }
    }
}

impl JamfClient {
    // ── Computers ────────────────────────────────────────────────────

    /// Computer inventory record limited to the given sections.
    ///
    /// `GET /api/v1/computers-inventory/{id}?section=...`
    pub async fn get_computer_inventory(
        &self,
        id: &str,
        sections: &[ComputerSection],
    ) -> Result<ComputerInventory, Error> {
        let url = self.pro_url(&format!("v1/computers-inventory/{id}"))?;
        let params: Vec<(&str, &str)> = sections.iter().map(|s| ("section", s.as_str())).collect();
        self.get_json_with_params(url, &params).await
    }

    /// Write extension attribute values on a computer record.
    ///
    /// `PATCH /api/v1/computers-inventory-detail/{id}`
    pub async fn update_computer_extension_attributes(
        &self,
        id: &str,
        values: Vec<ComputerExtensionAttributeValue>,
    ) -> Result<(), Error> {
        let url = self.pro_url(&format!("v1/computers-inventory-detail/{id}"))?;
        debug!(computer = id, count = values.len(), "updating extension attributes");
        let body = ComputerInventoryUpdate {
            extension_attributes: values,
        };
        self.patch_json(url, &body).await
    }

    // ── Mobile devices ───────────────────────────────────────────────

    /// Full mobile device detail record.
    ///
    /// `GET /api/v2/mobile-devices/{id}/detail`
    pub async fn get_mobile_device_detail(&self, id: &str) -> Result<MobileDeviceDetail, Error> {
        let url = self.pro_url(&format!("v2/mobile-devices/{id}/detail"))?;
        self.get_json(url).await
    }

    /// Write extension attribute values on a mobile device record.
    ///
    /// `PATCH /api/v2/mobile-devices/{id}`
    pub async fn update_mobile_device_extension_attributes(
        &self,
        id: &str,
        values: Vec<MobileExtensionAttributeValue>,
    ) -> Result<(), Error> {
        let url = self.pro_url(&format!("v2/mobile-devices/{id}"))?;
        debug!(mobile_device = id, count = values.len(), "updating extension attributes");
        let body = MobileDeviceUpdate {
            updated_extension_attributes: values,
        };
        self.patch_json(url, &body).await
    }
}
