// Classic API endpoints (`/JSSResource/...`)
//
// Reads are requested as JSON. Record writes only accept XML, so the
// management-flag payloads are built here; they carry no user-supplied
// text and need no escaping.

use tracing::debug;

use crate::client::JamfClient;
use crate::error::Error;
use crate::models::{
    ClassicDeviceRef, ComputerEnvelope, ComputerGeneral, ComputerGroup, ComputerGroupEnvelope,
    ComputersEnvelope, MobileDeviceEnvelope, MobileDeviceGeneral, MobileDeviceGroup,
    MobileDeviceGroupEnvelope, MobileDevicesEnvelope,
};

fn computer_managed_xml(managed: bool) -> String {
    format!(
        "<computer><general><remote_management><managed>{managed}</managed>\
         </remote_management></general></computer>"
    )
}

fn mobile_device_managed_xml(managed: bool) -> String {
    format!("<mobile_device><general><managed>{managed}</managed></general></mobile_device>")
}

fn id_list(ids: &[String]) -> String {
    ids.join(",")
}

impl JamfClient {
    // ── Computers ────────────────────────────────────────────────────

    /// Static or smart computer group with its member list.
    ///
    /// `GET /JSSResource/computergroups/id/{id}`
    pub async fn get_computer_group(&self, id: &str) -> Result<ComputerGroup, Error> {
        let url = self.classic_url(&format!("computergroups/id/{id}"))?;
        debug!(group = id, "fetching computer group");
        let envelope: ComputerGroupEnvelope = self.get_json(url).await?;
        Ok(envelope.computer_group)
    }

    /// Every computer in the inventory.
    ///
    /// `GET /JSSResource/computers`
    pub async fn list_computers(&self) -> Result<Vec<ClassicDeviceRef>, Error> {
        let url = self.classic_url("computers")?;
        debug!("listing computers");
        let envelope: ComputersEnvelope = self.get_json(url).await?;
        Ok(envelope.computers)
    }

    /// General subset of a computer record.
    ///
    /// `GET /JSSResource/computers/id/{id}/subset/General`
    pub async fn get_computer_general(&self, id: &str) -> Result<ComputerGeneral, Error> {
        let url = self.classic_url(&format!("computers/id/{id}/subset/General"))?;
        let envelope: ComputerEnvelope = self.get_json(url).await?;
        Ok(envelope.computer.general)
    }

    /// Set the inventory record's management flag.
    ///
    /// `PUT /JSSResource/computers/id/{id}`
    pub async fn set_computer_managed(&self, id: &str, managed: bool) -> Result<(), Error> {
        let url = self.classic_url(&format!("computers/id/{id}"))?;
        debug!(computer = id, managed, "updating management flag");
        self.put_xml(url, computer_managed_xml(managed)).await
    }

    /// Queue an MDM command for several computers in one request.
    ///
    /// `POST /JSSResource/computercommands/command/{command}/id/{ids}`
    pub async fn send_computer_command(&self, command: &str, ids: &[String]) -> Result<(), Error> {
        let url = self.classic_url(&format!(
            "computercommands/command/{command}/id/{}",
            id_list(ids)
        ))?;
        debug!(command, count = ids.len(), "sending computer command");
        self.post_empty(url).await
    }

    // ── Mobile devices ───────────────────────────────────────────────

    /// Mobile device group with its member list.
    ///
    /// `GET /JSSResource/mobiledevicegroups/id/{id}`
    pub async fn get_mobile_device_group(&self, id: &str) -> Result<MobileDeviceGroup, Error> {
        let url = self.classic_url(&format!("mobiledevicegroups/id/{id}"))?;
        debug!(group = id, "fetching mobile device group");
        let envelope: MobileDeviceGroupEnvelope = self.get_json(url).await?;
        Ok(envelope.mobile_device_group)
    }

    /// Every mobile device in the inventory.
    ///
    /// `GET /JSSResource/mobiledevices`
    pub async fn list_mobile_devices(&self) -> Result<Vec<ClassicDeviceRef>, Error> {
        let url = self.classic_url("mobiledevices")?;
        debug!("listing mobile devices");
        let envelope: MobileDevicesEnvelope = self.get_json(url).await?;
        Ok(envelope.mobile_devices)
    }

    /// General subset of a mobile device record.
    ///
    /// `GET /JSSResource/mobiledevices/id/{id}/subset/General`
    pub async fn get_mobile_device_general(&self, id: &str) -> Result<MobileDeviceGeneral, Error> {
        let url = self.classic_url(&format!("mobiledevices/id/{id}/subset/General"))?;
        let envelope: MobileDeviceEnvelope = self.get_json(url).await?;
        Ok(envelope.mobile_device.general)
    }

    /// Set the inventory record's management flag.
    ///
    /// `PUT /JSSResource/mobiledevices/id/{id}`
    pub async fn set_mobile_device_managed(&self, id: &str, managed: bool) -> Result<(), Error> {
        let url = self.classic_url(&format!("mobiledevices/id/{id}"))?;
        debug!(mobile_device = id, managed, "updating management flag");
        self.put_xml(url, mobile_device_managed_xml(managed)).await
    }

    /// Queue an MDM command for several mobile devices in one request.
    ///
    /// `POST /JSSResource/mobiledevicecommands/command/{command}/id/{ids}`
    pub async fn send_mobile_device_command(
        &self,
        command: &str,
        ids: &[String],
    ) -> Result<(), Error> {
        let url = self.classic_url(&format!(
            "mobiledevicecommands/command/{command}/id/{}",
            id_list(ids)
        ))?;
        debug!(command, count = ids.len(), "sending mobile device command");
        self.post_empty(url).await
    }
}
