// ── Inventory seam ──
//
// `Inventory` is the remote contract the engine consumes. `JamfInventory`
// implements it over `jamfsync-api`: the management flag comes from the
// Classic General subset, everything else from the Pro API sections the
// requested `Field`s need.

use std::future::Future;
use std::sync::Arc;

use jamfsync_api::models::{
    ComputerExtensionAttribute, ComputerExtensionAttributeValue, MobileExtensionAttribute,
    MobileExtensionAttributeValue,
};
use jamfsync_api::{ComputerSection, JamfClient};
use tracing::debug;

use crate::decision::FieldUpdate;
use crate::error::CoreError;
use crate::model::{DeviceId, DeviceKind, DeviceRef, DeviceSnapshot, ExtensionAttribute, Field, Scope};

/// Remote device inventory.
pub trait Inventory {
    fn kind(&self) -> DeviceKind;

    /// Devices in `scope`, in server order. An unresolvable scope is
    /// `CoreError::SourceUnavailable`.
    fn list_devices(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<Vec<DeviceRef>, CoreError>> + Send;

    /// Snapshot containing at least `fields`. Failures are
    /// `CoreError::DeviceUnreadable`.
    fn get_device(
        &self,
        id: &DeviceId,
        fields: &[Field],
    ) -> impl Future<Output = Result<DeviceSnapshot, CoreError>> + Send;

    /// Apply one field write. Failures are `CoreError::WriteRejected`.
    fn update_device(
        &self,
        id: &DeviceId,
        update: &FieldUpdate,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Send one MDM command to every id in a single call.
    fn issue_command(
        &self,
        command: &str,
        ids: &[DeviceId],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// `Inventory` backed by a Jamf Pro server.
pub struct JamfInventory {
    client: Arc<JamfClient>,
    kind: DeviceKind,
}

impl JamfInventory {
    pub fn new(client: Arc<JamfClient>, kind: DeviceKind) -> Self {
        Self { client, kind }
    }

    pub fn client(&self) -> &Arc<JamfClient> {
        &self.client
    }

    async fn list_group(&self, group: &str) -> Result<Vec<DeviceRef>, jamfsync_api::Error> {
        let members = match self.kind {
            DeviceKind::Computer => self.client.get_computer_group(group).await?.computers,
            DeviceKind::MobileDevice => {
                self.client
                    .get_mobile_device_group(group)
                    .await?
                    .mobile_devices
            }
        };
        Ok(members
            .into_iter()
            .map(|d| DeviceRef::new(d.id, d.name))
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<DeviceRef>, jamfsync_api::Error> {
        let devices = match self.kind {
            DeviceKind::Computer => self.client.list_computers().await?,
            DeviceKind::MobileDevice => self.client.list_mobile_devices().await?,
        };
        Ok(devices
            .into_iter()
            .map(|d| DeviceRef::new(d.id, d.name))
            .collect())
    }

    async fn read_computer(
        &self,
        id: &str,
        fields: &[Field],
    ) -> Result<DeviceSnapshot, jamfsync_api::Error> {
        let mut snapshot = DeviceSnapshot::new(id, "");

        if fields.contains(&Field::Management) {
            let general = self.client.get_computer_general(id).await?;
            snapshot.name = general.name;
            snapshot.managed = Some(general.remote_management.managed);
            snapshot.site_name = general.site.map(|s| s.name);
            snapshot.last_inventory_update = general.report_date;
        }

        let sections = computer_sections(fields);
        if sections.is_empty() {
            return Ok(snapshot);
        }

        let inventory = self.client.get_computer_inventory(id, &sections).await?;
        let mut attributes: Vec<ComputerExtensionAttribute> = Vec::new();

        if let Some(general) = inventory.general {
            if let Some(name) = general.name {
                snapshot.name = name;
            }
            if fields.contains(&Field::Site) {
                snapshot.site_name = general.site.and_then(|s| s.name);
            }
            attributes.extend(general.extension_attributes);
        }
        if let Some(hardware) = inventory.hardware {
            snapshot.model_identifier = hardware.model_identifier;
            attributes.extend(hardware.extension_attributes);
        }
        if let Some(os) = inventory.operating_system {
            attributes.extend(os.extension_attributes);
        }
        if let Some(user) = inventory.user_and_location {
            attributes.extend(user.extension_attributes);
        }
        if let Some(purchasing) = inventory.purchasing {
            attributes.extend(purchasing.extension_attributes);
        }

        snapshot.extension_attributes = attributes.into_iter().map(computer_attribute).collect();
        Ok(snapshot)
    }

    async fn read_mobile_device(
        &self,
        id: &str,
        fields: &[Field],
    ) -> Result<DeviceSnapshot, jamfsync_api::Error> {
        let mut snapshot = DeviceSnapshot::new(id, "");

        if fields.contains(&Field::Management) {
            let general = self.client.get_mobile_device_general(id).await?;
            snapshot.name = general.name;
            snapshot.managed = Some(general.managed);
            snapshot.site_name = general.site.map(|s| s.name);
            snapshot.last_inventory_update = general.last_inventory_update;
        }

        let needs_detail = fields.iter().any(|f| {
            matches!(
                f,
                Field::Site | Field::ModelIdentifier | Field::ExtensionAttributes
            )
        });
        if !needs_detail {
            return Ok(snapshot);
        }

        let detail = self.client.get_mobile_device_detail(id).await?;
        if let Some(name) = detail.name {
            snapshot.name = name;
        }
        if fields.contains(&Field::Site) {
            snapshot.site_name = detail.site.and_then(|s| s.name);
        }
        snapshot.model_identifier = detail.ios.and_then(|ios| ios.model_identifier);
        snapshot.extension_attributes = detail
            .extension_attributes
            .into_iter()
            .map(mobile_attribute)
            .collect();
        Ok(snapshot)
    }

    async fn write(&self, id: &str, update: &FieldUpdate) -> Result<(), jamfsync_api::Error> {
        match (self.kind, update) {
            (DeviceKind::Computer, FieldUpdate::Managed(managed)) => {
                self.client.set_computer_managed(id, *managed).await
            }
            (DeviceKind::MobileDevice, FieldUpdate::Managed(managed)) => {
                self.client.set_mobile_device_managed(id, *managed).await
            }
            (DeviceKind::Computer, FieldUpdate::ExtensionAttribute { target, value }) => {
                let values = vec![ComputerExtensionAttributeValue {
                    definition_id: target.definition_id.clone(),
                    values: vec![value.clone()],
                }];
                self.client
                    .update_computer_extension_attributes(id, values)
                    .await
            }
            (DeviceKind::MobileDevice, FieldUpdate::ExtensionAttribute { target, value }) => {
                let values = vec![MobileExtensionAttributeValue::string(
                    target.name.clone(),
                    value.clone(),
                )];
                self.client
                    .update_mobile_device_extension_attributes(id, values)
                    .await
            }
        }
    }
}

impl Inventory for JamfInventory {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    async fn list_devices(&self, scope: &Scope) -> Result<Vec<DeviceRef>, CoreError> {
        debug!(kind = %self.kind, %scope, "enumerating devices");
        let result = match scope {
            Scope::Group(group) => self.list_group(group).await,
            Scope::All => self.list_all().await,
        };
        result.map_err(|e| scope_error(scope, e))
    }

    async fn get_device(&self, id: &DeviceId, fields: &[Field]) -> Result<DeviceSnapshot, CoreError> {
        let result = match self.kind {
            DeviceKind::Computer => self.read_computer(id.as_str(), fields).await,
            DeviceKind::MobileDevice => self.read_mobile_device(id.as_str(), fields).await,
        };
        result.map_err(|e| CoreError::DeviceUnreadable {
            id: id.to_string(),
            status: e.status(),
            message: e.to_string(),
        })
    }

    async fn update_device(&self, id: &DeviceId, update: &FieldUpdate) -> Result<(), CoreError> {
        self.write(id.as_str(), update)
            .await
            .map_err(|e| CoreError::WriteRejected {
                id: id.to_string(),
                attribute: update.label().to_owned(),
                status: e.status(),
                message: e.to_string(),
            })
    }

    async fn issue_command(&self, command: &str, ids: &[DeviceId]) -> Result<(), CoreError> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let result = match self.kind {
            DeviceKind::Computer => self.client.send_computer_command(command, &ids).await,
            DeviceKind::MobileDevice => self.client.send_mobile_device_command(command, &ids).await,
        };
        result.map_err(|e| CoreError::WriteRejected {
            id: ids.join(","),
            attribute: command.to_owned(),
            status: e.status(),
            message: e.to_string(),
        })
    }
}

/// Pro inventory sections needed for `fields`. Custom attributes live in
/// whichever section their definition names as its inventory display.
fn computer_sections(fields: &[Field]) -> Vec<ComputerSection> {
    let mut sections = Vec::new();
    let mut want = |section| {
        if !sections.contains(&section) {
            sections.push(section);
        }
    };
    for field in fields {
        match field {
            Field::Management => {}
            Field::Site => want(ComputerSection::General),
            Field::ModelIdentifier => want(ComputerSection::Hardware),
            Field::ExtensionAttributes => {
                want(ComputerSection::General);
                want(ComputerSection::Hardware);
                want(ComputerSection::OperatingSystem);
                want(ComputerSection::UserAndLocation);
                want(ComputerSection::Purchasing);
            }
        }
    }
    sections
}

fn computer_attribute(ea: ComputerExtensionAttribute) -> ExtensionAttribute {
    ExtensionAttribute {
        definition_id: ea.definition_id,
        name: ea.name,
        values: ea.values,
    }
}

fn mobile_attribute(ea: MobileExtensionAttribute) -> ExtensionAttribute {
    ExtensionAttribute {
        definition_id: ea.id,
        name: ea.name,
        values: ea.value,
    }
}

/// Authentication and connectivity keep their own classes; anything else
/// while enumerating means the scope itself is unusable.
fn scope_error(scope: &Scope, err: jamfsync_api::Error) -> CoreError {
    match CoreError::from(err) {
        e @ (CoreError::Authentication { .. }
        | CoreError::Connection { .. }
        | CoreError::Timeout
        | CoreError::Config { .. }) => e,
        other => CoreError::SourceUnavailable {
            scope: scope.to_string(),
            reason: other.to_string(),
        },
    }
}
