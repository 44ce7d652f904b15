//! Device link groups connecting devices across metros.

use crate::client::{path_segment, NetEdgeClient};
use crate::codec::render;
use crate::Result;
use netedge_core::pagination::{OffsetPage, PagingConfig};
use netedge_core::{ChangeType, UpdateError};
use reqwest::Method;
use tracing::debug;

const LINKS_PATH: &str = "/ne/v1/links";

/// Group of devices linked together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLinkGroup {
    /// Group identifier
    pub uuid: Option<String>,
    /// Group name
    pub name: Option<String>,
    /// Subnet used for the link addresses
    pub subnet: Option<String>,
    /// Provisioning status
    pub status: Option<String>,
    /// Redundancy type, e.g. `PRIMARY`
    pub redundancy_type: Option<String>,
    /// Owning project
    pub project_id: Option<String>,
    /// Member devices
    pub devices: Option<Vec<DeviceLinkGroupDevice>>,
    /// Inter-metro links
    pub links: Option<Vec<DeviceLinkGroupLink>>,
    /// Metro links
    pub metro_links: Option<Vec<DeviceLinkGroupMetroLink>>,
}

/// Device taking part in a link group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLinkGroupDevice {
    /// Device identifier
    pub device_uuid: Option<String>,
    /// Device ASN
    pub asn: Option<i64>,
    /// Interface used for the link
    pub interface_id: Option<i64>,
    /// Member status
    pub status: Option<String>,
    /// Address assigned to the device
    pub ip_address: Option<String>,
}

/// Link between two metros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLinkGroupLink {
    /// Billing account
    pub account_number: Option<String>,
    /// Link throughput
    pub throughput: Option<String>,
    /// Throughput unit, e.g. `Mbps`
    pub throughput_unit: Option<String>,
    /// Source metro
    pub source_metro_code: Option<String>,
    /// Destination metro
    pub destination_metro_code: Option<String>,
    /// Source zone
    pub source_zone_code: Option<String>,
    /// Destination zone
    pub destination_zone_code: Option<String>,
}

/// Link within a single metro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLinkGroupMetroLink {
    /// Billing account
    pub account_number: Option<String>,
    /// Billing account reference
    pub account_reference_id: Option<String>,
    /// Metro code
    pub metro_code: Option<String>,
    /// Link throughput
    pub throughput: Option<String>,
    /// Throughput unit
    pub throughput_unit: Option<String>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct DeviceLinkGroup {
        pub uuid: Option<String>,
        pub group_name: Option<String>,
        pub subnet: Option<String>,
        pub status: Option<String>,
        pub redundancy_type: Option<String>,
        pub project_id: Option<String>,
        pub link_devices: Option<Vec<Device>>,
        pub links: Option<Vec<Link>>,
        pub metro_links: Option<Vec<MetroLink>>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct DeviceLinkGroupRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub group_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subnet: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub redundancy_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub project_id: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub link_devices: Vec<Device>,
        pub links: Vec<Link>,
        pub metro_links: Vec<MetroLink>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct DeviceLinkGroupUpdateRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub group_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subnet: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub redundancy_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub link_devices: Option<Vec<Device>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub links: Option<Vec<Link>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metro_links: Option<Vec<MetroLink>>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct Device {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub device_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub asn: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub interface_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,
        #[serde(rename = "ipAssigned", skip_serializing_if = "Option::is_none")]
        pub ip_address: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct Link {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput_unit: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub source_metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub destination_metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub source_zone_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub destination_zone_code: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct MetroLink {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_reference_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput_unit: Option<String>,
    }
}

impl From<wire::Device> for DeviceLinkGroupDevice {
    fn from(wire: wire::Device) -> Self {
        Self {
            device_uuid: wire.device_uuid,
            asn: wire.asn,
            interface_id: wire.interface_id,
            status: wire.status,
            ip_address: wire.ip_address,
        }
    }
}

impl From<&DeviceLinkGroupDevice> for wire::Device {
    fn from(device: &DeviceLinkGroupDevice) -> Self {
        Self {
            device_uuid: device.device_uuid.clone(),
            asn: device.asn,
            interface_id: device.interface_id,
            status: device.status.clone(),
            ip_address: device.ip_address.clone(),
        }
    }
}

impl From<wire::Link> for DeviceLinkGroupLink {
    fn from(wire: wire::Link) -> Self {
        Self {
            account_number: wire.account_number,
            throughput: wire.throughput,
            throughput_unit: wire.throughput_unit,
            source_metro_code: wire.source_metro_code,
            destination_metro_code: wire.destination_metro_code,
            source_zone_code: wire.source_zone_code,
            destination_zone_code: wire.destination_zone_code,
        }
    }
}

impl From<&DeviceLinkGroupLink> for wire::Link {
    fn from(link: &DeviceLinkGroupLink) -> Self {
        Self {
            account_number: link.account_number.clone(),
            throughput: link.throughput.clone(),
            throughput_unit: link.throughput_unit.clone(),
            source_metro_code: link.source_metro_code.clone(),
            destination_metro_code: link.destination_metro_code.clone(),
            source_zone_code: link.source_zone_code.clone(),
            destination_zone_code: link.destination_zone_code.clone(),
        }
    }
}

impl From<wire::MetroLink> for DeviceLinkGroupMetroLink {
    fn from(wire: wire::MetroLink) -> Self {
        Self {
            account_number: wire.account_number,
            account_reference_id: wire.account_reference_id,
            metro_code: wire.metro_code,
            throughput: wire.throughput,
            throughput_unit: wire.throughput_unit,
        }
    }
}

impl From<&DeviceLinkGroupMetroLink> for wire::MetroLink {
    fn from(link: &DeviceLinkGroupMetroLink) -> Self {
        Self {
            account_number: link.account_number.clone(),
            account_reference_id: link.account_reference_id.clone(),
            metro_code: link.metro_code.clone(),
            throughput: link.throughput.clone(),
            throughput_unit: link.throughput_unit.clone(),
        }
    }
}

impl From<wire::DeviceLinkGroup> for DeviceLinkGroup {
    fn from(wire: wire::DeviceLinkGroup) -> Self {
        Self {
            uuid: wire.uuid,
            name: wire.group_name,
            subnet: wire.subnet,
            status: wire.status,
            redundancy_type: wire.redundancy_type,
            project_id: wire.project_id,
            devices: wire.link_devices.map(map_all),
            links: wire.links.map(map_all),
            metro_links: wire.metro_links.map(map_all),
        }
    }
}

impl From<&DeviceLinkGroup> for wire::DeviceLinkGroupRequest {
    fn from(group: &DeviceLinkGroup) -> Self {
        Self {
            group_name: group.name.clone(),
            subnet: group.subnet.clone(),
            redundancy_type: group.redundancy_type.clone(),
            project_id: group.project_id.clone(),
            link_devices: group.devices.as_deref().map(map_refs).unwrap_or_default(),
            links: group.links.as_deref().map(map_refs).unwrap_or_default(),
            metro_links: group.metro_links.as_deref().map(map_refs).unwrap_or_default(),
        }
    }
}

fn map_all<S, T: From<S>>(items: Vec<S>) -> Vec<T> {
    items.into_iter().map(T::from).collect()
}

fn map_refs<'a, S: 'a, T: From<&'a S>>(items: &'a [S]) -> Vec<T> {
    items.iter().map(T::from).collect()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn group_path(uuid: &str) -> Result<String> {
    Ok(format!("{LINKS_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// List every device link group.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list_device_link_groups(&self) -> Result<Vec<DeviceLinkGroup>> {
        let groups = self
            .list_all::<OffsetPage<wire::DeviceLinkGroup>>(LINKS_PATH, PagingConfig::offset())
            .await?;
        Ok(map_all(groups))
    }

    /// Fetch a device link group by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_device_link_group(&self, uuid: &str) -> Result<DeviceLinkGroup> {
        let group: wire::DeviceLinkGroup = self.get_json(&group_path(uuid)?, &[]).await?;
        Ok(DeviceLinkGroup::from(group))
    }

    /// Create a device link group and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`netedge_core::Error::InvalidResponse`]
    /// if the response carries no identifier.
    pub async fn create_device_link_group(&self, group: &DeviceLinkGroup) -> Result<String> {
        self.post_created(LINKS_PATH, &wire::DeviceLinkGroupRequest::from(group))
            .await
    }

    /// Start a composite update of the given device link group.
    #[must_use]
    pub fn new_device_link_update_request(
        &self,
        uuid: impl Into<String>,
    ) -> DeviceLinkUpdateRequest<'_> {
        DeviceLinkUpdateRequest {
            client: self,
            uuid: uuid.into(),
            name: None,
            subnet: None,
            redundancy_type: None,
            devices: None,
            links: None,
            metro_links: None,
        }
    }

    /// Delete a device link group.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn delete_device_link_group(&self, uuid: &str) -> Result<()> {
        self.send_empty::<()>(Method::DELETE, &group_path(uuid)?, None, &[])
            .await
    }
}

/// Composite update of a device link group, sent as a single
/// `deviceLinkGroup` change.
#[derive(Debug, Clone)]
#[must_use]
pub struct DeviceLinkUpdateRequest<'a> {
    client: &'a NetEdgeClient,
    uuid: String,
    name: Option<String>,
    subnet: Option<String>,
    redundancy_type: Option<String>,
    devices: Option<Vec<DeviceLinkGroupDevice>>,
    links: Option<Vec<DeviceLinkGroupLink>>,
    metro_links: Option<Vec<DeviceLinkGroupMetroLink>>,
}

impl DeviceLinkUpdateRequest<'_> {
    /// Stage the group name.
    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stage the subnet.
    pub fn with_subnet(mut self, subnet: impl Into<String>) -> Self {
        self.subnet = Some(subnet.into());
        self
    }

    /// Stage the redundancy type.
    pub fn with_redundancy_type(mut self, redundancy_type: impl Into<String>) -> Self {
        self.redundancy_type = Some(redundancy_type.into());
        self
    }

    /// Stage the full list of member devices.
    pub fn with_devices(mut self, devices: Vec<DeviceLinkGroupDevice>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Stage the full list of inter-metro links.
    pub fn with_links(mut self, links: Vec<DeviceLinkGroupLink>) -> Self {
        self.links = Some(links);
        self
    }

    /// Stage the full list of metro links.
    pub fn with_metro_links(mut self, metro_links: Vec<DeviceLinkGroupMetroLink>) -> Self {
        self.metro_links = Some(metro_links);
        self
    }

    fn is_staged(&self) -> bool {
        self.name.is_some()
            || self.subnet.is_some()
            || self.redundancy_type.is_some()
            || self.devices.is_some()
            || self.links.is_some()
            || self.metro_links.is_some()
    }

    fn clear(&mut self) {
        self.name = None;
        self.subnet = None;
        self.redundancy_type = None;
        self.devices = None;
        self.links = None;
        self.metro_links = None;
    }

    /// Apply the staged changes.
    ///
    /// Name, subnet and redundancy type are left out when empty. A successful
    /// update unstages everything.
    ///
    /// # Errors
    ///
    /// Returns [`netedge_core::Error::Update`] if the update call failed, or
    /// [`netedge_core::Error::InvalidEndpoint`] for an unusable identifier.
    pub async fn execute(&mut self) -> Result<()> {
        let mut errors = UpdateError::new();
        let path = group_path(&self.uuid)?;

        if self.is_staged() {
            let body = wire::DeviceLinkGroupUpdateRequest {
                group_name: non_empty(self.name.as_ref()),
                subnet: non_empty(self.subnet.as_ref()),
                redundancy_type: non_empty(self.redundancy_type.as_ref()),
                link_devices: self.devices.as_deref().map(map_refs),
                links: self.links.as_deref().map(map_refs),
                metro_links: self.metro_links.as_deref().map(map_refs),
            };
            debug!(uuid = %self.uuid, "Updating device link group");
            let outcome = self
                .client
                .send_empty(Method::PATCH, &path, Some(&body), &[])
                .await;
            if errors.record(ChangeType::Update, "deviceLinkGroup", render(&body), outcome) {
                self.clear();
            }
        }

        errors.into_result()
    }
}
