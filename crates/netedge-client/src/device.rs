//! Virtual network devices: creation, retrieval, composite updates and removal.

use crate::client::{path_segment, NetEdgeClient};
use crate::codec::{parse_number, render};
use crate::Result;
use netedge_core::pagination::{OffsetPage, PagingConfig};
use netedge_core::query::QueryParams;
use netedge_core::{ChangeType, Error, UpdateError};
use reqwest::Method;
use std::collections::BTreeMap;
use tracing::debug;

/// Equinix is allocating resources and creating the device
pub const DEVICE_STATE_INITIALIZING: &str = "INITIALIZING";
/// The device is booting
pub const DEVICE_STATE_PROVISIONING: &str = "PROVISIONING";
/// Secondary device waits for its primary to be provisioned
pub const DEVICE_STATE_WAITING_PRIMARY: &str = "WAITING_FOR_PRIMARY";
/// Primary device waits for its secondary to be provisioned
pub const DEVICE_STATE_WAITING_SECONDARY: &str = "WAITING_FOR_SECONDARY";
/// Creation and provisioning failed
pub const DEVICE_STATE_FAILED: &str = "FAILED";
/// The device is fully operational
pub const DEVICE_STATE_PROVISIONED: &str = "PROVISIONED";
/// The device is being deprovisioned
pub const DEVICE_STATE_DEPROVISIONING: &str = "DEPROVISIONING";
/// The device was deprovisioned
pub const DEVICE_STATE_DEPROVISIONED: &str = "DEPROVISIONED";

/// License is being registered
pub const DEVICE_LICENSE_STATE_APPLYING: &str = "APPLYING_LICENSE";
/// License was registered
pub const DEVICE_LICENSE_STATE_REGISTERED: &str = "REGISTERED";
/// License registration failed
pub const DEVICE_LICENSE_STATE_FAILED: &str = "REGISTRATION_FAILED";

/// Error code returned when removing a device that is already gone or going
pub const ERROR_CODE_DEVICE_REMOVED: &str = "IC-NE-VD-030";

/// Bring-your-own-license mode
pub const DEVICE_LICENSE_MODE_BYOL: &str = "BYOL";
/// Subscription license mode
pub const DEVICE_LICENSE_MODE_SUBSCRIPTION: &str = "Sub";

/// Device configured by its owner
pub const DEVICE_MANAGEMENT_TYPE_SELF: &str = "SELF-CONFIGURED";
/// Device configured by Equinix
pub const DEVICE_MANAGEMENT_TYPE_EQUINIX: &str = "EQUINIX-CONFIGURED";

const DEVICES_PATH: &str = "/ne/v1/devices";

/// Network Edge virtual device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    /// Device identifier
    pub uuid: Option<String>,
    /// Device name
    pub name: Option<String>,
    /// Device type code, e.g. `CSR1000V`
    pub type_code: Option<String>,
    /// Provisioning status, one of the `DEVICE_STATE_*` values
    pub status: Option<String>,
    /// License status, one of the `DEVICE_LICENSE_STATE_*` values
    pub license_status: Option<String>,
    /// Metro code
    pub metro_code: Option<String>,
    /// IBX data center
    pub ibx: Option<String>,
    /// Region
    pub region: Option<String>,
    /// Licensed throughput
    pub throughput: Option<i64>,
    /// Throughput unit, e.g. `Mbps`
    pub throughput_unit: Option<String>,
    /// Host name (prefix on creation)
    pub host_name: Option<String>,
    /// Software package code
    pub package_code: Option<String>,
    /// Software version
    pub version: Option<String>,
    /// Bring-your-own-license flag
    pub is_byol: Option<bool>,
    /// License token
    pub license_token: Option<String>,
    /// Uploaded license file identifier
    pub license_file_id: Option<String>,
    /// Uploaded cloud-init file identifier
    pub cloud_init_file_id: Option<String>,
    /// ACL template applied to the device interfaces
    pub acl_template_uuid: Option<String>,
    /// ACL template applied to the management interface
    pub mgmt_acl_template_uuid: Option<String>,
    /// SSH IP address
    pub ssh_ip_address: Option<String>,
    /// SSH FQDN
    pub ssh_ip_fqdn: Option<String>,
    /// Billing account number
    pub account_number: Option<String>,
    /// Notification e-mail addresses
    pub notifications: Option<Vec<String>>,
    /// Purchase order number
    pub purchase_order_number: Option<String>,
    /// `PRIMARY` or `SECONDARY` for redundant devices
    pub redundancy_type: Option<String>,
    /// Identifier of the redundant peer
    pub redundant_uuid: Option<String>,
    /// Term length in months
    pub term_length: Option<i64>,
    /// Additional internet bandwidth in Mbps
    pub additional_bandwidth: Option<i64>,
    /// Customer order reference
    pub order_reference: Option<String>,
    /// Number of network interfaces
    pub interface_count: Option<i64>,
    /// Number of CPU cores
    pub core_count: Option<i64>,
    /// Self-managed flag
    pub is_self_managed: Option<bool>,
    /// Interface used for SSH access
    pub ssh_interface_id: Option<String>,
    /// Network interfaces
    pub interfaces: Option<Vec<DeviceInterface>>,
    /// Vendor specific configuration
    pub vendor_configuration: Option<BTreeMap<String, String>>,
    /// User and SSH key provisioned on the device
    pub user_public_key: Option<DeviceUserPublicKey>,
    /// Autonomous system number
    pub asn: Option<i64>,
    /// Zone code
    pub zone_code: Option<String>,
    /// Cluster setup
    pub cluster_details: Option<ClusterDetails>,
}

/// Network interface of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInterface {
    /// Interface number
    pub id: Option<i64>,
    /// Interface name
    pub name: Option<String>,
    /// Administrative status
    pub status: Option<String>,
    /// Operational status
    pub operational_status: Option<String>,
    /// MAC address
    pub mac_address: Option<String>,
    /// IP address
    pub ip_address: Option<String>,
    /// Assignment type
    pub assigned_type: Option<String>,
    /// Interface type
    pub interface_type: Option<String>,
}

/// Username and SSH key provisioned on a device.
///
/// The key has to exist beforehand and is referred to by name on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceUserPublicKey {
    /// Username
    pub username: Option<String>,
    /// Name of the SSH public key
    pub key_name: Option<String>,
    /// Key value, populated on reads
    pub key: Option<String>,
}

/// Cluster setup of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDetails {
    /// Cluster identifier
    pub cluster_id: Option<String>,
    /// Cluster name
    pub cluster_name: Option<String>,
    /// Number of nodes
    pub num_of_nodes: Option<i64>,
    /// Provisioned nodes
    pub nodes: Option<Vec<ClusterNode>>,
    /// Configuration of the first node, used on creation
    pub node0: Option<ClusterNodeDetail>,
    /// Configuration of the second node, used on creation
    pub node1: Option<ClusterNodeDetail>,
}

/// Provisioned cluster node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNode {
    /// Node identifier
    pub uuid: Option<String>,
    /// Node name
    pub name: Option<String>,
    /// Node number
    pub node: Option<i64>,
    /// Administrator password
    pub admin_password: Option<String>,
    /// Vendor specific configuration
    pub vendor_configuration: Option<BTreeMap<String, String>>,
}

/// Node configuration sent when creating a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNodeDetail {
    /// Vendor specific configuration
    pub vendor_configuration: Option<BTreeMap<String, String>>,
    /// Uploaded license file identifier
    pub license_file_id: Option<String>,
    /// License token
    pub license_token: Option<String>,
}

/// Additional bandwidth of a device and its provisioning status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAdditionalBandwidthDetails {
    /// Additional bandwidth in Mbps
    pub additional_bandwidth: Option<i64>,
    /// Provisioning status
    pub status: Option<String>,
}

/// ACL provisioning status of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAclDetails {
    /// Provisioning status
    pub status: Option<String>,
}

mod wire {
    use crate::codec::string_or_number;
    use serde::{Deserialize, Serialize};
    use std::collections::{BTreeMap, HashMap};

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct Device {
        pub uuid: Option<String>,
        pub name: Option<String>,
        pub device_type_code: Option<String>,
        pub status: Option<String>,
        pub license_status: Option<String>,
        pub metro_code: Option<String>,
        pub ibx: Option<String>,
        pub region: Option<String>,
        #[serde(deserialize_with = "string_or_number")]
        pub throughput: Option<String>,
        pub throughput_unit: Option<String>,
        pub host_name: Option<String>,
        pub package_code: Option<String>,
        pub version: Option<String>,
        pub license_token: Option<String>,
        pub license_type: Option<String>,
        pub license_file_id: Option<String>,
        #[serde(rename = "CloudInitFileId")]
        pub cloud_init_file_id: Option<String>,
        pub acl_template_uuid: Option<String>,
        pub mgmt_acl_template_uuid: Option<String>,
        pub ssh_ip_address: Option<String>,
        pub ssh_ip_fqdn: Option<String>,
        pub account_number: Option<String>,
        pub notifications: Option<Vec<String>>,
        pub purchase_order_number: Option<String>,
        pub redundancy_type: Option<String>,
        pub redundant_uuid: Option<String>,
        pub term_length: Option<i64>,
        pub additional_bandwidth: Option<i64>,
        pub order_reference: Option<String>,
        pub interface_count: Option<i64>,
        pub core: Option<CoreInformation>,
        pub device_management_type: Option<String>,
        pub ssh_interface_id: Option<String>,
        pub interfaces: Option<Vec<DeviceInterface>>,
        pub vendor_config: Option<BTreeMap<String, String>>,
        pub user_public_key: Option<UserPublicKey>,
        pub asn: Option<i64>,
        pub zone_code: Option<String>,
        pub cluster_details: Option<ClusterDetails>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct DeviceInterface {
        pub id: Option<i64>,
        pub name: Option<String>,
        pub status: Option<String>,
        pub operational_status: Option<String>,
        pub mac_address: Option<String>,
        pub ip_address: Option<String>,
        pub assigned_type: Option<String>,
        #[serde(rename = "type")]
        pub interface_type: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct UserPublicKey {
        pub username: Option<String>,
        pub public_key_name: Option<String>,
        pub public_key: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct CoreInformation {
        pub core: Option<i64>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct ClusterDetails {
        pub cluster_id: Option<String>,
        pub cluster_name: Option<String>,
        pub num_of_nodes: Option<i64>,
        pub nodes: Option<Vec<ClusterNode>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct ClusterNode {
        pub uuid: Option<String>,
        pub name: Option<String>,
        pub node: Option<i64>,
        #[serde(rename = "adminPwd")]
        pub admin_password: Option<String>,
        pub vendor_config: Option<BTreeMap<String, String>>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct DeviceRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub throughput_unit: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub device_type_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub term_length: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_mode: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_token: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_file_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cloud_init_file_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub package_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub virtual_device_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notifications: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub host_name_prefix: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub order_reference: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub purchase_order_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub interface_count: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub device_management_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub ssh_interface_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub core: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub additional_bandwidth: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub acl_template_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub mgmt_acl_template_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub vendor_config: Option<BTreeMap<String, String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user_public_key: Option<UserPublicKeyRequest>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary: Option<SecondaryDeviceRequest>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cluster_details: Option<ClusterDetailsRequest>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SecondaryDeviceRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_token: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_file_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cloud_init_file_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub virtual_device_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notifications: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub host_name_prefix: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub account_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub additional_bandwidth: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub ssh_interface_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub acl_template_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub mgmt_acl_template_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub vendor_config: Option<BTreeMap<String, String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user_public_key: Option<UserPublicKeyRequest>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct UserPublicKeyRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub username: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub key_name: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ClusterDetailsRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cluster_name: Option<String>,
        #[serde(skip_serializing_if = "HashMap::is_empty")]
        pub cluster_node_details: HashMap<String, ClusterNodeDetailRequest>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct ClusterNodeDetailRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub vendor_config: Option<BTreeMap<String, String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_file_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub license_token: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct DeviceRequestResponse {
        pub uuid: Option<String>,
        pub secondary_uuid: Option<String>,
        pub device_ids: Option<HashMap<String, String>>,
        pub cluster_id: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct DeviceUpdateRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub virtual_device_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub term_length: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notifications: Option<Vec<String>>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct DeviceAclTemplateRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub acl_template_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub mgmt_acl_template_uuid: Option<String>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct AdditionalBandwidthUpdateRequest {
        pub additional_bandwidth: i64,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct AdditionalBandwidthResponse {
        pub additional_bandwidth: Option<i64>,
        pub status: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct DeviceAclResponse {
        pub status: Option<String>,
    }
}

impl TryFrom<wire::Device> for Device {
    type Error = Error;

    fn try_from(wire: wire::Device) -> Result<Self> {
        let throughput = parse_number("throughput", wire.throughput.as_deref())?;
        Ok(Self {
            uuid: wire.uuid,
            name: wire.name,
            type_code: wire.device_type_code,
            status: wire.status,
            license_status: wire.license_status,
            metro_code: wire.metro_code,
            ibx: wire.ibx,
            region: wire.region,
            throughput,
            throughput_unit: wire.throughput_unit,
            host_name: wire.host_name,
            package_code: wire.package_code,
            version: wire.version,
            is_byol: wire
                .license_type
                .map(|mode| mode.eq_ignore_ascii_case(DEVICE_LICENSE_MODE_BYOL)),
            license_token: wire.license_token,
            license_file_id: wire.license_file_id,
            cloud_init_file_id: wire.cloud_init_file_id,
            acl_template_uuid: wire.acl_template_uuid,
            mgmt_acl_template_uuid: wire.mgmt_acl_template_uuid,
            ssh_ip_address: wire.ssh_ip_address,
            ssh_ip_fqdn: wire.ssh_ip_fqdn,
            account_number: wire.account_number,
            notifications: wire.notifications,
            purchase_order_number: wire.purchase_order_number,
            redundancy_type: wire.redundancy_type,
            redundant_uuid: wire.redundant_uuid,
            term_length: wire.term_length,
            additional_bandwidth: wire.additional_bandwidth,
            order_reference: wire.order_reference,
            interface_count: wire.interface_count,
            core_count: wire.core.and_then(|core| core.core),
            is_self_managed: wire
                .device_management_type
                .map(|kind| kind == DEVICE_MANAGEMENT_TYPE_SELF),
            ssh_interface_id: wire.ssh_interface_id,
            interfaces: wire
                .interfaces
                .map(|list| list.into_iter().map(DeviceInterface::from).collect()),
            vendor_configuration: wire.vendor_config,
            user_public_key: wire.user_public_key.map(DeviceUserPublicKey::from),
            asn: wire.asn,
            zone_code: wire.zone_code,
            cluster_details: wire.cluster_details.map(ClusterDetails::from),
        })
    }
}

impl From<wire::DeviceInterface> for DeviceInterface {
    fn from(wire: wire::DeviceInterface) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            status: wire.status,
            operational_status: wire.operational_status,
            mac_address: wire.mac_address,
            ip_address: wire.ip_address,
            assigned_type: wire.assigned_type,
            interface_type: wire.interface_type,
        }
    }
}

impl From<wire::UserPublicKey> for DeviceUserPublicKey {
    fn from(wire: wire::UserPublicKey) -> Self {
        Self {
            username: wire.username,
            key_name: wire.public_key_name,
            key: wire.public_key,
        }
    }
}

impl From<wire::ClusterDetails> for ClusterDetails {
    fn from(wire: wire::ClusterDetails) -> Self {
        Self {
            cluster_id: wire.cluster_id,
            cluster_name: wire.cluster_name,
            num_of_nodes: wire.num_of_nodes,
            nodes: wire
                .nodes
                .map(|nodes| nodes.into_iter().map(ClusterNode::from).collect()),
            node0: None,
            node1: None,
        }
    }
}

impl From<wire::ClusterNode> for ClusterNode {
    fn from(wire: wire::ClusterNode) -> Self {
        Self {
            uuid: wire.uuid,
            name: wire.name,
            node: wire.node,
            admin_password: wire.admin_password,
            vendor_configuration: wire.vendor_config,
        }
    }
}

fn license_mode(is_byol: Option<bool>) -> Option<String> {
    is_byol.map(|byol| {
        if byol {
            DEVICE_LICENSE_MODE_BYOL.to_string()
        } else {
            DEVICE_LICENSE_MODE_SUBSCRIPTION.to_string()
        }
    })
}

fn management_type(is_self_managed: Option<bool>) -> Option<String> {
    is_self_managed.map(|managed| {
        if managed {
            DEVICE_MANAGEMENT_TYPE_SELF.to_string()
        } else {
            DEVICE_MANAGEMENT_TYPE_EQUINIX.to_string()
        }
    })
}

impl From<&DeviceUserPublicKey> for wire::UserPublicKeyRequest {
    fn from(key: &DeviceUserPublicKey) -> Self {
        Self {
            username: key.username.clone(),
            key_name: key.key_name.clone(),
        }
    }
}

impl From<&ClusterNodeDetail> for wire::ClusterNodeDetailRequest {
    fn from(node: &ClusterNodeDetail) -> Self {
        Self {
            vendor_config: node.vendor_configuration.clone(),
            license_file_id: node.license_file_id.clone(),
            license_token: node.license_token.clone(),
        }
    }
}

impl From<&ClusterDetails> for wire::ClusterDetailsRequest {
    fn from(details: &ClusterDetails) -> Self {
        let cluster_node_details = [("node0", &details.node0), ("node1", &details.node1)]
            .into_iter()
            .filter_map(|(key, node)| {
                node.as_ref()
                    .map(|node| (key.to_string(), wire::ClusterNodeDetailRequest::from(node)))
            })
            .collect();
        Self {
            cluster_name: details.cluster_name.clone(),
            cluster_node_details,
        }
    }
}

impl From<&Device> for wire::DeviceRequest {
    fn from(device: &Device) -> Self {
        Self {
            throughput: device.throughput.map(|v| v.to_string()),
            throughput_unit: device.throughput_unit.clone(),
            metro_code: device.metro_code.clone(),
            device_type_code: device.type_code.clone(),
            term_length: device.term_length.map(|v| v.to_string()),
            license_mode: license_mode(device.is_byol),
            license_token: device.license_token.clone(),
            license_file_id: device.license_file_id.clone(),
            cloud_init_file_id: device.cloud_init_file_id.clone(),
            package_code: device.package_code.clone(),
            virtual_device_name: device.name.clone(),
            notifications: device.notifications.clone(),
            host_name_prefix: device.host_name.clone(),
            order_reference: device.order_reference.clone(),
            purchase_order_number: device.purchase_order_number.clone(),
            account_number: device.account_number.clone(),
            version: device.version.clone(),
            interface_count: device.interface_count,
            device_management_type: management_type(device.is_self_managed),
            ssh_interface_id: device.ssh_interface_id.clone(),
            core: device.core_count,
            additional_bandwidth: device.additional_bandwidth.map(|v| v.to_string()),
            acl_template_uuid: device.acl_template_uuid.clone(),
            mgmt_acl_template_uuid: device.mgmt_acl_template_uuid.clone(),
            vendor_config: device.vendor_configuration.clone(),
            user_public_key: device
                .user_public_key
                .as_ref()
                .map(wire::UserPublicKeyRequest::from),
            secondary: None,
            cluster_details: device
                .cluster_details
                .as_ref()
                .map(wire::ClusterDetailsRequest::from),
        }
    }
}

impl From<&Device> for wire::SecondaryDeviceRequest {
    fn from(device: &Device) -> Self {
        Self {
            metro_code: device.metro_code.clone(),
            license_token: device.license_token.clone(),
            license_file_id: device.license_file_id.clone(),
            cloud_init_file_id: device.cloud_init_file_id.clone(),
            virtual_device_name: device.name.clone(),
            notifications: device.notifications.clone(),
            host_name_prefix: device.host_name.clone(),
            account_number: device.account_number.clone(),
            additional_bandwidth: device.additional_bandwidth.map(|v| v.to_string()),
            ssh_interface_id: device.ssh_interface_id.clone(),
            acl_template_uuid: device.acl_template_uuid.clone(),
            mgmt_acl_template_uuid: device.mgmt_acl_template_uuid.clone(),
            vendor_config: device.vendor_configuration.clone(),
            user_public_key: device
                .user_public_key
                .as_ref()
                .map(wire::UserPublicKeyRequest::from),
        }
    }
}

fn device_path(uuid: &str) -> Result<String> {
    Ok(format!("{DEVICES_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// Create a single or cluster device and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if the
    /// response carries no identifier.
    pub async fn create_device(&self, device: &Device) -> Result<String> {
        let request = wire::DeviceRequest::from(device);
        let response: wire::DeviceRequestResponse = self
            .send_json(Method::POST, DEVICES_PATH, Some(&request), &[])
            .await?;
        debug!(
            cluster_id = ?response.cluster_id,
            device_ids = ?response.device_ids,
            "Device created"
        );
        response.uuid.ok_or_else(|| {
            Error::InvalidResponse("device creation response has no uuid".to_string())
        })
    }

    /// Create a redundant primary/secondary device pair.
    ///
    /// Returns the primary and secondary device identifiers.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if either
    /// identifier is missing.
    pub async fn create_redundant_device(
        &self,
        primary: &Device,
        secondary: &Device,
    ) -> Result<(String, String)> {
        let mut request = wire::DeviceRequest::from(primary);
        request.secondary = Some(wire::SecondaryDeviceRequest::from(secondary));
        let response: wire::DeviceRequestResponse = self
            .send_json(Method::POST, DEVICES_PATH, Some(&request), &[])
            .await?;
        match (response.uuid, response.secondary_uuid) {
            (Some(primary), Some(secondary)) => Ok((primary, secondary)),
            _ => Err(Error::InvalidResponse(
                "redundant device creation response lacks device identifiers".to_string(),
            )),
        }
    }

    /// Fetch a device by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure or [`Error::DecodeError`] for malformed
    /// numeric fields.
    pub async fn get_device(&self, uuid: &str) -> Result<Device> {
        let device: wire::Device = self.get_json(&device_path(uuid)?, &[]).await?;
        Device::try_from(device)
    }

    /// List devices, optionally restricted to the given statuses.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request or a decoding failure.
    pub async fn list_devices<S>(&self, statuses: &[S]) -> Result<Vec<Device>>
    where
        S: AsRef<str>,
    {
        let mut params = QueryParams::new();
        params.push_list("status", statuses);
        let devices = self
            .list_all::<OffsetPage<wire::Device>>(
                DEVICES_PATH,
                PagingConfig::offset().with_params(params.into_pairs()),
            )
            .await?;
        devices.into_iter().map(Device::try_from).collect()
    }

    /// Fetch the additional bandwidth of a device.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_device_additional_bandwidth(
        &self,
        uuid: &str,
    ) -> Result<DeviceAdditionalBandwidthDetails> {
        let path = format!("{}/additionalBandwidths", device_path(uuid)?);
        let response: wire::AdditionalBandwidthResponse = self.get_json(&path, &[]).await?;
        Ok(DeviceAdditionalBandwidthDetails {
            additional_bandwidth: response.additional_bandwidth,
            status: response.status,
        })
    }

    /// Fetch the ACL provisioning status of a device.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_device_acl_details(&self, uuid: &str) -> Result<DeviceAclDetails> {
        let path = format!("{}/acl", device_path(uuid)?);
        let response: wire::DeviceAclResponse = self.get_json(&path, &[]).await?;
        Ok(DeviceAclDetails {
            status: response.status,
        })
    }

    /// Start a composite update of the given device.
    #[must_use]
    pub fn new_device_update_request(&self, uuid: impl Into<String>) -> DeviceUpdateRequest<'_> {
        DeviceUpdateRequest {
            client: self,
            uuid: uuid.into(),
            device_name: None,
            term_length: None,
            notifications: None,
            acl_template_uuid: None,
            mgmt_acl_template_uuid: None,
            additional_bandwidth: None,
        }
    }

    /// Delete a device together with its redundant peer.
    ///
    /// A device that is already deprovisioning answers with
    /// [`ERROR_CODE_DEVICE_REMOVED`]; see [`netedge_core::ApiError::has_code`].
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn delete_device(&self, uuid: &str) -> Result<()> {
        let params = vec![("deleteRedundantDevice".to_string(), "true".to_string())];
        self.send_empty::<()>(Method::DELETE, &device_path(uuid)?, None, &params)
            .await
    }
}

/// Composite update of a device.
///
/// Changes are grouped by the endpoint that applies them:
///
/// - `deviceFields`: name, term length and notifications
/// - `aclTemplate`: interface and management ACL templates
/// - `additionalBandwidth`
///
/// A group is sent only when one of its values was staged.
#[derive(Debug, Clone)]
#[must_use]
pub struct DeviceUpdateRequest<'a> {
    client: &'a NetEdgeClient,
    uuid: String,
    device_name: Option<String>,
    term_length: Option<i64>,
    notifications: Option<Vec<String>>,
    acl_template_uuid: Option<String>,
    mgmt_acl_template_uuid: Option<String>,
    additional_bandwidth: Option<i64>,
}

impl DeviceUpdateRequest<'_> {
    /// Stage a new device name.
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Stage a new term length in months.
    pub fn with_term_length(mut self, term_length: i64) -> Self {
        self.term_length = Some(term_length);
        self
    }

    /// Stage a new notification list, replacing the current one.
    pub fn with_notifications(mut self, notifications: Vec<String>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Stage a new interface ACL template.
    pub fn with_acl_template(mut self, template_uuid: impl Into<String>) -> Self {
        self.acl_template_uuid = Some(template_uuid.into());
        self
    }

    /// Stage a new management interface ACL template.
    pub fn with_mgmt_acl_template(mut self, template_uuid: impl Into<String>) -> Self {
        self.mgmt_acl_template_uuid = Some(template_uuid.into());
        self
    }

    /// Stage a new additional bandwidth in Mbps.
    pub fn with_additional_bandwidth(mut self, bandwidth: i64) -> Self {
        self.additional_bandwidth = Some(bandwidth);
        self
    }

    /// Apply every staged group.
    ///
    /// Groups are applied one after another; a failing group does not stop
    /// the remaining ones. Applied groups are unstaged, so executing again
    /// only retries the groups that failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Update`] listing every failed group, or
    /// [`Error::InvalidEndpoint`] for an unusable device identifier.
    pub async fn execute(&mut self) -> Result<()> {
        let mut errors = UpdateError::new();
        let path = device_path(&self.uuid)?;

        if self.device_name.is_some()
            || self.term_length.is_some()
            || self.notifications.is_some()
        {
            let body = wire::DeviceUpdateRequest {
                virtual_device_name: self.device_name.clone(),
                term_length: self.term_length,
                notifications: self.notifications.clone(),
            };
            debug!(uuid = %self.uuid, "Updating device fields");
            let outcome = self
                .client
                .send_empty(Method::PATCH, &path, Some(&body), &[])
                .await;
            if errors.record(ChangeType::Update, "deviceFields", render(&body), outcome) {
                self.device_name = None;
                self.term_length = None;
                self.notifications = None;
            }
        }

        if self.acl_template_uuid.is_some() || self.mgmt_acl_template_uuid.is_some() {
            let body = wire::DeviceAclTemplateRequest {
                acl_template_uuid: self.acl_template_uuid.clone(),
                mgmt_acl_template_uuid: self.mgmt_acl_template_uuid.clone(),
            };
            debug!(uuid = %self.uuid, "Updating device ACL templates");
            let outcome = self
                .client
                .send_empty(Method::PATCH, &format!("{path}/acl"), Some(&body), &[])
                .await;
            if errors.record(ChangeType::Update, "aclTemplate", render(&body), outcome) {
                self.acl_template_uuid = None;
                self.mgmt_acl_template_uuid = None;
            }
        }

        if let Some(bandwidth) = self.additional_bandwidth {
            let body = wire::AdditionalBandwidthUpdateRequest {
                additional_bandwidth: bandwidth,
            };
            debug!(uuid = %self.uuid, bandwidth, "Updating device additional bandwidth");
            let outcome = self
                .client
                .send_empty(
                    Method::PUT,
                    &format!("{path}/additionalBandwidths"),
                    Some(&body),
                    &[],
                )
                .await;
            if errors.record(
                ChangeType::Update,
                "additionalBandwidth",
                bandwidth.to_string(),
                outcome,
            ) {
                self.additional_bandwidth = None;
            }
        }

        errors.into_result()
    }
}
