//! Layer-2 connections originating from Network Edge devices.

use crate::client::{path_segment, NetEdgeClient};
use crate::Result;
use netedge_core::Error;
use reqwest::Method;

const CONNECTIONS_PATH: &str = "/ne/v1/l2/connections";

/// Layer-2 connection from a device to a service profile or port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct L2Connection {
    /// Connection identifier
    pub uuid: Option<String>,
    /// Authorization key required by the seller
    pub authorization_key: Option<String>,
    /// Connection name
    pub name: Option<String>,
    /// Named tag, e.g. `Private`
    pub named_tag: Option<String>,
    /// Notification e-mail addresses
    pub notifications: Option<Vec<String>>,
    /// Seller service profile
    pub profile_uuid: Option<String>,
    /// Purchase order number
    pub purchase_order_number: Option<String>,
    /// Identifier of the redundant connection
    pub redundant_uuid: Option<String>,
    /// Seller region
    pub seller_region: Option<String>,
    /// Seller metro code
    pub seller_metro_code: Option<String>,
    /// Connection identifier on the seller side
    pub seller_hosted_connection_id: Option<String>,
    /// Connection speed
    pub speed: Option<i64>,
    /// Speed unit, e.g. `MB`
    pub speed_unit: Option<String>,
    /// Provisioning status
    pub status: Option<String>,
    /// Originating device
    pub virtual_device_uuid: Option<String>,
    /// Device side S-tag
    pub vlan_s_tag: Option<i64>,
    /// Destination port
    pub z_side_port_uuid: Option<String>,
    /// Destination S-tag
    pub z_side_vlan_s_tag: Option<i64>,
    /// Destination C-tag
    pub z_side_vlan_c_tag: Option<i64>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct GetConnectionResponse {
        pub uuid: Option<String>,
        pub authorization_key: Option<String>,
        pub name: Option<String>,
        pub named_tag: Option<String>,
        pub notifications: Option<Vec<String>>,
        pub purchase_order_number: Option<String>,
        #[serde(rename = "redundantUUID")]
        pub redundant_uuid: Option<String>,
        pub seller_region: Option<String>,
        pub seller_metro_code: Option<String>,
        #[serde(rename = "sellerServiceUUID")]
        pub seller_service_uuid: Option<String>,
        pub speed: Option<i64>,
        pub speed_unit: Option<String>,
        pub status: Option<String>,
        #[serde(rename = "virtualDeviceUUID")]
        pub virtual_device_uuid: Option<String>,
        #[serde(rename = "vlanSTag")]
        pub vlan_s_tag: Option<i64>,
        #[serde(rename = "zSidePortUUID")]
        pub z_side_port_uuid: Option<String>,
        #[serde(rename = "zSideVlanSTag")]
        pub z_side_vlan_s_tag: Option<i64>,
        #[serde(rename = "zSideVlanCTag")]
        pub z_side_vlan_c_tag: Option<i64>,
        pub action_details: Option<Vec<ActionDetail>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct ActionDetail {
        pub action_required_data: Option<Vec<ActionRequiredData>>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct ActionRequiredData {
        pub key: Option<String>,
        pub value: Option<String>,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct PostConnectionRequest {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub authorization_key: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub named_tag: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub notifications: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub primary_name: Option<String>,
        #[serde(rename = "primaryZSidePortUUID", skip_serializing_if = "Option::is_none")]
        pub primary_z_side_port_uuid: Option<String>,
        #[serde(rename = "primaryZSideVlanSTag", skip_serializing_if = "Option::is_none")]
        pub primary_z_side_vlan_s_tag: Option<i64>,
        #[serde(rename = "primaryZSideVlanCTag", skip_serializing_if = "Option::is_none")]
        pub primary_z_side_vlan_c_tag: Option<i64>,
        #[serde(rename = "profileUUID", skip_serializing_if = "Option::is_none")]
        pub profile_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub purchase_order_number: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub seller_region: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub seller_metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub speed: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub speed_unit: Option<String>,
        #[serde(rename = "virtualDeviceUUID", skip_serializing_if = "Option::is_none")]
        pub virtual_device_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_authorization_key: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_notifications: Option<Vec<String>>,
        #[serde(rename = "secondaryProfileUUID", skip_serializing_if = "Option::is_none")]
        pub secondary_profile_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_seller_metro_code: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_seller_region: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_speed: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub secondary_speed_unit: Option<String>,
        #[serde(rename = "secondaryVirtualDeviceUUID", skip_serializing_if = "Option::is_none")]
        pub secondary_virtual_device_uuid: Option<String>,
        #[serde(rename = "secondaryZSidePortUUID", skip_serializing_if = "Option::is_none")]
        pub secondary_z_side_port_uuid: Option<String>,
        #[serde(rename = "secondaryZSideVlanSTag", skip_serializing_if = "Option::is_none")]
        pub secondary_z_side_vlan_s_tag: Option<i64>,
        #[serde(rename = "secondaryZSideVlanCTag", skip_serializing_if = "Option::is_none")]
        pub secondary_z_side_vlan_c_tag: Option<i64>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct PostConnectionResponse {
        pub primary_connection_id: Option<String>,
        pub secondary_connection_id: Option<String>,
    }
}

/// First action-required value whose key mentions a connection id.
fn hosted_connection_id(details: Option<&[wire::ActionDetail]>) -> Option<String> {
    details?
        .iter()
        .flat_map(|detail| detail.action_required_data.iter().flatten())
        .find(|data| {
            data.key
                .as_deref()
                .is_some_and(|key| key.to_ascii_lowercase().contains("connectionid"))
        })
        .and_then(|data| data.value.clone())
}

impl From<wire::GetConnectionResponse> for L2Connection {
    fn from(wire: wire::GetConnectionResponse) -> Self {
        let seller_hosted_connection_id = hosted_connection_id(wire.action_details.as_deref());
        Self {
            uuid: wire.uuid,
            authorization_key: wire.authorization_key,
            name: wire.name,
            named_tag: wire.named_tag,
            notifications: wire.notifications,
            profile_uuid: wire.seller_service_uuid,
            purchase_order_number: wire.purchase_order_number,
            redundant_uuid: wire.redundant_uuid,
            seller_region: wire.seller_region,
            seller_metro_code: wire.seller_metro_code,
            seller_hosted_connection_id,
            speed: wire.speed,
            speed_unit: wire.speed_unit,
            status: wire.status,
            virtual_device_uuid: wire.virtual_device_uuid,
            vlan_s_tag: wire.vlan_s_tag,
            z_side_port_uuid: wire.z_side_port_uuid,
            z_side_vlan_s_tag: wire.z_side_vlan_s_tag,
            z_side_vlan_c_tag: wire.z_side_vlan_c_tag,
        }
    }
}

impl From<&L2Connection> for wire::PostConnectionRequest {
    fn from(conn: &L2Connection) -> Self {
        Self {
            authorization_key: conn.authorization_key.clone(),
            named_tag: conn.named_tag.clone(),
            notifications: conn.notifications.clone(),
            primary_name: conn.name.clone(),
            primary_z_side_port_uuid: conn.z_side_port_uuid.clone(),
            primary_z_side_vlan_s_tag: conn.z_side_vlan_s_tag,
            primary_z_side_vlan_c_tag: conn.z_side_vlan_c_tag,
            profile_uuid: conn.profile_uuid.clone(),
            purchase_order_number: conn.purchase_order_number.clone(),
            seller_region: conn.seller_region.clone(),
            seller_metro_code: conn.seller_metro_code.clone(),
            speed: conn.speed,
            speed_unit: conn.speed_unit.clone(),
            virtual_device_uuid: conn.virtual_device_uuid.clone(),
            ..Self::default()
        }
    }
}

impl wire::PostConnectionRequest {
    fn with_secondary(mut self, secondary: &L2Connection) -> Self {
        self.secondary_authorization_key = secondary.authorization_key.clone();
        self.secondary_name = secondary.name.clone();
        self.secondary_notifications = secondary.notifications.clone();
        self.secondary_profile_uuid = secondary.profile_uuid.clone();
        self.secondary_seller_metro_code = secondary.seller_metro_code.clone();
        self.secondary_seller_region = secondary.seller_region.clone();
        self.secondary_speed = secondary.speed;
        self.secondary_speed_unit = secondary.speed_unit.clone();
        self.secondary_virtual_device_uuid = secondary.virtual_device_uuid.clone();
        self.secondary_z_side_port_uuid = secondary.z_side_port_uuid.clone();
        self.secondary_z_side_vlan_s_tag = secondary.z_side_vlan_s_tag;
        self.secondary_z_side_vlan_c_tag = secondary.z_side_vlan_c_tag;
        self
    }
}

fn missing_id() -> Error {
    Error::InvalidResponse("connection creation response has no primary connection id".to_string())
}

fn connection_path(uuid: &str) -> Result<String> {
    Ok(format!("{CONNECTIONS_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// Fetch a layer-2 connection by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_l2_connection(&self, uuid: &str) -> Result<L2Connection> {
        let response: wire::GetConnectionResponse =
            self.get_json(&connection_path(uuid)?, &[]).await?;
        Ok(L2Connection::from(response))
    }

    /// Create a non-redundant connection.
    ///
    /// Returns the given connection with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if no
    /// identifier was assigned.
    pub async fn create_l2_connection(&self, connection: &L2Connection) -> Result<L2Connection> {
        let request = wire::PostConnectionRequest::from(connection);
        let response: wire::PostConnectionResponse = self
            .send_json(Method::POST, CONNECTIONS_PATH, Some(&request), &[])
            .await?;
        let mut created = connection.clone();
        created.uuid = Some(response.primary_connection_id.ok_or_else(missing_id)?);
        Ok(created)
    }

    /// Create a redundant connection pair.
    ///
    /// The primary connection is the baseline of the request; the secondary
    /// supplies the redundant leg. Returns the primary connection with its
    /// identifier and the redundant connection identifier set.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if no
    /// identifier was assigned.
    pub async fn create_l2_redundant_connection(
        &self,
        primary: &L2Connection,
        secondary: &L2Connection,
    ) -> Result<L2Connection> {
        let request = wire::PostConnectionRequest::from(primary).with_secondary(secondary);
        let response: wire::PostConnectionResponse = self
            .send_json(Method::POST, CONNECTIONS_PATH, Some(&request), &[])
            .await?;
        let mut created = primary.clone();
        created.uuid = Some(response.primary_connection_id.ok_or_else(missing_id)?);
        created.redundant_uuid = response.secondary_connection_id;
        Ok(created)
    }

    /// Delete a layer-2 connection.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn delete_l2_connection(&self, uuid: &str) -> Result<()> {
        self.send_empty::<()>(Method::DELETE, &connection_path(uuid)?, None, &[])
            .await
    }
}
