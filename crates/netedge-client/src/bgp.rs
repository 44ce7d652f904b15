//! BGP peering configuration of device connections.

use crate::client::{path_segment, NetEdgeClient};
use crate::codec::{render, REDACTED};
use crate::Result;
use netedge_core::{ChangeType, UpdateError};
use reqwest::Method;
use tracing::debug;

const BGP_PATH: &str = "/ne/v1/bgp";

/// BGP peering parameters of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BgpConfiguration {
    /// Configuration identifier
    pub uuid: Option<String>,
    /// Connection the peering runs over
    pub connection_uuid: Option<String>,
    /// Device terminating the connection
    pub device_uuid: Option<String>,
    /// Local address in CIDR notation
    pub local_ip_address: Option<String>,
    /// Local autonomous system number
    pub local_asn: Option<i64>,
    /// Remote peer address
    pub remote_ip_address: Option<String>,
    /// Remote autonomous system number
    pub remote_asn: Option<i64>,
    /// Shared MD5 key
    pub authentication_key: Option<String>,
    /// BGP session state, read only
    pub state: Option<String>,
    /// Provisioning status, read only
    pub provisioning_status: Option<String>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct BgpConfiguration {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub connection_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub virtual_device_uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub local_ip_address: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub local_asn: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub remote_ip_address: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub remote_asn: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub authentication_key: Option<String>,
        #[serde(skip_serializing)]
        pub state: Option<String>,
        #[serde(skip_serializing)]
        pub provisioning_status: Option<String>,
    }
}

impl From<wire::BgpConfiguration> for BgpConfiguration {
    fn from(wire: wire::BgpConfiguration) -> Self {
        Self {
            uuid: wire.uuid,
            connection_uuid: wire.connection_uuid,
            device_uuid: wire.virtual_device_uuid,
            local_ip_address: wire.local_ip_address,
            local_asn: wire.local_asn,
            remote_ip_address: wire.remote_ip_address,
            remote_asn: wire.remote_asn,
            authentication_key: wire.authentication_key,
            state: wire.state,
            provisioning_status: wire.provisioning_status,
        }
    }
}

impl From<&BgpConfiguration> for wire::BgpConfiguration {
    fn from(config: &BgpConfiguration) -> Self {
        Self {
            uuid: config.uuid.clone(),
            connection_uuid: config.connection_uuid.clone(),
            virtual_device_uuid: config.device_uuid.clone(),
            local_ip_address: config.local_ip_address.clone(),
            local_asn: config.local_asn,
            remote_ip_address: config.remote_ip_address.clone(),
            remote_asn: config.remote_asn,
            authentication_key: config.authentication_key.clone(),
            state: None,
            provisioning_status: None,
        }
    }
}

fn config_path(uuid: &str) -> Result<String> {
    Ok(format!("{BGP_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// Create a BGP configuration and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`netedge_core::Error::InvalidResponse`]
    /// if the response carries no identifier.
    pub async fn create_bgp_configuration(&self, config: &BgpConfiguration) -> Result<String> {
        self.post_created(BGP_PATH, &wire::BgpConfiguration::from(config))
            .await
    }

    /// Fetch a BGP configuration by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_bgp_configuration(&self, uuid: &str) -> Result<BgpConfiguration> {
        let config: wire::BgpConfiguration = self.get_json(&config_path(uuid)?, &[]).await?;
        Ok(BgpConfiguration::from(config))
    }

    /// Fetch the BGP configuration of a connection.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_bgp_configuration_for_connection(
        &self,
        connection_uuid: &str,
    ) -> Result<BgpConfiguration> {
        let path = format!("{BGP_PATH}/connection/{}", path_segment(connection_uuid)?);
        let config: wire::BgpConfiguration = self.get_json(&path, &[]).await?;
        Ok(BgpConfiguration::from(config))
    }

    /// Start a composite update of the given BGP configuration.
    #[must_use]
    pub fn new_bgp_update_request(&self, uuid: impl Into<String>) -> BgpUpdateRequest<'_> {
        BgpUpdateRequest {
            client: self,
            uuid: uuid.into(),
            local_ip_address: None,
            local_asn: None,
            remote_ip_address: None,
            remote_asn: None,
            authentication_key: None,
        }
    }
}

/// Composite update of a BGP configuration.
///
/// All attributes travel in a single `bgpConfiguration` change.
#[derive(Debug, Clone)]
#[must_use]
pub struct BgpUpdateRequest<'a> {
    client: &'a NetEdgeClient,
    uuid: String,
    local_ip_address: Option<String>,
    local_asn: Option<i64>,
    remote_ip_address: Option<String>,
    remote_asn: Option<i64>,
    authentication_key: Option<String>,
}

impl BgpUpdateRequest<'_> {
    /// Stage the local address.
    pub fn with_local_ip_address(mut self, address: impl Into<String>) -> Self {
        self.local_ip_address = Some(address.into());
        self
    }

    /// Stage the local ASN.
    pub fn with_local_asn(mut self, asn: i64) -> Self {
        self.local_asn = Some(asn);
        self
    }

    /// Stage the remote peer address.
    pub fn with_remote_ip_address(mut self, address: impl Into<String>) -> Self {
        self.remote_ip_address = Some(address.into());
        self
    }

    /// Stage the remote ASN.
    pub fn with_remote_asn(mut self, asn: i64) -> Self {
        self.remote_asn = Some(asn);
        self
    }

    /// Stage the authentication key.
    pub fn with_authentication_key(mut self, key: impl Into<String>) -> Self {
        self.authentication_key = Some(key.into());
        self
    }

    fn is_staged(&self) -> bool {
        self.local_ip_address.is_some()
            || self.local_asn.is_some()
            || self.remote_ip_address.is_some()
            || self.remote_asn.is_some()
            || self.authentication_key.is_some()
    }

    fn clear(&mut self) {
        self.local_ip_address = None;
        self.local_asn = None;
        self.remote_ip_address = None;
        self.remote_asn = None;
        self.authentication_key = None;
    }

    /// Apply the staged changes.
    ///
    /// A successful update unstages every attribute.
    ///
    /// # Errors
    ///
    /// Returns [`netedge_core::Error::Update`] if the update call failed, or
    /// [`netedge_core::Error::InvalidEndpoint`] for an unusable identifier.
    pub async fn execute(&mut self) -> Result<()> {
        let mut errors = UpdateError::new();
        let path = config_path(&self.uuid)?;

        if self.is_staged() {
            let mut body = wire::BgpConfiguration {
                local_ip_address: self.local_ip_address.clone(),
                local_asn: self.local_asn,
                remote_ip_address: self.remote_ip_address.clone(),
                remote_asn: self.remote_asn,
                authentication_key: self.authentication_key.clone(),
                ..Default::default()
            };
            debug!(uuid = %self.uuid, "Updating BGP configuration");
            let outcome = self
                .client
                .send_empty(Method::PUT, &path, Some(&body), &[])
                .await;
            if body.authentication_key.is_some() {
                body.authentication_key = Some(REDACTED.to_string());
            }
            if errors.record(ChangeType::Update, "bgpConfiguration", render(&body), outcome) {
                self.clear();
            }
        }

        errors.into_result()
    }
}
