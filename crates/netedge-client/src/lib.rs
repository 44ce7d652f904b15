//! Asynchronous client for the Network Edge provisioning API.
//!
//! Provides typed domain structures, wire mappings and client operations for
//! virtual devices, layer-2 connections, SSH users and keys, ACL templates,
//! BGP configurations, device-link groups and supporting resources.
//!
//! ```no_run
//! use netedge_client::NetEdgeClient;
//!
//! # async fn run() -> netedge_client::Result<()> {
//! let client = NetEdgeClient::builder("https://api.example.com")?
//!     .with_token("token")
//!     .build()?;
//! let devices = client.list_devices(&["PROVISIONED"]).await?;
//! println!("{} devices", devices.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod account;
pub mod acl_template;
pub mod bgp;
pub mod client;
mod codec;
pub mod device;
pub mod device_link;
pub mod device_type;
pub mod file;
pub mod l2;
pub mod ssh_key;
pub mod ssh_user;

pub use account::Account;
pub use acl_template::{AclTemplate, AclTemplateDeviceDetails, AclTemplateInboundRule};
pub use bgp::{BgpConfiguration, BgpUpdateRequest};
pub use client::{NetEdgeClient, NetEdgeClientBuilder};
pub use device::{
    ClusterDetails, ClusterNode, ClusterNodeDetail, Device, DeviceAclDetails,
    DeviceAdditionalBandwidthDetails, DeviceInterface, DeviceUpdateRequest, DeviceUserPublicKey,
};
pub use device_link::{
    DeviceLinkGroup, DeviceLinkGroupDevice, DeviceLinkGroupLink, DeviceLinkGroupMetroLink,
    DeviceLinkUpdateRequest,
};
pub use device_type::{DevicePlatform, DeviceSoftwareVersion, DeviceType};
pub use file::{File, FileUpload, ProcessType};
pub use l2::L2Connection;
pub use netedge_core::{ApiError, ChangeError, ChangeType, Error, UpdateError};
pub use ssh_key::SshPublicKey;
pub use ssh_user::{SshUser, SshUserUpdateRequest};

/// Convenient result alias that reuses the shared Network Edge error type.
pub type Result<T> = netedge_core::Result<T>;
