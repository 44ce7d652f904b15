//! SSH users and their device associations.

use crate::client::{path_segment, NetEdgeClient};
use crate::codec::REDACTED;
use crate::Result;
use netedge_core::diff::diff_associations;
use netedge_core::pagination::{OffsetPage, PagingConfig};
use netedge_core::{ChangeType, UpdateError};
use reqwest::Method;
use tracing::debug;

const SSH_USERS_PATH: &str = "/ne/v1/sshUsers";

/// SSH user that can log in to one or more devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshUser {
    /// User identifier
    pub uuid: Option<String>,
    /// Login name
    pub username: Option<String>,
    /// Password, only sent on creation
    pub password: Option<String>,
    /// Devices the user is associated with
    pub device_uuids: Option<Vec<String>>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct SshUser {
        pub uuid: Option<String>,
        pub username: Option<String>,
        pub password: Option<String>,
        #[serde(rename = "deviceUUIDs")]
        pub device_uuids: Option<Vec<String>>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct SshUserRequest<'a> {
        pub username: &'a str,
        pub password: &'a str,
        pub device_uuid: &'a str,
    }

    #[derive(Debug, Clone, Serialize)]
    pub(super) struct SshUserUpdateRequest<'a> {
        pub password: &'a str,
    }
}

impl From<wire::SshUser> for SshUser {
    fn from(wire: wire::SshUser) -> Self {
        Self {
            uuid: wire.uuid,
            username: wire.username,
            password: wire.password,
            device_uuids: wire.device_uuids,
        }
    }
}

fn user_path(uuid: &str) -> Result<String> {
    Ok(format!("{SSH_USERS_PATH}/{}", path_segment(uuid)?))
}

fn association_path(user: &str, device: &str) -> Result<String> {
    Ok(format!("{}/devices/{}", user_path(user)?, path_segment(device)?))
}

impl NetEdgeClient {
    /// List every SSH user.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list_ssh_users(&self) -> Result<Vec<SshUser>> {
        let users = self
            .list_all::<OffsetPage<wire::SshUser>>(
                SSH_USERS_PATH,
                PagingConfig::offset().with_param("verbose", "true"),
            )
            .await?;
        Ok(users.into_iter().map(SshUser::from).collect())
    }

    /// Fetch an SSH user by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_ssh_user(&self, uuid: &str) -> Result<SshUser> {
        let user: wire::SshUser = self.get_json(&user_path(uuid)?, &[]).await?;
        Ok(SshUser::from(user))
    }

    /// Create an SSH user associated with one device and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`netedge_core::Error::InvalidResponse`]
    /// if the identifier cannot be determined.
    pub async fn create_ssh_user(
        &self,
        username: &str,
        password: &str,
        device: &str,
    ) -> Result<String> {
        let request = wire::SshUserRequest {
            username,
            password,
            device_uuid: device,
        };
        self.post_created(SSH_USERS_PATH, &request).await
    }

    /// Start a composite update of the given SSH user.
    #[must_use]
    pub fn new_ssh_user_update_request(
        &self,
        uuid: impl Into<String>,
    ) -> SshUserUpdateRequest<'_> {
        SshUserUpdateRequest {
            client: self,
            uuid: uuid.into(),
            new_password: None,
            added_devices: Vec::new(),
            removed_devices: Vec::new(),
        }
    }

    /// Delete an SSH user by removing every device association.
    ///
    /// # Errors
    ///
    /// Returns the failure of the user lookup or of the first association
    /// removal.
    pub async fn delete_ssh_user(&self, uuid: &str) -> Result<()> {
        let user = self.get_ssh_user(uuid).await?;
        for device in user.device_uuids.unwrap_or_default() {
            debug!(user = %uuid, device = %device, "Removing SSH user association");
            let path = association_path(uuid, &device)?;
            self.send_empty::<()>(Method::DELETE, &path, None, &[]).await?;
        }
        Ok(())
    }
}

/// Composite update of an SSH user.
///
/// The password change targets `password`; every added or removed device
/// association is a separate `devices` change.
#[derive(Debug, Clone)]
#[must_use]
pub struct SshUserUpdateRequest<'a> {
    client: &'a NetEdgeClient,
    uuid: String,
    new_password: Option<String>,
    added_devices: Vec<String>,
    removed_devices: Vec<String>,
}

impl SshUserUpdateRequest<'_> {
    /// Stage a new password.
    pub fn with_new_password(mut self, password: impl Into<String>) -> Self {
        self.new_password = Some(password.into());
        self
    }

    /// Stage the transition from the `old` to the `new` set of associated
    /// devices. Devices present in both are left alone.
    pub fn with_device_change<S>(mut self, old: &[S], new: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
        let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();
        let diff = diff_associations(&old, &new);
        self.added_devices = diff.added.into_iter().map(str::to_string).collect();
        self.removed_devices = diff.removed.into_iter().map(str::to_string).collect();
        self
    }

    /// Apply the staged password and association changes.
    ///
    /// Applied changes are unstaged; executing again only retries the
    /// changes that failed.
    ///
    /// # Errors
    ///
    /// Returns [`netedge_core::Error::Update`] listing every failed change,
    /// or [`netedge_core::Error::InvalidEndpoint`] for an unusable user
    /// identifier.
    pub async fn execute(&mut self) -> Result<()> {
        let mut errors = UpdateError::new();
        let client = self.client;
        let uuid = self.uuid.as_str();
        let path = user_path(uuid)?;

        if let Some(password) = &self.new_password {
            debug!(user = %uuid, "Updating SSH user password");
            let body = wire::SshUserUpdateRequest { password };
            let outcome = client
                .send_empty(Method::PUT, &path, Some(&body), &[])
                .await;
            if errors.record(ChangeType::Update, "password", REDACTED, outcome) {
                self.new_password = None;
            }
        }

        let mut pending = Vec::new();
        for device in std::mem::take(&mut self.added_devices) {
            debug!(user = %uuid, device = %device, "Adding SSH user association");
            let outcome = match association_path(uuid, &device) {
                Ok(path) => client.send_empty::<()>(Method::POST, &path, None, &[]).await,
                Err(err) => Err(err),
            };
            if !errors.record(ChangeType::Create, "devices", device.as_str(), outcome) {
                pending.push(device);
            }
        }
        self.added_devices = pending;

        let mut pending = Vec::new();
        for device in std::mem::take(&mut self.removed_devices) {
            debug!(user = %uuid, device = %device, "Removing SSH user association");
            let outcome = match association_path(uuid, &device) {
                Ok(path) => client.send_empty::<()>(Method::DELETE, &path, None, &[]).await,
                Err(err) => Err(err),
            };
            if !errors.record(ChangeType::Delete, "devices", device.as_str(), outcome) {
                pending.push(device);
            }
        }
        self.removed_devices = pending;

        errors.into_result()
    }
}
