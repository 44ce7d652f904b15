//! SSH public keys.

use crate::client::{path_segment, NetEdgeClient};
use crate::Result;
use reqwest::Method;

const PUBLIC_KEYS_PATH: &str = "/ne/v1/publicKeys";

/// SSH public key stored with the account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshPublicKey {
    /// Key identifier
    pub uuid: Option<String>,
    /// Key name
    pub name: Option<String>,
    /// Key material
    pub value: Option<String>,
    /// Project the key belongs to
    pub project_id: Option<String>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct SshPublicKey {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub key_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub key_value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub project_id: Option<String>,
    }
}

impl From<wire::SshPublicKey> for SshPublicKey {
    fn from(wire: wire::SshPublicKey) -> Self {
        Self {
            uuid: wire.uuid,
            name: wire.key_name,
            value: wire.key_value,
            project_id: wire.project_id,
        }
    }
}

impl From<&SshPublicKey> for wire::SshPublicKey {
    fn from(key: &SshPublicKey) -> Self {
        Self {
            uuid: None,
            key_name: key.name.clone(),
            key_value: key.value.clone(),
            project_id: key.project_id.clone(),
        }
    }
}

fn key_path(uuid: &str) -> Result<String> {
    Ok(format!("{PUBLIC_KEYS_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// List every SSH public key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn list_ssh_public_keys(&self) -> Result<Vec<SshPublicKey>> {
        let keys: Vec<wire::SshPublicKey> = self.get_json(PUBLIC_KEYS_PATH, &[]).await?;
        Ok(keys.into_iter().map(SshPublicKey::from).collect())
    }

    /// Fetch an SSH public key by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_ssh_public_key(&self, uuid: &str) -> Result<SshPublicKey> {
        let key: wire::SshPublicKey = self.get_json(&key_path(uuid)?, &[]).await?;
        Ok(SshPublicKey::from(key))
    }

    /// Create an SSH public key and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`netedge_core::Error::InvalidResponse`]
    /// if the identifier cannot be determined.
    pub async fn create_ssh_public_key(&self, key: &SshPublicKey) -> Result<String> {
        self.post_created(PUBLIC_KEYS_PATH, &wire::SshPublicKey::from(key))
            .await
    }

    /// Delete an SSH public key.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn delete_ssh_public_key(&self, uuid: &str) -> Result<()> {
        self.send_empty::<()>(Method::DELETE, &key_path(uuid)?, None, &[])
            .await
    }
}
