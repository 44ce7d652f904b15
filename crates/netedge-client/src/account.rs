//! Billing accounts.

use crate::client::{path_segment, NetEdgeClient};
use crate::Result;

const ACCOUNTS_PATH: &str = "/ne/v1/accounts";

/// Billing account usable in a metro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Account name
    pub name: Option<String>,
    /// Account number
    pub number: Option<String>,
    /// UCM identifier
    pub ucm_id: Option<String>,
    /// Account status
    pub status: Option<String>,
}

mod wire {
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct AccountResponse {
        pub accounts: Vec<Account>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct Account {
        pub account_name: Option<String>,
        pub account_number: Option<String>,
        pub account_ucm_id: Option<String>,
        pub account_status: Option<String>,
    }
}

impl From<wire::Account> for Account {
    fn from(wire: wire::Account) -> Self {
        Self {
            name: wire.account_name,
            number: wire.account_number,
            ucm_id: wire.account_ucm_id,
            status: wire.account_status,
        }
    }
}

impl NetEdgeClient {
    /// List the accounts available in a metro.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn list_accounts(&self, metro_code: &str) -> Result<Vec<Account>> {
        let path = format!("{ACCOUNTS_PATH}/{}", path_segment(metro_code)?);
        let response: wire::AccountResponse = self.get_json(&path, &[]).await?;
        Ok(response.accounts.into_iter().map(Account::from).collect())
    }
}
