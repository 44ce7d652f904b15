//! Configuration structures for Network Edge clients.
//!
//! This module provides the validated connection configuration: base URL,
//! bearer token, page size and request timeout.

use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Configuration for a Network Edge client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NetEdgeConfig {
    /// API base URL, e.g. `https://api.example.com`
    #[validate(url)]
    pub base_url: String,

    /// Optional bearer token sent with every request
    #[serde(default, skip_serializing, deserialize_with = "deserialize_token")]
    pub token: Option<SecretString>,

    /// Number of items requested per page by list operations
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn deserialize_token<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl NetEdgeConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            token: None,
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        };

        config.validate().map_err(|e| {
            Error::ConfigError(format!("Invalid configuration: {}", e))
        })?;

        Ok(config)
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the list page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
