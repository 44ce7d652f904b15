//! # netedge-core
//!
//! Core types and utilities for working with the Network Edge provisioning API.
//!
//! This crate provides the error model, client configuration, and the
//! transport-independent building blocks shared by Network Edge clients.
//!
//! ## Modules
//!
//! - [`error`] - Error types, API error envelopes and error codes
//! - [`client`] - HTTP client tuning (timeouts, connection pooling)
//! - [`config`] - Validated configuration for Network Edge clients
//! - [`query`] - Query parameter builder
//! - [`pagination`] - Page/offset collection traversal
//! - [`update`] - Aggregated failures of composite update requests
//! - [`diff`] - Association diff between identifier sets
//! - [`resource_id`] - Extraction of created resource identifiers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod pagination;
pub mod query;
pub mod resource_id;
pub mod update;

// Re-export commonly used types
pub use error::{ApiError, ApiErrorDetail, Error, Result};
pub use update::{ChangeError, ChangeType, UpdateError};
