//! Aggregated failures of composite update requests.
//!
//! A composite update applies several independent changes to one resource.
//! Each failing change is recorded as a [`ChangeError`]; the failures of one
//! execution are collected into an [`UpdateError`].

use crate::Error;
use std::fmt;
use tracing::warn;

/// Kind of change attempted against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Something was added, e.g. a device association
    Create,
    /// Attribute values were replaced
    Update,
    /// Something was removed
    Delete,
}

impl ChangeType {
    /// Name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Add",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single change within a composite update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("change type '{change_type}', target '{target}', value '{value}', cause: '{cause}'")]
pub struct ChangeError {
    /// Kind of change
    pub change_type: ChangeType,
    /// Attribute (group) the change targeted
    pub target: String,
    /// Attempted value, rendered for diagnostics
    pub value: String,
    /// Underlying failure
    pub cause: Box<Error>,
}

/// Failures collected while executing a composite update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateError {
    failed: Vec<ChangeError>,
}

impl UpdateError {
    /// Create an empty error collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { failed: Vec::new() }
    }

    /// Record a failed change.
    pub fn add_change_error(
        &mut self,
        change_type: ChangeType,
        target: impl Into<String>,
        value: impl Into<String>,
        cause: Error,
    ) {
        self.failed.push(ChangeError {
            change_type,
            target: target.into(),
            value: value.into(),
            cause: Box::new(cause),
        });
    }

    /// Record the outcome of one change, keeping it only if it failed.
    ///
    /// Returns true when the change succeeded.
    pub fn record(
        &mut self,
        change_type: ChangeType,
        target: impl Into<String>,
        value: impl Into<String>,
        outcome: crate::Result<()>,
    ) -> bool {
        match outcome {
            Ok(()) => true,
            Err(cause) => {
                let target = target.into();
                warn!(%change_type, target = %target, error = %cause, "Change failed");
                self.add_change_error(change_type, target, value, cause);
                false
            }
        }
    }

    /// Number of failed changes.
    #[must_use]
    pub fn change_errors_count(&self) -> usize {
        self.failed.len()
    }

    /// Returns true if no change failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    /// Iterate over the failed changes in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeError> {
        self.failed.iter()
    }

    /// `Ok(())` when nothing failed, otherwise the collected failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Update`] if at least one change failed.
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Update(self))
        }
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update error: {} changes failed.", self.failed.len())?;
        for change in &self.failed {
            write!(f, " [{change}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for UpdateError {}

impl IntoIterator for UpdateError {
    type Item = ChangeError;
    type IntoIter = std::vec::IntoIter<ChangeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.failed.into_iter()
    }
}

impl<'a> IntoIterator for &'a UpdateError {
    type Item = &'a ChangeError;
    type IntoIter = std::slice::Iter<'a, ChangeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.failed.iter()
    }
}
