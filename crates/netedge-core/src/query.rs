//! Convenience builder for HTTP query parameters.
//!
//! Collection endpoints take a mix of fixed filters and paging parameters whose
//! names vary per endpoint, so pairs are kept as owned strings.

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a comma-joined list when it is not empty.
    pub fn push_list<T>(&mut self, key: impl Into<String>, values: &[T])
    where
        T: AsRef<str>,
    {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(",");
            self.pairs.push((key.into(), joined));
        }
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
