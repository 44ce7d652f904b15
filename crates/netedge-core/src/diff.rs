//! Association diff between two identifier collections.

use std::collections::HashSet;
use std::hash::Hash;

/// Membership changes needed to turn an old association set into a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDiff<T> {
    /// Present in the old set only
    pub removed: Vec<T>,
    /// Present in the new set only
    pub added: Vec<T>,
}

impl<T> AssociationDiff<T> {
    /// Returns true if both sets hold the same members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Compute `old − new` and `new − old`.
///
/// Inputs are treated as sets: duplicates collapse and members present on both
/// sides are left out. Results keep first-occurrence order of their input.
#[must_use]
pub fn diff_associations<T>(old: &[T], new: &[T]) -> AssociationDiff<T>
where
    T: Eq + Hash + Clone,
{
    AssociationDiff {
        removed: difference(old, new),
        added: difference(new, old),
    }
}

fn difference<T>(left: &[T], right: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let exclude: HashSet<&T> = right.iter().collect();
    let mut seen = HashSet::new();
    left.iter()
        .filter(|item| !exclude.contains(item) && seen.insert(*item))
        .cloned()
        .collect()
}
