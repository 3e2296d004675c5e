//! Ordered, de-duplicating warning collection.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Panel warnings for one tick.
///
/// Insertion order is preserved and duplicates are dropped, so the
/// first component to report a condition decides where it is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarningSet(IndexSet<String>);

impl WarningSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a warning. Returns `false` if it was already present.
    pub fn push(&mut self, warning: impl Into<String>) -> bool {
        self.0.insert(warning.into())
    }

    /// Whether a warning with exactly this text is present.
    #[must_use]
    pub fn contains(&self, warning: &str) -> bool {
        self.0.contains(warning)
    }

    /// Whether any warning contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|w| w.contains(needle))
    }

    /// Number of distinct warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no warnings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Warnings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Owned copy in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> Extend<S> for WarningSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for warning in iter {
            self.push(warning);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for WarningSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
