//! The fixed category set
//!
//! Every transaction carries exactly one label from this set. The labels are a
//! compatibility contract with stored data and API clients, so they must stay
//! byte-for-byte identical.

use std::sync::Arc;

/// Default labels, in display order
pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Food & Dining",
    "Groceries",
    "Transportation",
    "Housing & Utilities",
    "Shopping",
    "Entertainment",
    "Health & Wellness",
    "Income",
    "Other",
];

/// Label used when classification fails or a transaction is not yet classified
pub const FALLBACK_CATEGORY: &str = "Other";

/// Immutable set of category labels plus the fallback label
///
/// Cheap to clone; the labels are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Arc<[String]>,
    fallback: Arc<str>,
}

impl CategorySet {
    /// Build a custom set. The fallback is added to the labels if missing.
    pub fn new<I, S>(labels: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if !labels.iter().any(|l| l == fallback) {
            labels.push(fallback.to_string());
        }
        Self {
            labels: labels.into(),
            fallback: fallback.into(),
        }
    }

    /// All labels in display order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The fallback label (`Other` for the default set)
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Exact, case-sensitive membership check
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Position of a label in display order
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Labels joined for prompt text ("A, B, C")
    pub fn joined(&self) -> String {
        self.labels.join(", ")
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES, FALLBACK_CATEGORY)
    }
}
