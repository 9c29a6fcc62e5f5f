//! Conversion warnings.
//!
//! Provides deduplication to avoid recording the same warning multiple times.
//! Used by the style, layout and paint components to report malformed input and
//! unsupported features without interrupting layout. Warnings are kept in the
//! order they were first raised and handed back to the caller once a document
//! conversion completes.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// A single non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Component that raised the warning (`"CSS"`, `"Layout"`, `"Image"`, ...).
    pub component: String,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Ordered warning list owned by one document conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Warnings {
    entries: Vec<Warning>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl Warnings {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning unless an identical one was already recorded.
    ///
    /// Returns `true` when the warning is new.
    ///
    /// # Example
    /// ```
    /// let mut warnings = folio_common::Warnings::new();
    /// assert!(warnings.warn_once("CSS", "unknown property 'colour'"));
    /// assert!(!warnings.warn_once("CSS", "unknown property 'colour'"));
    /// ```
    pub fn warn_once(&mut self, component: &str, message: impl Into<String>) -> bool {
        let warning = Warning {
            component: component.to_string(),
            message: message.into(),
        };
        if !self.seen.insert(warning.to_string()) {
            return false;
        }
        log::warn!("{warning}");
        self.entries.push(warning);
        true
    }

    /// Move every warning of `other` into `self`, keeping first-seen order.
    pub fn absorb(&mut self, other: Self) {
        for warning in other.entries {
            let _ = self.warn_once(&warning.component, warning.message);
        }
    }

    /// Iterate over the recorded warnings in the order they were raised.
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.entries.iter()
    }

    /// Number of distinct warnings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all recorded warnings.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    /// Consume the collector, returning the warnings in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_dropped_and_order_kept() {
        let mut warnings = Warnings::new();
        assert!(warnings.warn_once("CSS", "b"));
        assert!(warnings.warn_once("CSS", "a"));
        assert!(!warnings.warn_once("CSS", "b"));
        assert!(warnings.warn_once("Layout", "b"));

        let messages: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        assert_eq!(messages, vec!["[CSS] b", "[CSS] a", "[Layout] b"]);
    }

    #[test]
    fn test_absorb_merges_without_duplicates() {
        let mut first = Warnings::new();
        let _ = first.warn_once("Image", "missing a.png");
        let mut second = Warnings::new();
        let _ = second.warn_once("Image", "missing a.png");
        let _ = second.warn_once("Image", "missing b.png");

        first.absorb(second);
        assert_eq!(first.len(), 2);

        first.clear();
        assert!(first.is_empty());
        assert!(first.warn_once("Image", "missing a.png"));
    }
}
