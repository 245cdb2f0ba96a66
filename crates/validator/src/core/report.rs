//! The field-keyed error report produced by a failed run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ============================================================================
// VALIDATION REPORT
// ============================================================================

/// Error messages collected by a validation run, keyed by field name.
///
/// Only fields whose chain recorded at least one message appear. Per-field
/// message order is the order the rules recorded them, which for built-in
/// checks is declaration order. Field keys iterate lexicographically.
///
/// Serializes as a plain object, e.g.
/// `{"name": ["name is required"], "quantity": ["quantity must be integer"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `messages` for `field`. Callers only insert non-empty lists.
    pub(crate) fn insert(&mut self, field: impl Into<String>, messages: Vec<String>) {
        debug_assert!(!messages.is_empty());
        self.errors.insert(field.into(), messages);
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Fields that recorded at least one message, in lexicographic order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Iterates `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when no field recorded an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn total_messages(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for {} field(s)", self.len())?;
        for (field, messages) in &self.errors {
            write!(f, "\n  {field}: {}", messages.join("; "))?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
