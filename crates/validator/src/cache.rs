//! Memoization of the last passing validation run.

use parking_lot::Mutex;

use crate::record::Record;

// ============================================================================
// FINGERPRINT
// ============================================================================

/// A token summarizing a record's mutable state at one point in time.
///
/// The token is the attribute store's mutation revision: every `set` and
/// every effective `unset` bumps it, so a fingerprint taken at a passing run
/// stops matching the moment the record is touched again. Attribute content
/// never enters the token, and clearing the dirty set on save does not
/// perturb it — which is exactly what lets a freshly saved record skip
/// re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    revision: u64,
}

impl Fingerprint {
    /// Fingerprint of the record's current state.
    #[must_use]
    pub fn of(record: &dyn Record) -> Self {
        Self {
            revision: record.attrs().revision(),
        }
    }
}

// ============================================================================
// RESULT CACHE
// ============================================================================

/// Per-record slot remembering the last passing run.
///
/// Owned by the record instance. The engine consults it before running any
/// rule and refreshes it after a full pass; failed and faulted runs leave it
/// untouched. There is no explicit invalidation — a stored fingerprint
/// simply stops matching once the record mutates.
#[derive(Debug, Default)]
pub struct ResultCache {
    last_pass: Mutex<Option<Fingerprint>>,
}

impl ResultCache {
    /// An empty slot; no run has passed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `current` matches the fingerprint stored at the last pass.
    #[must_use]
    pub fn hit(&self, current: Fingerprint) -> bool {
        *self.last_pass.lock() == Some(current)
    }

    /// Remembers `current` as the last-known-good state.
    pub fn store(&self, current: Fingerprint) {
        *self.last_pass.lock() = Some(current);
    }
}

// ============================================================================
// TESTS
// ============================================================================
