//! The record-side interface the engine validates against.

use attest_record::Attributes;
use serde_json::Value;

use crate::cache::ResultCache;

/// A persistent entity the validator can run against.
///
/// This is the seam between the engine and whatever storage layer owns the
/// record. Implementors embed an [`Attributes`] store and a [`ResultCache`]
/// slot, and report whether the record has been written to storage yet;
/// attribute access defaults to forwarding onto the embedded store.
///
/// The engine takes records as `Arc<dyn Record>` so rules running in one
/// field's chain can mutate attributes other chains will read — safe because
/// the attribute store locks internally.
pub trait Record: Send + Sync {
    /// The record's attribute storage.
    fn attrs(&self) -> &Attributes;

    /// True until the record has been written to storage.
    fn is_new(&self) -> bool;

    /// The slot holding the fingerprint of the last passing validation.
    fn result_cache(&self) -> &ResultCache;

    /// Current value of `field`, if set.
    fn get(&self, field: &str) -> Option<Value> {
        self.attrs().get(field)
    }

    /// Writes `field`. Stales any cached validation pass.
    fn set(&self, field: &str, value: Value) {
        self.attrs().set(field, value);
    }

    /// Removes `field`'s pending value. Stales any cached validation pass
    /// when the field was set.
    fn unset(&self, field: &str) {
        self.attrs().unset(field);
    }
}
