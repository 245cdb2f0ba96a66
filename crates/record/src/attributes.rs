//! In-memory attribute store with dirty tracking.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use serde_json::{Map, Value};

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Attribute storage for one record instance.
///
/// Values are [`serde_json::Value`]s keyed by field name. The store tracks
/// which fields changed since construction or the last
/// [`mark_saved`](Attributes::mark_saved), and bumps a revision counter on
/// every mutation. The revision is what lets a consumer ask "has anything
/// been written since I last looked?" without hashing attribute content.
///
/// Interior mutability: all methods take `&self`, so a record can be shared
/// behind an `Arc` while rules mutate it mid-validation.
///
/// # Examples
///
/// ```rust
/// use attest_record::Attributes;
/// use serde_json::json;
///
/// let attrs = Attributes::new();
/// attrs.set("name", json!("widget"));
/// assert_eq!(attrs.get("name"), Some(json!("widget")));
/// assert!(attrs.is_dirty("name"));
///
/// attrs.mark_saved();
/// assert!(!attrs.is_dirty("name"));
/// ```
#[derive(Debug, Default)]
pub struct Attributes {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, Value>,
    dirty: BTreeSet<String>,
    revision: u64,
}

impl Attributes {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON object. Every field starts dirty, the way
    /// a freshly forged record's pending values are.
    #[must_use]
    pub fn from_object(object: Map<String, Value>) -> Self {
        let dirty = object.keys().cloned().collect();
        Self {
            inner: RwLock::new(Inner {
                values: object.into_iter().collect(),
                dirty,
                revision: 0,
            }),
        }
    }

    /// Current value of `field`, if set.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.read().values.get(field).cloned()
    }

    /// Whether `field` currently has a value.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.inner.read().values.contains_key(field)
    }

    /// Writes `field`, marking it dirty and bumping the revision.
    pub fn set(&self, field: &str, value: Value) {
        let mut inner = self.inner.write();
        inner.values.insert(field.to_owned(), value);
        inner.dirty.insert(field.to_owned());
        inner.revision += 1;
    }

    /// Removes `field`'s pending value. A no-op (no revision bump) when the
    /// field was not set.
    pub fn unset(&self, field: &str) {
        let mut inner = self.inner.write();
        if inner.values.remove(field).is_some() {
            inner.dirty.insert(field.to_owned());
            inner.revision += 1;
        }
    }

    /// Field names with a value, unordered.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().values.keys().cloned().collect()
    }

    /// Number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().values.len()
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().values.is_empty()
    }

    /// Fields changed since construction or the last [`mark_saved`](Self::mark_saved).
    #[must_use]
    pub fn dirty_fields(&self) -> BTreeSet<String> {
        self.inner.read().dirty.clone()
    }

    /// Whether `field` changed since the last save.
    #[must_use]
    pub fn is_dirty(&self, field: &str) -> bool {
        self.inner.read().dirty.contains(field)
    }

    /// The mutation counter. Bumped by every [`set`](Self::set) and every
    /// effective [`unset`](Self::unset); untouched by [`mark_saved`](Self::mark_saved).
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    /// Clears the dirty set after a successful write to storage. The
    /// revision is left alone, so consumers that took a snapshot of it keep
    /// matching until the next real mutation.
    pub fn mark_saved(&self) {
        self.inner.write().dirty.clear();
    }

    /// Snapshot of all values as a JSON object.
    #[must_use]
    pub fn to_object(&self) -> Map<String, Value> {
        self.inner
            .read()
            .values
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
