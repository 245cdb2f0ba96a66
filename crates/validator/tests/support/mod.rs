//! Shared record and storage doubles for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use attest_record::Attributes;
use attest_validator::{BoxError, Record, ResultCache, ValidateError, Validator};

// ============================================================================
// ITEM
// ============================================================================

/// An in-memory record: an attribute store plus the id storage assigns.
pub struct Item {
    attrs: Attributes,
    cache: ResultCache,
    id: Mutex<Option<u64>>,
}

impl Item {
    /// Forges an unsaved record from pending attribute values.
    pub fn forge(object: Map<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            attrs: Attributes::from_object(object),
            cache: ResultCache::new(),
            id: Mutex::new(None),
        })
    }

    /// The storage id, once saved.
    pub fn id(&self) -> Option<u64> {
        *self.id.lock()
    }

    /// The record as the trait object the validator consumes.
    pub fn as_record(self: &Arc<Self>) -> Arc<dyn Record> {
        Arc::clone(self) as Arc<dyn Record>
    }
}

impl Record for Item {
    fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    fn is_new(&self) -> bool {
        self.id.lock().is_none()
    }

    fn result_cache(&self) -> &ResultCache {
        &self.cache
    }
}

// ============================================================================
// STORE
// ============================================================================

/// A toy table: rows of JSON objects with auto-incrementing ids. Stands in
/// for the storage collaborator and exposes the async count query that
/// uniqueness rules inject.
pub struct Store {
    rows: Mutex<Vec<(u64, Map<String, Value>)>>,
    next_id: AtomicU64,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Counts rows whose `field` column equals `value`.
    pub async fn count_matching(
        &self,
        field: &str,
        value: Option<&Value>,
    ) -> Result<usize, BoxError> {
        let rows = self.rows.lock();
        Ok(rows
            .iter()
            .filter(|(_, row)| row.get(field) == value)
            .count())
    }

    /// Validates via the pre-save hook, then writes the record.
    ///
    /// New records insert a full row; existing records merge only the dirty
    /// fields, so an attribute a rule unset during validation is left as it
    /// was in storage.
    pub async fn save(&self, validator: &Validator, item: &Arc<Item>) -> Result<(), ValidateError> {
        let record = item.as_record();
        validator.check_save(&record).await?;

        let mut rows = self.rows.lock();
        match item.id() {
            Some(id) => {
                if let Some((_, row)) = rows.iter_mut().find(|(row_id, _)| *row_id == id) {
                    for field in item.attrs().dirty_fields() {
                        if let Some(value) = item.attrs().get(&field) {
                            row.insert(field, value);
                        }
                    }
                }
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                rows.push((id, item.attrs().to_object()));
                *item.id.lock() = Some(id);
            }
        }
        drop(rows);

        item.attrs().mark_saved();
        Ok(())
    }

    /// The stored row for `id`, if any.
    pub fn fetch(&self, id: u64) -> Option<Map<String, Value>> {
        self.rows
            .lock()
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, row)| row.clone())
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }
}

/// Builds a JSON object from field/value pairs.
pub fn object(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(field, value)| ((*field).to_owned(), value.clone()))
        .collect()
}
