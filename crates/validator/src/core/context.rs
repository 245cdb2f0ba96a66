//! Per-field execution context handed to rules.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::record::Record;

// ============================================================================
// FIELD CONTEXT
// ============================================================================

/// Control object for one field's chain during one validation run.
///
/// Custom rules receive a clone of the context. Through it they can append
/// error messages independent of their return value, stop the remaining
/// rules in their own chain without recording an error, and reach the record
/// itself to inspect or mutate other attributes. One established pattern:
/// an update-only guard that unsets a field's pending value and then calls
/// [`skip_remaining`](Self::skip_remaining) so format and uniqueness checks
/// never see it.
///
/// Contexts are created fresh per field per run and discarded afterwards.
#[derive(Clone)]
pub struct FieldContext {
    inner: Arc<Inner>,
}

struct Inner {
    field: String,
    record: Arc<dyn Record>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    skipped: bool,
    errors: Vec<String>,
}

impl FieldContext {
    pub(crate) fn new(field: impl Into<String>, record: Arc<dyn Record>) -> Self {
        Self {
            inner: Arc::new(Inner {
                field: field.into(),
                record,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Name of the field this chain belongs to.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.inner.field
    }

    /// The record under validation.
    #[must_use]
    pub fn record(&self) -> &Arc<dyn Record> {
        &self.inner.record
    }

    /// Appends an error message for this field. The chain keeps running.
    pub fn add_error(&self, message: impl Into<String>) {
        self.inner.state.lock().errors.push(message.into());
    }

    /// Stops the remaining rules in this field's chain without recording an
    /// error. Other fields' chains are unaffected.
    pub fn skip_remaining(&self) {
        self.inner.state.lock().skipped = true;
    }

    /// Whether any error has been recorded for this field so far.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.inner.state.lock().errors.is_empty()
    }

    pub(crate) fn is_skipped(&self) -> bool {
        self.inner.state.lock().skipped
    }

    pub(crate) fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.state.lock().errors)
    }
}

impl fmt::Debug for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FieldContext")
            .field("field", &self.inner.field)
            .field("skipped", &state.skipped)
            .field("errors", &state.errors)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
