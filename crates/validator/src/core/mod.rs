//! Core types shared across the engine: the per-field execution context,
//! the error taxonomy, and the field-keyed report.

pub mod context;
pub mod error;
pub mod report;

pub use context::FieldContext;
pub use error::{BoxError, DefinitionError, ValidateError};
pub use report::ValidationReport;
