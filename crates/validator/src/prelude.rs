//! Commonly used imports, one `use` away.

pub use crate::cache::{Fingerprint, ResultCache};
pub use crate::checks::CheckRegistry;
pub use crate::core::{BoxError, DefinitionError, FieldContext, ValidateError, ValidationReport};
pub use crate::engine::{Operation, Validator, ValidatorBuilder};
pub use crate::record::Record;
pub use crate::rules::{Rule, RuleSpec};
pub use crate::scenario::UPDATE;
pub use attest_record::Attributes;
