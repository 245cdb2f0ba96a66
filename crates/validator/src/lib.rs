//! # attest-validator
//!
//! A declarative, per-field validation pipeline for records headed to
//! storage.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use attest_validator::prelude::*;
//! use serde_json::json;
//!
//! let validator = Validator::builder()
//!     .field("name", [
//!         RuleSpec::check("not_empty", [], "name is required"),
//!         RuleSpec::check("matches", [json!("^[a-z0-9 ]+$"), json!("i")], "name format incorrect"),
//!     ])
//!     .field("quantity", [RuleSpec::check("is_int", [], "quantity must be integer")])
//!     .build()?;
//!
//! validator.check_save(&record).await?;
//! ```
//!
//! Each field owns an ordered rule chain. Within a chain rules run strictly
//! in declaration order, every one awaited before the next; chains for
//! distinct fields run concurrently. A rule may stop the rest of its own
//! chain ([`FieldContext::skip_remaining`]) or append messages directly
//! ([`FieldContext::add_error`]). Failed checks accumulate into a
//! [`ValidationReport`]; a broken external lookup aborts the run as a
//! [`ValidateError::Fault`].
//!
//! Passing runs are remembered per record instance: as long as no attribute
//! is written, repeated validation is free. Scenario rules (for example the
//! `"update"` rules the save hook adds for existing records) extend the base
//! chains without replacing them.

pub mod cache;
pub mod checks;
pub mod core;
pub mod engine;
pub mod prelude;
pub mod record;
pub mod rules;
pub mod scenario;

pub use self::cache::{Fingerprint, ResultCache};
pub use self::checks::CheckRegistry;
pub use self::core::{BoxError, DefinitionError, FieldContext, ValidateError, ValidationReport};
pub use self::engine::{Operation, Validator, ValidatorBuilder};
pub use self::record::Record;
pub use self::rules::{Rule, RuleSpec};
pub use self::scenario::UPDATE;
