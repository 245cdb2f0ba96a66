//! # attest-record
//!
//! Attribute storage for records validated by `attest-validator`.
//!
//! The crate is deliberately small: one [`Attributes`] store that a record
//! type embeds. It knows nothing about validation — it only tracks values,
//! which fields changed since the last save, and a mutation revision counter
//! that downstream consumers use to detect staleness.

mod attributes;

pub use attributes::Attributes;
