//! Error taxonomy: validation outcomes vs. setup and lookup failures.
//!
//! Failed rule checks are *data* — they land in a [`ValidationReport`], never
//! in an `Err`. The error types here cover the other two classes: a run that
//! produced a non-empty report, and the failures that are not validation at
//! all (broken lookups, misconfigured rule sets).

use thiserror::Error;

use super::report::ValidationReport;

/// Boxed error carried by a failed rule lookup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// RUN-TIME ERRORS
// ============================================================================

/// Outcome of a validation run that did not pass.
///
/// `Invalid` is the expected, recoverable case: the record's values broke
/// one or more rules and the report says which. `Fault` means a rule's
/// awaited external lookup broke; there is no report and nothing was cached.
/// Save flows should match on the variant to tell the two apart.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// At least one field's chain recorded an error message.
    #[error("{0}")]
    Invalid(ValidationReport),

    /// A custom rule's awaited lookup failed; the run was aborted.
    #[error("rule for field '{field}' failed: {source}")]
    Fault {
        /// Field whose chain was running when the lookup failed.
        field: String,
        /// The underlying infrastructure error.
        #[source]
        source: BoxError,
    },
}

impl ValidateError {
    /// The report, when this is a validation outcome rather than a fault.
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Invalid(report) => Some(report),
            Self::Fault { .. } => None,
        }
    }

    /// True for the recoverable, report-carrying variant.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

// ============================================================================
// SETUP-TIME ERRORS
// ============================================================================

/// Configuration failures raised while an entity type's rules are being
/// defined. These are fatal at setup time and never surface per run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A rule referenced a check name the registry does not know.
    #[error("unknown check '{check}' in rules for field '{field}'")]
    UnknownCheck {
        /// Field whose chain referenced the check.
        field: String,
        /// The unresolved name.
        check: String,
    },

    /// A check rejected its arguments.
    #[error("check '{check}' on field '{field}': {reason}")]
    BadArguments {
        /// Field whose chain carried the arguments.
        field: String,
        /// The check that rejected them.
        check: String,
        /// What the check objected to.
        reason: String,
    },

    /// A check name was registered twice.
    #[error("check '{0}' is already registered")]
    DuplicateCheck(String),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_exposes_its_report() {
        let mut report = ValidationReport::new();
        report.insert("name", vec!["name is required".to_owned()]);

        let error = ValidateError::Invalid(report);
        assert!(error.is_invalid());
        assert_eq!(error.report().map(ValidationReport::len), Some(1));
    }

    #[test]
    fn fault_has_no_report() {
        let error = ValidateError::Fault {
            field: "name".to_owned(),
            source: "connection reset".into(),
        };

        assert!(!error.is_invalid());
        assert!(error.report().is_none());
        assert_eq!(
            error.to_string(),
            "rule for field 'name' failed: connection reset"
        );
    }

    #[test]
    fn definition_errors_render_their_context() {
        let error = DefinitionError::UnknownCheck {
            field: "name".to_owned(),
            check: "no_such_check".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "unknown check 'no_such_check' in rules for field 'name'"
        );
    }
}
