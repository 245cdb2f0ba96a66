//! Sequential execution of one field's rule chain.

use serde_json::Value;
use tracing::trace;

use super::rule::Rule;
use crate::checks::run_check;
use crate::core::{FieldContext, ValidateError};

/// Runs `rules` in declaration order against `value`.
///
/// The skip flag is consulted before every rule, so a rule that calls
/// [`FieldContext::skip_remaining`] stops the chain immediately — including
/// any scenario rules appended after it. A failing check appends its message
/// and the chain continues. Custom rules are awaited one at a time (later
/// rules may depend on record state mutated by earlier ones); an `Err` from
/// one aborts the whole run as a fault.
pub(crate) async fn run_chain(
    rules: &[Rule],
    value: Option<&Value>,
    ctx: &FieldContext,
) -> Result<(), ValidateError> {
    for rule in rules {
        if ctx.is_skipped() {
            trace!(field = ctx.field(), "chain stopped early");
            break;
        }
        match rule {
            Rule::Check { check, message } => {
                if !run_check(check, value) {
                    ctx.add_error(message.clone());
                }
            }
            Rule::Custom(run) => {
                (run.as_ref())(value.cloned(), ctx.clone())
                    .await
                    .map_err(|source| ValidateError::Fault {
                        field: ctx.field().to_owned(),
                        source,
                    })?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
