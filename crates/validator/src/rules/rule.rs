//! Rule specs and their normalization against the check registry.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::checks::{CheckRegistry, CompiledCheck};
use crate::core::{BoxError, DefinitionError, FieldContext};

// ============================================================================
// RULE SPEC
// ============================================================================

/// Future returned by a custom rule.
pub type RuleFuture = BoxFuture<'static, Result<(), BoxError>>;

/// A custom rule body. Receives the field's value as sampled at the start of
/// the chain and a handle on the chain's context.
pub type CustomRule = dyn Fn(Option<Value>, FieldContext) -> RuleFuture + Send + Sync;

/// Declarative description of one rule in a field's chain.
///
/// Specs are what entity types are written in; [`Rule::compile`] turns them
/// into their executable form when the rule set is built.
pub enum RuleSpec {
    /// A named built-in check with arguments and the message recorded when
    /// it fails.
    Check {
        /// Registry name, e.g. `"not_empty"`.
        name: String,
        /// Arguments handed to the check's factory.
        args: Vec<Value>,
        /// Message template; `{0}`, `{1}`, … interpolate the arguments.
        message: String,
    },
    /// A custom function; synchronous logic simply returns a ready future.
    Custom(Arc<CustomRule>),
}

impl RuleSpec {
    /// A built-in check rule.
    pub fn check(
        name: impl Into<String>,
        args: impl IntoIterator<Item = Value>,
        message: impl Into<String>,
    ) -> Self {
        Self::Check {
            name: name.into(),
            args: args.into_iter().collect(),
            message: message.into(),
        }
    }

    /// A custom rule. The function is awaited on every run. Return `Err`
    /// only for infrastructure failures — validation errors go through
    /// [`FieldContext::add_error`], and [`FieldContext::skip_remaining`]
    /// stops the chain without one.
    pub fn custom<F, Fut>(run: F) -> Self
    where
        F: Fn(Option<Value>, FieldContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::Custom(Arc::new(move |value, ctx| -> RuleFuture {
            Box::pin(run(value, ctx))
        }))
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check { name, args, .. } => f
                .debug_struct("RuleSpec::Check")
                .field("name", name)
                .field("args", args)
                .finish_non_exhaustive(),
            Self::Custom(_) => f.write_str("RuleSpec::Custom"),
        }
    }
}

// ============================================================================
// COMPILED RULE
// ============================================================================

/// An executable rule, produced from a [`RuleSpec`] when the rule set is
/// built. Immutable once compiled; clones share the underlying closures.
#[derive(Clone)]
pub enum Rule {
    /// A compiled built-in check and its fully rendered failure message.
    Check {
        /// The compiled predicate.
        check: CompiledCheck,
        /// Message appended when the predicate fails.
        message: String,
    },
    /// A custom rule body.
    Custom(Arc<CustomRule>),
}

impl Rule {
    /// Resolves `spec` against `registry`. Unknown names and rejected
    /// arguments fail here, once, rather than on any validation run.
    pub fn compile(
        spec: RuleSpec,
        registry: &CheckRegistry,
        field: &str,
    ) -> Result<Self, DefinitionError> {
        match spec {
            RuleSpec::Check {
                name,
                args,
                message,
            } => {
                let factory =
                    registry
                        .get(&name)
                        .ok_or_else(|| DefinitionError::UnknownCheck {
                            field: field.to_owned(),
                            check: name.clone(),
                        })?;
                let check = factory(&args).map_err(|reason| DefinitionError::BadArguments {
                    field: field.to_owned(),
                    check: name,
                    reason,
                })?;
                Ok(Self::Check {
                    check,
                    message: render(&message, &args),
                })
            }
            RuleSpec::Custom(run) => Ok(Self::Custom(run)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check { message, .. } => f
                .debug_struct("Rule::Check")
                .field("message", message)
                .finish_non_exhaustive(),
            Self::Custom(_) => f.write_str("Rule::Custom"),
        }
    }
}

/// Interpolates `{0}`, `{1}`, … with the check's arguments.
fn render(template: &str, args: &[Value]) -> String {
    let mut message = template.to_owned();
    for (index, arg) in args.iter().enumerate() {
        let placeholder = format!("{{{index}}}");
        if message.contains(&placeholder) {
            message = message.replace(&placeholder, &argument_text(arg));
        }
    }
    message
}

fn argument_text(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
