//! The validation orchestrator and its builder.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, trace, warn};

use crate::cache::Fingerprint;
use crate::checks::CheckRegistry;
use crate::core::{DefinitionError, FieldContext, ValidateError, ValidationReport};
use crate::record::Record;
use crate::rules::{Rule, RuleSpec, run_chain};
use crate::scenario::{RuleMap, ScenarioRules, UPDATE};

// ============================================================================
// OPERATION
// ============================================================================

/// The kind of write a validation run is gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// First write of a new record; base rules only.
    Create,
    /// Write to an existing record; adds the `"update"` scenario rules.
    Update,
    /// A custom named scenario.
    Scenario(&'a str),
}

impl<'a> Operation<'a> {
    fn scenario(self) -> Option<&'a str> {
        match self {
            Self::Create => None,
            Self::Update => Some(UPDATE),
            Self::Scenario(name) => Some(name),
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects field chains and scenario additions, then builds an immutable
/// [`Validator`].
///
/// Every spec is normalized in [`build`](Self::build): unknown check names
/// and rejected arguments surface there as [`DefinitionError`]s — nothing is
/// deferred to validation runs.
///
/// # Examples
///
/// ```rust
/// use attest_validator::{RuleSpec, Validator};
/// use serde_json::json;
///
/// let validator = Validator::builder()
///     .field("name", [
///         RuleSpec::check("not_empty", [], "name is required"),
///         RuleSpec::check("matches", [json!("^[a-z0-9 ]+$"), json!("i")], "name format incorrect"),
///     ])
///     .field("quantity", [RuleSpec::check("is_int", [], "quantity must be integer")])
///     .build()
///     .expect("rule set builds");
/// ```
pub struct ValidatorBuilder {
    checks: CheckRegistry,
    base: Vec<(String, Vec<RuleSpec>)>,
    additions: Vec<(String, String, Vec<RuleSpec>)>,
}

impl ValidatorBuilder {
    fn new() -> Self {
        Self {
            checks: CheckRegistry::standard(),
            base: Vec::new(),
            additions: Vec::new(),
        }
    }

    /// Substitutes the check table (defaults to [`CheckRegistry::standard`]).
    pub fn with_checks(mut self, checks: CheckRegistry) -> Self {
        self.checks = checks;
        self
    }

    /// Appends rules to `field`'s base chain, in declaration order.
    pub fn field(
        mut self,
        field: impl Into<String>,
        specs: impl IntoIterator<Item = RuleSpec>,
    ) -> Self {
        self.base.push((field.into(), specs.into_iter().collect()));
        self
    }

    /// Appends rules to `field`'s chain that only run under `scenario`.
    /// Scenario rules run after the field's base rules.
    pub fn scenario_field(
        mut self,
        scenario: impl Into<String>,
        field: impl Into<String>,
        specs: impl IntoIterator<Item = RuleSpec>,
    ) -> Self {
        self.additions
            .push((scenario.into(), field.into(), specs.into_iter().collect()));
        self
    }

    /// Normalizes every spec and freezes the rule sets.
    pub fn build(self) -> Result<Validator, DefinitionError> {
        let checks = self.checks;

        let mut base = RuleMap::new();
        for (field, specs) in self.base {
            let chain = base.entry(field.clone()).or_default();
            for spec in specs {
                chain.push(Rule::compile(spec, &checks, &field)?);
            }
        }

        let mut additions: BTreeMap<String, RuleMap> = BTreeMap::new();
        for (scenario, field, specs) in self.additions {
            let chain = additions
                .entry(scenario)
                .or_default()
                .entry(field.clone())
                .or_default();
            for spec in specs {
                chain.push(Rule::compile(spec, &checks, &field)?);
            }
        }

        Ok(Validator {
            rules: ScenarioRules::build(base, additions),
        })
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Executes an entity type's rule chains against a record.
///
/// Built once per entity type and immutable afterwards; share it freely.
/// Chains for distinct fields run concurrently as cooperative tasks; within
/// one chain rules run strictly in declaration order. A passing run is
/// remembered in the record's own [`ResultCache`](crate::ResultCache) slot,
/// so validating an untouched record again is free.
pub struct Validator {
    rules: ScenarioRules,
}

impl Validator {
    /// Starts an empty rule set.
    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Validates under the default scenario.
    pub async fn validate(&self, record: &Arc<dyn Record>) -> Result<(), ValidateError> {
        self.run(record, None).await
    }

    /// Validates under `scenario` (`None` for the default).
    pub async fn validate_as(
        &self,
        record: &Arc<dyn Record>,
        scenario: Option<&str>,
    ) -> Result<(), ValidateError> {
        self.run(record, scenario).await
    }

    /// Validates for an explicit operation kind.
    pub async fn validate_for(
        &self,
        record: &Arc<dyn Record>,
        operation: Operation<'_>,
    ) -> Result<(), ValidateError> {
        self.run(record, operation.scenario()).await
    }

    /// The pre-save hook: picks [`Operation::Create`] or
    /// [`Operation::Update`] from [`Record::is_new`].
    pub async fn check_save(&self, record: &Arc<dyn Record>) -> Result<(), ValidateError> {
        let operation = if record.is_new() {
            Operation::Create
        } else {
            Operation::Update
        };
        self.run(record, operation.scenario()).await
    }

    async fn run(
        &self,
        record: &Arc<dyn Record>,
        scenario: Option<&str>,
    ) -> Result<(), ValidateError> {
        let rules = self.rules.for_scenario(scenario);

        if record.result_cache().hit(Fingerprint::of(record.as_ref())) {
            trace!(scenario, "validation skipped, record unchanged since last pass");
            return Ok(());
        }
        debug!(scenario, fields = rules.len(), "running validation");

        let chains = rules.iter().map(|(field, chain)| {
            let ctx = FieldContext::new(field.clone(), Arc::clone(record));
            async move {
                let value = ctx.record().get(ctx.field());
                run_chain(chain, value.as_ref(), &ctx).await?;
                Ok::<_, ValidateError>((ctx.field().to_owned(), ctx.take_errors()))
            }
        });

        // Join semantics: every chain settles before outcomes are inspected.
        let mut report = ValidationReport::new();
        for settled in join_all(chains).await {
            match settled {
                Ok((_, errors)) if errors.is_empty() => {}
                Ok((field, errors)) => report.insert(field, errors),
                Err(fault) => {
                    warn!(%fault, "validation aborted");
                    return Err(fault);
                }
            }
        }

        if report.is_empty() {
            // Rules may have mutated the record, so fingerprint afresh.
            record.result_cache().store(Fingerprint::of(record.as_ref()));
            debug!(scenario, "validation passed");
            Ok(())
        } else {
            debug!(scenario, fields = report.len(), "validation failed");
            Err(ValidateError::Invalid(report))
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.rules.for_scenario(None).len())
            .field("scenarios", &self.rules.scenarios().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
