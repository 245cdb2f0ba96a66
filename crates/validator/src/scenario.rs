//! Scenario-aware rule sets.

use std::collections::BTreeMap;

use crate::rules::Rule;

/// Scenario name the save hook selects for existing records.
pub const UPDATE: &str = "update";

/// Field-keyed rule chains.
pub(crate) type RuleMap = BTreeMap<String, Vec<Rule>>;

/// The rule sets an entity type validates with, per scenario.
///
/// Built once when the entity type is defined and immutable afterwards.
/// A scenario's chains are the base chains with that scenario's rules
/// appended per field, so scenario rules always run after base rules — and a
/// skip raised in the base portion also covers the appended portion.
#[derive(Debug, Default)]
pub(crate) struct ScenarioRules {
    base: RuleMap,
    merged: BTreeMap<String, RuleMap>,
}

impl ScenarioRules {
    /// Merges `additions` onto `base`, one effective map per scenario.
    pub(crate) fn build(base: RuleMap, additions: BTreeMap<String, RuleMap>) -> Self {
        let merged = additions
            .into_iter()
            .map(|(scenario, extra)| {
                let mut rules = base.clone();
                for (field, chain) in extra {
                    rules.entry(field).or_default().extend(chain);
                }
                (scenario, rules)
            })
            .collect();
        Self { base, merged }
    }

    /// The effective rule map for `scenario`. `None` and names no scenario
    /// was registered under resolve to the base map.
    pub(crate) fn for_scenario(&self, scenario: Option<&str>) -> &RuleMap {
        scenario
            .and_then(|name| self.merged.get(name))
            .unwrap_or(&self.base)
    }

    /// Registered scenario names.
    pub(crate) fn scenarios(&self) -> impl Iterator<Item = &str> {
        self.merged.keys().map(String::as_str)
    }
}

// ============================================================================
// TESTS
// ============================================================================
