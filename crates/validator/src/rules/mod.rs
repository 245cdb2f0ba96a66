//! Declarative rule specs and their executable, chain-ordered form.

mod chain;
mod rule;

pub(crate) use chain::run_chain;
pub use rule::{CustomRule, Rule, RuleFuture, RuleSpec};
