//! Engine-level properties: skip semantics, scenario ordering, the fault
//! taxonomy, cache behavior on non-passing runs, and registry substitution.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

use attest_validator::checks::predicate;
use attest_validator::{CheckRegistry, Operation, RuleSpec, ValidateError, Validator};
use support::{Item, object};

type Log = Arc<Mutex<Vec<&'static str>>>;

/// One base rule and one "audit"-scenario rule on `name`, both appending to
/// a shared execution log.
fn logged_validator(log: &Log) -> Validator {
    let base_log = Arc::clone(log);
    let scenario_log = Arc::clone(log);

    Validator::builder()
        .field(
            "name",
            [RuleSpec::custom(move |_, _| {
                let log = Arc::clone(&base_log);
                async move {
                    log.lock().push("base");
                    Ok(())
                }
            })],
        )
        .scenario_field(
            "audit",
            "name",
            [RuleSpec::custom(move |_, _| {
                let log = Arc::clone(&scenario_log);
                async move {
                    log.lock().push("scenario");
                    Ok(())
                }
            })],
        )
        .build()
        .expect("rule set builds")
}

#[tokio::test]
async fn skipped_field_contributes_no_errors_while_others_report() {
    let validator = Validator::builder()
        .field(
            "name",
            [
                RuleSpec::custom(|_, ctx| async move {
                    ctx.skip_remaining();
                    Ok(())
                }),
                RuleSpec::check("not_empty", [], "name is required"),
            ],
        )
        .field(
            "quantity",
            [RuleSpec::check("is_int", [], "quantity must be integer")],
        )
        .build()
        .expect("rule set builds");

    let item = Item::forge(Map::new());
    let error = validator.validate(&item.as_record()).await.unwrap_err();
    let report = error.report().expect("validation failure");

    assert_eq!(report.fields().collect::<Vec<_>>(), ["quantity"]);
    assert_eq!(report.get("name"), None);
}

#[tokio::test]
async fn scenario_rules_run_after_base_rules_and_only_in_scenario() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let validator = logged_validator(&log);

    let item = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate(&item.as_record())
        .await
        .expect("base rules pass");
    assert_eq!(*log.lock(), ["base"]);

    log.lock().clear();
    let other = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate_as(&other.as_record(), Some("audit"))
        .await
        .expect("scenario rules pass");
    assert_eq!(*log.lock(), ["base", "scenario"]);
}

#[tokio::test]
async fn base_skip_also_suppresses_scenario_rules() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let scenario_log = Arc::clone(&log);

    let validator = Validator::builder()
        .field(
            "name",
            [RuleSpec::custom(|_, ctx| async move {
                ctx.skip_remaining();
                Ok(())
            })],
        )
        .scenario_field(
            "audit",
            "name",
            [RuleSpec::custom(move |_, _| {
                let log = Arc::clone(&scenario_log);
                async move {
                    log.lock().push("scenario");
                    Ok(())
                }
            })],
        )
        .build()
        .expect("rule set builds");

    let item = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate_as(&item.as_record(), Some("audit"))
        .await
        .expect("skip is not an error");

    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn unknown_scenario_falls_back_to_base_rules() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let validator = logged_validator(&log);

    let item = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate_as(&item.as_record(), Some("publish"))
        .await
        .expect("base rules pass");

    assert_eq!(*log.lock(), ["base"]);
}

#[tokio::test]
async fn operations_select_their_scenarios() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let validator = logged_validator(&log);

    let item = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate_for(&item.as_record(), Operation::Create)
        .await
        .expect("create validates base rules");
    assert_eq!(*log.lock(), ["base"]);

    log.lock().clear();
    let other = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate_for(&other.as_record(), Operation::Scenario("audit"))
        .await
        .expect("named scenario validates");
    assert_eq!(*log.lock(), ["base", "scenario"]);
}

#[tokio::test]
async fn lookup_fault_is_not_a_validation_failure_and_is_never_cached() {
    let attempts = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&attempts);

    let validator = Validator::builder()
        .field(
            "name",
            [RuleSpec::custom(move |_, _| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("lookup offline".into())
                }
            })],
        )
        .build()
        .expect("rule set builds");

    let item = Item::forge(object(&[("name", json!("widget"))]));
    let record = item.as_record();

    let error = validator.validate(&record).await.unwrap_err();
    assert!(matches!(
        &error,
        ValidateError::Fault { field, .. } if field == "name"
    ));
    assert!(!error.is_invalid());
    assert!(error.report().is_none());

    // The aborted run cached nothing: the rule executes again.
    let _ = validator.validate(&record).await.unwrap_err();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_runs_are_not_cached() {
    let attempts = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&attempts);

    let validator = Validator::builder()
        .field(
            "name",
            [
                RuleSpec::custom(move |_, _| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
                RuleSpec::check("not_empty", [], "name is required"),
            ],
        )
        .build()
        .expect("rule set builds");

    let item = Item::forge(Map::new());
    let record = item.as_record();

    assert!(validator.validate(&record).await.is_err());
    assert!(validator.validate(&record).await.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn substituted_check_registry_resolves_rule_names() {
    fn is_widget(_args: &[Value]) -> Result<attest_validator::checks::CompiledCheck, String> {
        Ok(predicate(|value| {
            matches!(value, Some(Value::String(s)) if s == "widget")
        }))
    }

    let mut checks = CheckRegistry::new();
    checks
        .register("is_widget", is_widget)
        .expect("fresh name registers");

    let validator = Validator::builder()
        .with_checks(checks)
        .field("name", [RuleSpec::check("is_widget", [], "not a widget")])
        .build()
        .expect("rule set builds");

    let good = Item::forge(object(&[("name", json!("widget"))]));
    validator
        .validate(&good.as_record())
        .await
        .expect("widget passes");

    let bad = Item::forge(object(&[("name", json!("gadget"))]));
    let error = validator.validate(&bad.as_record()).await.unwrap_err();
    assert_eq!(
        error.report().and_then(|report| report.get("name")),
        Some(["not a widget".to_owned()].as_slice())
    );
}

#[tokio::test]
async fn standard_names_are_unknown_to_an_empty_registry() {
    let result = Validator::builder()
        .with_checks(CheckRegistry::new())
        .field("name", [RuleSpec::check("not_empty", [], "required")])
        .build();

    assert!(result.is_err());
}
