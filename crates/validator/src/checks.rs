//! Built-in check catalog and the registry resolving names to checks.
//!
//! A check is addressed by name from a rule spec. The registry maps each
//! name to a *factory*: argument validation (and e.g. regex compilation)
//! happens exactly once, when the entity type's rules are built, and yields
//! a cheap compiled closure that runs per validation.
//!
//! Values are coerced the way string-validation libraries traditionally do
//! it: missing and `null` become the empty string, strings pass through,
//! everything else renders as JSON. `min`/`max` compare numerically instead.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::RegexBuilder;
use serde_json::Value;

use crate::core::DefinitionError;

// ============================================================================
// TYPES
// ============================================================================

/// A check compiled against its arguments, ready to run against a value.
pub type CompiledCheck = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// Builds a [`CompiledCheck`] from a rule's arguments, rejecting bad ones at
/// definition time. The error string becomes the `reason` of a
/// [`DefinitionError::BadArguments`].
pub type CheckFactory = fn(&[Value]) -> Result<CompiledCheck, String>;

/// Wraps a plain predicate as a [`CompiledCheck`].
pub fn predicate<F>(check: F) -> CompiledCheck
where
    F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
{
    Arc::new(check)
}

pub(crate) fn run_check(check: &CompiledCheck, value: Option<&Value>) -> bool {
    (check.as_ref())(value)
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Named table of built-in checks.
///
/// Read-mostly: built once (usually [`CheckRegistry::standard`]) and handed
/// to a builder. Registration is append-only so a name can never be
/// redefined under an existing rule set, and the table is a plain value
/// rather than a process global — tests substitute their own.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    factories: BTreeMap<String, CheckFactory>,
}

impl CheckRegistry {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for entry in STANDARD {
            let (name, factory) = *entry;
            registry.factories.insert(name.to_owned(), factory);
        }
        registry
    }

    /// Adds a check under `name`. Redefining an existing name is a
    /// definition error.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: CheckFactory,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(DefinitionError::DuplicateCheck(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// The factory registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CheckFactory> {
        self.factories.get(name).copied()
    }

    /// Registered names, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.factories.len())
            .finish()
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Renders a value the way the string checks see it.
fn text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// Numeric view of a value: a JSON number, or a string parsing as one.
fn numeric(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

fn no_args(args: &[Value]) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(format!("takes no arguments, got {}", args.len()))
    }
}

fn str_arg<'a>(args: &'a [Value], index: usize) -> Result<&'a str, String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(format!("argument {index} must be a string, got {other}")),
        None => Err(format!("argument {index} is required")),
    }
}

fn num_arg(args: &[Value], index: usize) -> Result<f64, String> {
    match args.get(index) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("argument {index} is not a representable number")),
        Some(other) => Err(format!("argument {index} must be a number, got {other}")),
        None => Err(format!("argument {index} is required")),
    }
}

fn usize_arg(args: &[Value], index: usize) -> Result<usize, String> {
    match args.get(index).and_then(Value::as_u64) {
        Some(v) => usize::try_from(v).map_err(|_| format!("argument {index} is out of range")),
        None => Err(format!("argument {index} must be a non-negative integer")),
    }
}

// ============================================================================
// ZERO-ARGUMENT CHECKS
// ============================================================================

/// Declares a zero-argument check: a factory that rejects stray arguments
/// and compiles to a plain predicate over the coerced value.
macro_rules! check {
    ($(#[$meta:meta])* $name:ident($value:ident) $body:block) => {
        $(#[$meta])*
        fn $name(args: &[Value]) -> Result<CompiledCheck, String> {
            no_args(args)?;
            Ok(predicate(|$value| $body))
        }
    };
}

check! {
    /// Non-empty after coercion; whitespace-only counts as empty.
    not_empty(value) { !text(value).trim().is_empty() }
}

check! {
    /// A JSON integer, or a string parsing as one.
    is_int(value) {
        match value {
            Some(Value::Number(n)) => n.is_i64() || n.is_u64(),
            other => text(other).trim().parse::<i64>().is_ok(),
        }
    }
}

check! {
    /// Any JSON number, or a string parsing as a float.
    is_float(value) {
        match value {
            Some(Value::Number(_)) => true,
            other => text(other).trim().parse::<f64>().is_ok(),
        }
    }
}

check! {
    /// Decimal digits with an optional leading minus.
    is_numeric(value) {
        let t = text(value);
        let digits = t.strip_prefix('-').unwrap_or(&t);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }
}

check! {
    /// Alphabetic characters only.
    is_alpha(value) {
        let t = text(value);
        !t.is_empty() && t.chars().all(char::is_alphabetic)
    }
}

check! {
    /// Alphanumeric characters only.
    is_alphanumeric(value) {
        let t = text(value);
        !t.is_empty() && t.chars().all(char::is_alphanumeric)
    }
}

check! {
    /// `local@domain` with a dotted domain. Deliberately loose — the
    /// authoritative check is the mail server's.
    is_email(value) {
        let t = text(value);
        match t.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !domain.contains(' ')
            }
            None => false,
        }
    }
}

check! {
    /// `scheme://rest` with an alphabetic scheme.
    is_url(value) {
        let t = text(value);
        match t.split_once("://") {
            Some((scheme, rest)) => {
                !scheme.is_empty()
                    && scheme.chars().all(|c| c.is_ascii_alphabetic())
                    && !rest.is_empty()
            }
            None => false,
        }
    }
}

check! {
    /// Hyphenated 8-4-4-4-12 hex form.
    is_uuid(value) { is_uuid_text(&text(value)) }
}

check! {
    /// Unchanged by lowercasing.
    is_lowercase(value) {
        let t = text(value);
        t.as_ref() == t.to_lowercase()
    }
}

check! {
    /// Unchanged by uppercasing.
    is_uppercase(value) {
        let t = text(value);
        t.as_ref() == t.to_uppercase()
    }
}

fn is_uuid_text(t: &str) -> bool {
    let groups: Vec<&str> = t.split('-').collect();
    groups.len() == 5
        && [8usize, 4, 4, 4, 12]
            .iter()
            .zip(&groups)
            .all(|(len, group)| group.len() == *len && group.chars().all(|c| c.is_ascii_hexdigit()))
}

// ============================================================================
// PARAMETERIZED CHECKS
// ============================================================================

/// `matches(pattern [, flags])` — regex match over the coerced value.
/// Flags: `i`, `m`, `s`, `x`. The pattern compiles once, here.
fn matches(args: &[Value]) -> Result<CompiledCheck, String> {
    if args.len() > 2 {
        return Err(format!("takes at most 2 arguments, got {}", args.len()));
    }
    let pattern = str_arg(args, 0)?;
    let flags = match args.get(1) {
        None => "",
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(format!("argument 1 must be a flag string, got {other}")),
    };

    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => return Err(format!("unsupported regex flag '{other}'")),
        };
    }
    let regex = builder.build().map_err(|e| e.to_string())?;

    Ok(predicate(move |value| regex.is_match(&text(value))))
}

/// `min_length(n)` — at least `n` characters.
fn min_length(args: &[Value]) -> Result<CompiledCheck, String> {
    let min = usize_arg(args, 0)?;
    Ok(predicate(move |value| text(value).chars().count() >= min))
}

/// `max_length(n)` — at most `n` characters.
fn max_length(args: &[Value]) -> Result<CompiledCheck, String> {
    let max = usize_arg(args, 0)?;
    Ok(predicate(move |value| text(value).chars().count() <= max))
}

/// `length(min, max)` — character count within an inclusive range.
fn length(args: &[Value]) -> Result<CompiledCheck, String> {
    let min = usize_arg(args, 0)?;
    let max = usize_arg(args, 1)?;
    if min > max {
        return Err(format!("min {min} must be <= max {max}"));
    }
    Ok(predicate(move |value| {
        let count = text(value).chars().count();
        count >= min && count <= max
    }))
}

/// `equals(expected)` — coerced-string equality.
fn equals(args: &[Value]) -> Result<CompiledCheck, String> {
    let expected = match args {
        [only] => text(Some(only)).into_owned(),
        _ => return Err(format!("takes exactly 1 argument, got {}", args.len())),
    };
    Ok(predicate(move |value| text(value).as_ref() == expected))
}

/// `contains(needle)` — substring of the coerced value.
fn contains(args: &[Value]) -> Result<CompiledCheck, String> {
    if args.len() != 1 {
        return Err(format!("takes exactly 1 argument, got {}", args.len()));
    }
    let needle = str_arg(args, 0)?.to_owned();
    Ok(predicate(move |value| text(value).contains(&needle)))
}

/// `one_of(candidate, …)` — coerced value equals one of the candidates.
fn one_of(args: &[Value]) -> Result<CompiledCheck, String> {
    if args.is_empty() {
        return Err("requires at least 1 candidate".to_owned());
    }
    let candidates: Vec<String> = args
        .iter()
        .map(|candidate| text(Some(candidate)).into_owned())
        .collect();
    Ok(predicate(move |value| {
        let current = text(value);
        candidates
            .iter()
            .any(|candidate| candidate.as_str() == current.as_ref())
    }))
}

/// `min(bound)` — numeric value (or numeric string) at least `bound`.
fn min(args: &[Value]) -> Result<CompiledCheck, String> {
    let bound = num_arg(args, 0)?;
    Ok(predicate(move |value| {
        numeric(value).is_some_and(|n| n >= bound)
    }))
}

/// `max(bound)` — numeric value (or numeric string) at most `bound`.
fn max(args: &[Value]) -> Result<CompiledCheck, String> {
    let bound = num_arg(args, 0)?;
    Ok(predicate(move |value| {
        numeric(value).is_some_and(|n| n <= bound)
    }))
}

// ============================================================================
// STANDARD CATALOG
// ============================================================================

const STANDARD: &[(&str, CheckFactory)] = &[
    ("contains", contains),
    ("equals", equals),
    ("is_alpha", is_alpha),
    ("is_alphanumeric", is_alphanumeric),
    ("is_email", is_email),
    ("is_float", is_float),
    ("is_int", is_int),
    ("is_lowercase", is_lowercase),
    ("is_numeric", is_numeric),
    ("is_uppercase", is_uppercase),
    ("is_url", is_url),
    ("is_uuid", is_uuid),
    ("length", length),
    ("matches", matches),
    ("max", max),
    ("max_length", max_length),
    ("min", min),
    ("min_length", min_length),
    ("not_empty", not_empty),
    ("one_of", one_of),
];

// ============================================================================
// TESTS
// ============================================================================
