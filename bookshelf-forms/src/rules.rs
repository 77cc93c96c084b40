//! Reusable rule factories.
//!
//! Every factory captures its parameters and returns a fresh [`Rule`]. Default
//! messages can be replaced with [`Rule::with_message`].
//!
//! ```
//! use bookshelf_forms::rules;
//! use bookshelf_forms::Value;
//!
//! let rule = rules::min_length(3).with_message("too short");
//! assert_eq!(rule.check(&Value::from("ab")), Err("too short".to_string()));
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::Rule;
use crate::Value;

static ISBN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^978-[0-9]{10}$").expect("ISBN pattern is a valid regex")
});

/// Character length of a value for the length rules.
///
/// Null counts as empty. Other non-string values have no length.
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Null => Some(0),
        Value::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

/// Require a value: fails on null and on the empty string.
pub fn required() -> Rule {
    Rule::predicate(|v| !v.is_blank(), "this field is required")
}

/// Require at least `min` characters.
pub fn min_length(min: usize) -> Rule {
    Rule::predicate(
        move |v| length_of(v).is_none_or(|len| len >= min),
        format!("minimum {} characters", min),
    )
}

/// Require at most `max` characters.
pub fn max_length(max: usize) -> Rule {
    Rule::predicate(
        move |v| length_of(v).is_none_or(|len| len <= max),
        format!("maximum {} characters", max),
    )
}

/// Require an ISBN-13 written as `978-` followed by exactly ten digits.
pub fn isbn() -> Rule {
    Rule::predicate(
        |v| v.as_str().is_some_and(|s| ISBN_RE.is_match(s)),
        "invalid ISBN format (978-XXXXXXXXXX)",
    )
}

/// Require a number strictly greater than zero.
pub fn positive_number() -> Rule {
    Rule::predicate(
        |v| v.as_f64().is_some_and(|n| n > 0.0),
        "must be a positive number",
    )
}

/// Require a numeric year within `min..=max`.
pub fn year(min: i64, max: i64) -> Rule {
    Rule::predicate(
        move |v| v.as_f64().is_some_and(|n| n >= min as f64 && n <= max as f64),
        format!("year between {} and {}", min, max),
    )
}

/// Require a string matching `re`.
pub fn pattern(re: Regex, message: impl Into<String>) -> Rule {
    Rule::predicate(move |v| v.as_str().is_some_and(|s| re.is_match(s)), message)
}

/// Accept missing input (null or empty string), otherwise defer to `rule`.
pub fn optional(rule: Rule) -> Rule {
    Rule::new(move |v| if v.is_blank() { Ok(()) } else { rule.check(v) })
}
