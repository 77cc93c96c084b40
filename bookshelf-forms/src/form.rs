//! The form state machine.

use indexmap::IndexMap;
use log::debug;
use log::warn;
use serde::de::DeserializeOwned;

use crate::FieldError;
use crate::FormError;
use crate::Rule;
use crate::RuleSet;
use crate::ValidationResult;
use crate::Value;

/// Runs rules in order and stops at the first failure.
fn run_rules(rules: &[Rule], value: &Value) -> Result<(), String> {
    for rule in rules {
        rule.check(value)?;
    }
    Ok(())
}

/// Mutable form data with per-field error and touched state.
///
/// The field set is fixed by the initial data. Every field has an error entry
/// (empty string when there is no error) and a touched flag, whether or not
/// it has rules.
///
/// Errors are only shown to the user once a field is touched: `handle_blur`
/// touches and validates, `handle_input` re-validates touched fields only,
/// and `validate_all` touches every ruled field.
///
/// # Example
///
/// ```
/// use bookshelf_forms::Form;
/// use bookshelf_forms::RuleSet;
/// use bookshelf_forms::Value;
/// use bookshelf_forms::rules;
///
/// let mut form = Form::new(
///     [("title", Value::from("")), ("year", Value::from(1800))],
///     RuleSet::new()
///         .field("title", [rules::required()])
///         .field("year", [rules::year(1900, 2025)]),
/// )?;
///
/// assert!(!form.validate_all());
/// assert_eq!(form.error("title"), Some("this field is required"));
/// assert_eq!(form.error("year"), Some("year between 1900 and 2025"));
///
/// form.set("title", "Du côté de chez Swann")?;
/// form.set("year", 1913)?;
/// assert!(form.validate_all());
/// assert!(form.is_valid());
/// # Ok::<(), bookshelf_forms::FormError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Form {
    initial: IndexMap<String, Value>,
    data: IndexMap<String, Value>,
    errors: IndexMap<String, String>,
    touched: IndexMap<String, bool>,
    rules: RuleSet,
}

impl Form {
    /// Creates a form from its initial values and rules.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if `rules` names a field that is not
    /// in the initial data.
    pub fn new<K, V>(initial: impl IntoIterator<Item = (K, V)>, rules: RuleSet) -> Result<Self, FormError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let initial: IndexMap<String, Value> = initial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some(field) = rules.fields().find(|f| !initial.contains_key(*f)) {
            return Err(FormError::unknown_field(field));
        }

        let errors = initial.keys().map(|k| (k.clone(), String::new())).collect();
        let touched = initial.keys().map(|k| (k.clone(), false)).collect();

        Ok(Self {
            data: initial.clone(),
            initial,
            errors,
            touched,
            rules,
        })
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Returns a field's current value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Replaces a field's value without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for names outside the field set.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FormError> {
        let slot = self
            .data
            .get_mut(name)
            .ok_or_else(|| FormError::unknown_field(name))?;
        *slot = value.into();
        Ok(())
    }

    /// Returns a string field, `None` when it is null.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>, FormError> {
        match self.require(name)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(FormError::type_mismatch(name, "string", other.type_name())),
        }
    }

    /// Returns an integer field, `None` when it is null.
    pub fn get_i64(&self, name: &str) -> Result<Option<i64>, FormError> {
        match self.require(name)? {
            Value::Null => Ok(None),
            Value::Int(n) => Ok(Some(*n)),
            other => Err(FormError::type_mismatch(name, "int", other.type_name())),
        }
    }

    /// Returns a numeric field as a float, `None` when it is null.
    pub fn get_f64(&self, name: &str) -> Result<Option<f64>, FormError> {
        let value = self.require(name)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_f64()
            .map(Some)
            .ok_or_else(|| FormError::type_mismatch(name, "number", value.type_name()))
    }

    fn require(&self, name: &str) -> Result<&Value, FormError> {
        self.data.get(name).ok_or_else(|| FormError::unknown_field(name))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates one field against its rules and records the outcome.
    ///
    /// Rules run in declaration order; the first failure becomes the field's
    /// error and later rules are skipped. A field without rules always passes.
    pub fn validate_field(&mut self, name: &str) -> bool {
        let Some(value) = self.data.get(name) else {
            warn!("validate_field: '{}' is not part of the form", name);
            return true;
        };

        let outcome = run_rules(self.rules.rules_for(name), value);
        record(&mut self.errors, name, outcome)
    }

    /// Touches and validates every field that has rules.
    ///
    /// Every ruled field is visited even after a failure. Returns `true` only
    /// if all of them passed.
    pub fn validate_all(&mut self) -> bool {
        let mut all_valid = true;

        for name in self.rules.fields() {
            if let Some(touched) = self.touched.get_mut(name) {
                *touched = true;
            }
            let value = self.data.get(name).unwrap_or(&Value::Null);
            let outcome = run_rules(self.rules.rules_for(name), value);
            all_valid &= record(&mut self.errors, name, outcome);
        }

        debug!("validate_all: valid = {}", all_valid);
        all_valid
    }

    /// Marks a field as touched and validates it.
    pub fn handle_blur(&mut self, name: &str) {
        match self.touched.get_mut(name) {
            Some(touched) => *touched = true,
            None => {
                warn!("handle_blur: '{}' is not part of the form", name);
                return;
            }
        }
        self.validate_field(name);
    }

    /// Re-validates a field after an edit, but only once it has been touched.
    pub fn handle_input(&mut self, name: &str) {
        if self.is_touched(name) {
            self.validate_field(name);
        }
    }

    /// Restores the initial values and clears all errors and touched flags.
    pub fn reset_form(&mut self) {
        self.data.clone_from(&self.initial);
        self.errors.values_mut().for_each(String::clear);
        self.touched.values_mut().for_each(|t| *t = false);
    }

    /// Alias for [`reset_form`](Self::reset_form).
    pub fn reset(&mut self) {
        self.reset_form();
    }

    /// Returns `true` when no field has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(String::is_empty)
    }

    // =========================================================================
    // Read views
    // =========================================================================

    /// Returns the current form data in field order.
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// Returns the field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Iterates every field's error message (empty when none).
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a field's error, `None` when it has none.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors
            .get(name)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }

    /// Returns `true` once the field has been blurred or validated with the whole form.
    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.get(name).copied().unwrap_or(false)
    }

    /// Returns the error to display next to a field: only touched fields show one.
    pub fn visible_error(&self, name: &str) -> Option<&str> {
        if self.is_touched(name) {
            self.error(name)
        } else {
            None
        }
    }

    /// Returns the current errors as a [`ValidationResult`].
    pub fn result(&self) -> ValidationResult {
        let errors: Vec<FieldError> = self
            .errors
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, message)| FieldError {
                field: field.clone(),
                message: message.clone(),
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    /// Converts the current data into `T` through its serde representation.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        let json = serde_json::to_value(&self.data)?;
        Ok(serde_json::from_value(json)?)
    }
}

/// Stores a rule outcome as the field's error and returns whether it passed.
fn record(errors: &mut IndexMap<String, String>, name: &str, outcome: Result<(), String>) -> bool {
    let Some(slot) = errors.get_mut(name) else {
        return outcome.is_ok();
    };
    match outcome {
        Ok(()) => {
            slot.clear();
            true
        }
        Err(message) => {
            debug!("field '{}' failed validation: {}", name, message);
            *slot = message;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::rules;

    fn book_form() -> Form {
        Form::new(
            [
                ("title", Value::from("")),
                ("year", Value::from(1800)),
                ("notes", Value::from("")),
            ],
            RuleSet::new()
                .field("title", [rules::required(), rules::min_length(3)])
                .field("year", [rules::year(1900, 2025)]),
        )
        .unwrap()
    }

    #[test]
    fn test_every_field_gets_error_and_touched_entries() {
        let form = book_form();
        assert_eq!(form.errors().count(), 3);
        assert!(form.errors().all(|(_, e)| e.is_empty()));
        assert!(form.field_names().all(|f| !form.is_touched(f)));
        assert!(form.is_valid());
    }

    #[test]
    fn test_rules_for_unknown_field_are_rejected() {
        let err = Form::new(
            [("title", "")],
            RuleSet::new().field("author", [rules::required()]),
        )
        .unwrap_err();
        assert!(matches!(err, FormError::UnknownField { field } if field == "author"));
    }

    #[test]
    fn test_unruled_field_always_valid() {
        let mut form = book_form();
        form.set("notes", Value::Null).unwrap();
        assert!(form.validate_field("notes"));
        assert_eq!(form.error("notes"), None);
    }

    #[test]
    fn test_validate_all_scenario() {
        let mut form = book_form();
        assert!(!form.validate_all());
        assert_eq!(form.error("title"), Some("this field is required"));
        assert_eq!(form.error("year"), Some("year between 1900 and 2025"));
        assert!(form.is_touched("title"));
        assert!(form.is_touched("year"));
        assert!(!form.is_touched("notes"));
    }

    #[test]
    fn test_short_circuit_skips_later_rules() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spy = Rule::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("second".to_string())
        });

        let mut form = Form::new(
            [("title", "")],
            RuleSet::new().field("title", [rules::required(), spy]),
        )
        .unwrap();

        assert!(!form.validate_field("title"));
        assert_eq!(form.error("title"), Some("this field is required"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        form.set("title", "x").unwrap();
        assert!(!form.validate_field("title"));
        assert_eq!(form.error("title"), Some("second"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_then_validate_clears_error() {
        let mut form = book_form();
        form.validate_all();
        form.set("title", "Valid Title").unwrap();
        assert!(form.validate_field("title"));
        assert_eq!(form.error("title"), None);
    }

    #[test]
    fn test_set_does_not_validate() {
        let mut form = book_form();
        form.set("year", 1500).unwrap();
        assert!(form.is_valid());
        assert_eq!(form.get("year"), Some(&Value::from(1500)));
    }

    #[test]
    fn test_set_unknown_field_is_rejected() {
        let mut form = book_form();
        assert!(matches!(
            form.set("isbn", "978-1234567890"),
            Err(FormError::UnknownField { .. })
        ));
        assert_eq!(form.field_names().count(), 3);
    }

    #[test]
    fn test_handle_input_before_touch_changes_nothing() {
        let mut form = book_form();
        form.set("title", "").unwrap();
        form.handle_input("title");
        form.set("title", "ab").unwrap();
        form.handle_input("title");
        assert_eq!(form.error("title"), None);
        assert!(!form.is_touched("title"));
    }

    #[test]
    fn test_handle_input_after_blur_revalidates() {
        let mut form = book_form();
        form.handle_blur("title");
        assert!(form.is_touched("title"));
        assert_eq!(form.error("title"), Some("this field is required"));

        form.set("title", "ab").unwrap();
        form.handle_input("title");
        assert_eq!(form.error("title"), Some("minimum 3 characters"));

        form.set("title", "abc").unwrap();
        form.handle_input("title");
        assert_eq!(form.error("title"), None);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut form = book_form();
        form.set("title", "abc").unwrap();
        form.validate_all();
        form.reset_form();

        assert_eq!(form.get("title"), Some(&Value::from("")));
        assert!(form.is_valid());
        assert!(form.field_names().all(|f| !form.is_touched(f)));
        assert_eq!(form.errors().count(), 3);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = book_form();
        once.set("title", "abc").unwrap();
        once.validate_all();
        once.reset_form();

        let mut twice = once.clone();
        twice.reset();

        assert_eq!(once.data(), twice.data());
        assert_eq!(once.errors().collect::<Vec<_>>(), twice.errors().collect::<Vec<_>>());
        assert_eq!(
            once.field_names().map(|f| once.is_touched(f)).collect::<Vec<_>>(),
            twice.field_names().map(|f| twice.is_touched(f)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_is_valid_tracks_errors() {
        let mut form = book_form();
        form.handle_blur("year");
        assert!(!form.is_valid());
        assert_eq!(form.is_valid(), form.errors().all(|(_, e)| e.is_empty()));
        form.set("year", 1950).unwrap();
        form.handle_input("year");
        assert!(form.is_valid());
    }

    #[test]
    fn test_unknown_name_operations_are_noops() {
        let mut form = book_form();
        assert!(form.validate_field("missing"));
        form.handle_blur("missing");
        form.handle_input("missing");
        assert!(!form.is_touched("missing"));
        assert_eq!(form.errors().count(), 3);
    }

    #[test]
    fn test_visible_error_requires_touch() {
        let mut form = book_form();
        form.validate_field("title");
        assert_eq!(form.error("title"), Some("this field is required"));
        assert_eq!(form.visible_error("title"), None);
        form.handle_blur("title");
        assert_eq!(form.visible_error("title"), Some("this field is required"));
    }

    #[test]
    fn test_result_lists_errors_in_field_order() {
        let mut form = book_form();
        form.validate_all();
        let result = form.result();
        assert!(result.is_invalid());
        let fields: Vec<&str> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "year"]);
        assert_eq!(result.first_error().map(|e| e.message.as_str()), Some("this field is required"));
    }

    #[test]
    fn test_typed_getters() {
        let form = Form::new(
            [("title", Value::from("Dune")), ("price", Value::from(9)), ("cover", Value::Null)],
            RuleSet::new(),
        )
        .unwrap();

        assert_eq!(form.get_str("title").unwrap(), Some("Dune"));
        assert_eq!(form.get_i64("price").unwrap(), Some(9));
        assert_eq!(form.get_f64("price").unwrap(), Some(9.0));
        assert_eq!(form.get_str("cover").unwrap(), None);
        assert!(matches!(
            form.get_i64("title"),
            Err(FormError::TypeMismatch { expected: "int", actual: "string", .. })
        ));
        assert!(matches!(form.get_str("nope"), Err(FormError::UnknownField { .. })));
    }

    #[test]
    fn test_deserialize() {
        #[derive(serde::Deserialize)]
        struct Draft {
            title: String,
            year: i32,
        }

        let form = Form::new(
            [("title", Value::from("Nana")), ("year", Value::from(1880))],
            RuleSet::new(),
        )
        .unwrap();
        let draft: Draft = form.deserialize().unwrap();
        assert_eq!(draft.title, "Nana");
        assert_eq!(draft.year, 1880);
    }
}
