//! Rule type shared by every field validator.

use std::fmt;
use std::sync::Arc;

use crate::Value;

/// Outcome of a single rule: `Ok(())` when valid, otherwise the message to show.
pub type RuleResult = Result<(), String>;

type RuleFn = dyn Fn(&Value) -> RuleResult + Send + Sync;

/// A pure check over one field value.
///
/// Rules close over their parameters at construction and hold no mutable
/// state, so one instance can be attached to any number of fields and forms.
/// Cloning is cheap.
///
/// # Example
///
/// ```
/// use bookshelf_forms::Rule;
/// use bookshelf_forms::Value;
///
/// let even = Rule::new(|v| match v.as_i64() {
///     Some(n) if n % 2 == 0 => Ok(()),
///     _ => Err("must be even".to_string()),
/// });
///
/// assert!(even.check(&Value::from(4)).is_ok());
/// assert_eq!(even.check(&Value::from(3)), Err("must be even".to_string()));
/// ```
#[derive(Clone)]
pub struct Rule {
    check: Arc<RuleFn>,
}

impl Rule {
    /// Creates a rule from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> RuleResult + Send + Sync + 'static,
    {
        Self { check: Arc::new(f) }
    }

    /// Creates a rule from a predicate and the message to report when it is false.
    pub fn predicate<F>(f: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(move |v| if f(v) { Ok(()) } else { Err(message.clone()) })
    }

    /// Evaluates the rule against a value.
    pub fn check(&self, value: &Value) -> RuleResult {
        (self.check)(value)
    }

    /// Returns a rule that fails exactly when this one does, with `message` instead.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        let inner = self.check;
        Self::new(move |v| inner(v).map_err(|_| message.clone()))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").finish_non_exhaustive()
    }
}
