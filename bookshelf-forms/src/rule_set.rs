//! Per-field rule sequences.

use indexmap::IndexMap;

use crate::Rule;

/// Ordered rules for each field of a form.
///
/// Fields keep the order in which they were first declared, and each field's
/// rules run in the order they were added.
///
/// # Example
///
/// ```
/// use bookshelf_forms::RuleSet;
/// use bookshelf_forms::rules;
///
/// let rules = RuleSet::new()
///     .field("title", [rules::required(), rules::max_length(255)])
///     .field("year", [rules::year(1900, 2025)]);
///
/// assert_eq!(rules.fields().collect::<Vec<_>>(), ["title", "year"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: IndexMap<String, Vec<Rule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rules to a field's sequence.
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.entry(name.into()).or_default().extend(rules);
        self
    }

    /// Returns the rules declared for a field (empty if none).
    pub fn rules_for(&self, name: &str) -> &[Rule] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if the field has a declared rule sequence.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates the ruled field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields with declared rules.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field has declared rules.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
