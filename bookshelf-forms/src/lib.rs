//! Field validation for bookshelf forms.
//!
//! A [`Form`] holds the current value of each field together with its error
//! message and whether the user has touched it yet. Fields are checked by an
//! ordered list of [`Rule`]s declared in a [`RuleSet`]; the first failing rule
//! wins.
//!
//! # Example
//!
//! ```
//! use bookshelf_forms::Form;
//! use bookshelf_forms::RuleSet;
//! use bookshelf_forms::Value;
//! use bookshelf_forms::rules;
//!
//! let mut form = Form::new(
//!     [("isbn", Value::from("978-123"))],
//!     RuleSet::new().field("isbn", [rules::required(), rules::isbn()]),
//! )?;
//!
//! // Typing into an untouched field shows nothing yet.
//! form.handle_input("isbn");
//! assert!(form.is_valid());
//!
//! // Leaving the field validates it.
//! form.handle_blur("isbn");
//! assert_eq!(form.visible_error("isbn"), Some("invalid ISBN format (978-XXXXXXXXXX)"));
//!
//! // From now on every edit re-validates.
//! form.set("isbn", "978-1234567890")?;
//! form.handle_input("isbn");
//! assert!(form.is_valid());
//! # Ok::<(), bookshelf_forms::FormError>(())
//! ```

mod error;
mod form;
mod result;
mod rule;
mod rule_set;
pub mod rules;
mod value;

pub use error::FormError;
pub use form::Form;
pub use result::FieldError;
pub use result::ValidationResult;
pub use rule::Rule;
pub use rule::RuleResult;
pub use rule_set::RuleSet;
pub use value::Value;
