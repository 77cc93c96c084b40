//! Error type for form construction and field access.
//!
//! Rule failures are not errors; they are recorded per field on the form.

/// Errors raised by [`Form`](crate::Form) operations that address the field set.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The field is not part of the form.
    #[error("Field '{field}' is not part of the form")]
    UnknownField { field: String },

    /// The field exists but holds a different kind of value than requested.
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The form data could not be converted into the requested type.
    #[error("Form data conversion failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl FormError {
    /// Creates a new unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}
