//! Book records and categories

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// A book in the catalog.
///
/// `id` is assigned by the backend and omitted from create payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub category: BookCategory,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Book categories known to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookCategory {
    #[default]
    Roman,
    Poesie,
    Theatre,
    Essai,
    Biographie,
}

impl BookCategory {
    /// Every category, in display order.
    pub const ALL: [BookCategory; 5] = [
        BookCategory::Roman,
        BookCategory::Poesie,
        BookCategory::Theatre,
        BookCategory::Essai,
        BookCategory::Biographie,
    ];

    /// Returns the wire name (e.g. `"ROMAN"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCategory::Roman => "ROMAN",
            BookCategory::Poesie => "POESIE",
            BookCategory::Theatre => "THEATRE",
            BookCategory::Essai => "ESSAI",
            BookCategory::Biographie => "BIOGRAPHIE",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            BookCategory::Roman => "Roman",
            BookCategory::Poesie => "Poésie",
            BookCategory::Theatre => "Théâtre",
            BookCategory::Essai => "Essai",
            BookCategory::Biographie => "Biographie",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown book category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for BookCategory {
    type Err = UnknownCategory;

    /// Parses a wire name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
