//! Form definitions for the catalog screens
//!
//! Field names match the JSON wire names so a validated form converts
//! straight into a request payload.

use bookshelf_forms::Form;
use bookshelf_forms::FormError;
use bookshelf_forms::Rule;
use bookshelf_forms::RuleSet;
use bookshelf_forms::Value;
use bookshelf_forms::rules;
use chrono::Datelike;
use chrono::Utc;

use crate::model::Book;
use crate::model::BookCategory;
use crate::model::LoginCredentials;

/// Earliest accepted publication year.
pub const FIRST_PRINTED_YEAR: i64 = 1450;

fn category() -> Rule {
    Rule::predicate(
        |v| {
            v.as_str()
                .is_some_and(|s| BookCategory::ALL.iter().any(|c| c.as_str() == s))
        },
        "unknown category",
    )
}

/// Prices must survive JSON encoding, which has no infinity.
fn finite_price() -> Rule {
    Rule::predicate(
        |v| v.as_f64().is_some_and(f64::is_finite),
        "must be a positive number",
    )
}

/// Rules for creating or editing a book.
pub fn book_rules() -> RuleSet {
    let this_year = i64::from(Utc::now().year());

    RuleSet::new()
        .field("title", [rules::required(), rules::max_length(255)])
        .field(
            "author",
            [rules::required(), rules::min_length(2), rules::max_length(255)],
        )
        .field("isbn", [rules::required(), rules::isbn()])
        .field("price", [rules::required(), rules::positive_number(), finite_price()])
        .field("category", [rules::required(), category()])
        .field(
            "publicationYear",
            [rules::optional(rules::year(FIRST_PRINTED_YEAR, this_year))],
        )
        .field("description", [rules::optional(rules::max_length(2000))])
}

/// Builds the book form seeded with `book`.
///
/// Pass `&Book::default()` for a blank creation form.
pub fn book_form(book: &Book) -> Result<Form, FormError> {
    Form::new(
        [
            ("title", Value::from(book.title.as_str())),
            ("author", Value::from(book.author.as_str())),
            ("isbn", Value::from(book.isbn.as_str())),
            ("price", Value::from(book.price)),
            ("category", Value::from(book.category.as_str())),
            ("publicationYear", Value::from(book.publication_year)),
            ("description", Value::from(book.description.clone())),
            ("coverUrl", Value::from(book.cover_url.clone())),
        ],
        book_rules(),
    )
}

/// Reads a book payload out of a book form.
///
/// `id` is carried over for edits; the form itself has no id field.
pub fn book_from_form(form: &Form, id: Option<i64>) -> Result<Book, FormError> {
    let mut book: Book = form.deserialize()?;
    book.id = id;
    Ok(book)
}

/// Builds the sign-in form.
pub fn login_form() -> Result<Form, FormError> {
    Form::new(
        [("username", ""), ("password", "")],
        RuleSet::new()
            .field("username", [rules::required(), rules::min_length(3)])
            .field("password", [rules::required(), rules::min_length(6)]),
    )
}

/// Reads credentials out of a sign-in form.
pub fn credentials_from_form(form: &Form) -> Result<LoginCredentials, FormError> {
    form.deserialize()
}
