//! Book catalog state

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::client::BookshelfClient;
use crate::error::Error;
use crate::model::Book;
use crate::model::BookCategory;

/// In-memory copy of the catalog with search and category filters.
#[derive(Debug)]
pub struct BookStore {
    client: BookshelfClient,
    books: Vec<Book>,
    current_book: Option<Book>,
    loading: bool,
    error: Option<String>,
    search_query: String,
    selected_category: Option<BookCategory>,
}

impl BookStore {
    /// Creates an empty store.
    pub fn new(client: BookshelfClient) -> Self {
        Self {
            client,
            books: Vec::new(),
            current_book: None,
            loading: false,
            error: None,
            search_query: String::new(),
            selected_category: None,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.current_book.as_ref()
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn selected_category(&self) -> Option<BookCategory> {
        self.selected_category
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Books matching the search query (title or author, case-insensitive)
    /// and the selected category.
    pub fn filtered_books(&self) -> Vec<&Book> {
        let query = self.search_query.to_lowercase();

        self.books
            .iter()
            .filter(|book| {
                query.is_empty()
                    || book.title.to_lowercase().contains(&query)
                    || book.author.to_lowercase().contains(&query)
            })
            .filter(|book| self.selected_category.is_none_or(|c| book.category == c))
            .collect()
    }

    /// Number of books per category present in the catalog.
    pub fn category_stats(&self) -> BTreeMap<BookCategory, usize> {
        let mut stats = BTreeMap::new();
        for book in &self.books {
            *stats.entry(book.category).or_insert(0) += 1;
        }
        stats
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Replaces the catalog with `GET /books`.
    pub async fn fetch_books(&mut self) -> Result<(), Error> {
        self.loading = true;
        self.error = None;

        let result = self.client.get::<Vec<Book>>("/books").await;
        self.loading = false;

        match result {
            Ok(books) => {
                debug!("Fetched {} books", books.len());
                self.books = books;
                Ok(())
            }
            Err(e) => {
                self.error = Some("failed to load books".to_string());
                Err(e)
            }
        }
    }

    /// Loads one book into `current_book` with `GET /books/{id}`.
    pub async fn fetch_book(&mut self, id: i64) -> Result<(), Error> {
        self.loading = true;
        self.error = None;

        let result = self.client.get::<Book>(&format!("/books/{}", id)).await;
        self.loading = false;

        match result {
            Ok(book) => {
                self.current_book = Some(book);
                Ok(())
            }
            Err(e) => {
                self.error = Some("book not found".to_string());
                Err(e)
            }
        }
    }

    /// Creates a book with `POST /books` and appends the stored copy.
    pub async fn create_book(&mut self, book: &Book) -> Result<Book, Error> {
        let created: Book = self.client.post("/books", book).await?;
        self.books.push(created.clone());
        Ok(created)
    }

    /// Updates a book with `PUT /books/{id}`.
    ///
    /// `changes` may be a full [`Book`] or any partial JSON object. The local
    /// entry with the same id is replaced by the server's answer.
    pub async fn update_book<B>(&mut self, id: i64, changes: &B) -> Result<Book, Error>
    where
        B: Serialize + ?Sized,
    {
        let updated: Book = self.client.put(&format!("/books/{}", id), changes).await?;

        if let Some(slot) = self.books.iter_mut().find(|b| b.id == Some(id)) {
            *slot = updated.clone();
        }

        Ok(updated)
    }

    /// Deletes a book with `DELETE /books/{id}` and drops it locally.
    pub async fn delete_book(&mut self, id: i64) -> Result<(), Error> {
        self.client.delete(&format!("/books/{}", id)).await?;
        self.books.retain(|b| b.id != Some(id));
        Ok(())
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_category(&mut self, category: Option<BookCategory>) {
        self.selected_category = category;
    }

    /// Replaces the local catalog without a request.
    pub fn set_books(&mut self, books: Vec<Book>) {
        self.books = books;
    }
}
