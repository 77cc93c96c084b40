//! Bookshelf client library
//!
//! Client-side layer for the book catalog: an authenticated HTTP client,
//! session persistence, the auth and catalog stores, the navigation guard
//! and the catalog's form definitions.

pub mod error;
pub mod forms;
pub mod model;
pub mod router;
pub mod session;
pub mod store;

mod client;

pub use bookshelf_forms;
pub use client::*;
