//! Application state backed by the API
//!
//! Stores own their state and expose it through getters; actions are async
//! methods that call the API and update the state.

mod auth;
mod books;

pub use auth::AuthStore;
pub use books::BookStore;
