//! Data types shared with the backend

mod book;
mod review;
mod user;

pub use book::*;
pub use review::*;
pub use user::*;
