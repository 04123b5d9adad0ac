//! SQLite backend for the Quizz store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-row mutations run as one
//! `rusqlite` transaction inside a single `call`, so a failure at any step
//! rolls the whole operation back.

mod encode;
mod schema;
mod store;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
