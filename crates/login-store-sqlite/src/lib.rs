//! SQLite backend for the login graph store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every row records the partition it
//! was written to; reads only see rows of the partition they ask for.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreStats};

#[cfg(test)]
mod tests;
