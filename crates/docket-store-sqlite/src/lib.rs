//! SQLite implementation of the Docket case store.
//!
//! Every query runs through [`tokio_rusqlite`], which owns the connection on
//! its own thread, so the async runtime is never blocked and store calls
//! serialise naturally.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
