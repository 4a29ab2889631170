//! Error type for `docket-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] docket_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("stored value could not be decoded: {0}")]
  Decode(String),
}

/// Collapse backend faults into the core error vocabulary; domain failures
/// produced inside the store pass through unchanged.
impl From<Error> for docket_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => docket_core::Error::Store(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
