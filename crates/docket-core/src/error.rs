//! Error types for `docket-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::case::Cin;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  /// A hearing date in the past was supplied for a case that would remain
  /// pending.
  #[error("hearing date {0} is in the past")]
  InvalidDate(NaiveDate),

  /// Another case already holds an active hearing on this day.
  #[error("hearing date {0} is already occupied")]
  DateConflict(NaiveDate),

  /// The case is resolved, or the caller's role is not allowed to mutate it.
  #[error("case {0} can no longer be modified")]
  ImmutableCase(Cin),

  #[error("case {0} not found")]
  CaseNotFound(Cin),

  #[error("bill {0} not found")]
  BillNotFound(Uuid),

  /// Every retrieval strategy was exhausted. Carries the last recorded
  /// strategy failure, not the first.
  #[error("no case found: {last_error}")]
  NotFound { last_error: String },

  /// A collaborator was unreachable. Surfaced to the caller, never retried
  /// at this layer.
  #[error("transport error: {0}")]
  Transport(String),

  #[error("store error: {0}")]
  Store(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
