//! HTTP error mapping: every handler failure becomes a status code plus a
//! `{"message": ...}` body.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure surfaced by an API handler, keyed by the status it maps to.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad gateway: {0}")]
  BadGateway(String),

  #[error("store error: {0}")]
  Store(String),
}

impl From<docket_core::Error> for ApiError {
  fn from(err: docket_core::Error) -> Self {
    use docket_core::Error as E;
    match err {
      E::Validation(_) | E::InvalidDate(_) => Self::BadRequest(err.to_string()),
      E::DateConflict(_) => Self::Conflict(err.to_string()),
      E::ImmutableCase(_) => Self::Forbidden(err.to_string()),
      E::CaseNotFound(_) | E::BillNotFound(_) | E::NotFound { .. } => {
        Self::NotFound(err.to_string())
      }
      E::Transport(_) => Self::BadGateway(err.to_string()),
      E::Store(_) | E::Serialization(_) => Self::Store(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::BadGateway(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    // The `message` key is the shape existing clients parse.
    (status, Json(json!({ "message": message }))).into_response()
  }
}

/// Map any store-side failure through the core error vocabulary.
pub fn store_err<E: Into<docket_core::Error>>(err: E) -> ApiError {
  ApiError::from(err.into())
}
