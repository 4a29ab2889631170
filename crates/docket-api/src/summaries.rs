//! Handler for the summary sub-resource — the retrieval resolver's fallback
//! path when a fetched case does not embed its summaries.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use docket_core::{case::Cin, store::CaseStore};
use serde_json::json;

use crate::error::{ApiError, store_err};

/// `GET /case/:cin/summary` — `{"summaries": [{content, createdAt}, ...]}`.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(cin): Path<Cin>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  let summaries = store.get_summaries(cin).await.map_err(store_err)?;
  Ok(Json(json!({ "summaries": summaries })))
}
