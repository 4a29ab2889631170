//! Handlers for the lawyer billing endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use docket_core::{case::Cin, store::CaseStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize)]
pub struct NewBillBody {
  /// Minor currency units.
  pub amount: i64,
}

/// `POST /lawyer/bill/:cin` — returns 201 + `{"bill": ...}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(cin): Path<Cin>,
  Json(body): Json<NewBillBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore,
{
  let bill = store.add_bill(cin, body.amount).await.map_err(store_err)?;
  tracing::info!(cin = %cin, bill = %bill.bill_id, "bill issued");
  Ok((StatusCode::CREATED, Json(json!({ "bill": bill }))))
}

/// `PUT /lawyer/bill/:cin/:bill_id/clear` — marks the bill paid.
pub async fn clear<S>(
  State(store): State<Arc<S>>,
  Path((cin, bill_id)): Path<(Cin, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  let bill = store.clear_bill(cin, bill_id).await.map_err(store_err)?;
  tracing::info!(cin = %cin, bill = %bill.bill_id, "bill cleared");
  Ok(Json(json!({ "bill": bill })))
}
