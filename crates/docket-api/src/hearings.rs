//! Handler for the monthly occupancy projection.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use docket_core::{case::Cin, store::CaseStore};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize)]
pub struct OccupancyParams {
  pub month:   u32,
  pub year:    i32,
  /// CIN of a case currently being edited: its own hearing day is reported
  /// free to this caller, since the in-flight update is about to free it.
  pub exclude: Option<Cin>,
}

/// `GET /registrar/hearing-dates?month=&year=[&exclude=]`
///
/// Returns `{"dates": [{"day": 1, "occupied": false}, ...]}` covering every
/// day of the month. Occupancy is recomputed from hearing records on each
/// call; there is no stored flag set to drift out of date.
pub async fn occupied<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<OccupancyParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  if !(1..=12).contains(&params.month) {
    return Err(ApiError::BadRequest(format!(
      "month out of range: {}",
      params.month
    )));
  }

  let today = chrono::Utc::now().date_naive();
  let dates = store
    .occupied_days(params.month, params.year, today, params.exclude)
    .await
    .map_err(store_err)?;

  Ok(Json(json!({ "dates": dates })))
}
