//! Handlers for case registration, update, and role-scoped retrieval.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/registrar/case-creation` | Body: [`NewCaseBody`]; returns 201 + `{"case": ...}` |
//! | `PUT`  | `/registrar/case-updation/:cin` | Body: [`CasePatch`] |
//! | `GET`  | `/:role/case-query/:cin` | Direct lookup, `{"case": ...}` |
//! | `GET`  | `/:role/cases/:key` | `:key` is a status (listing) or, for lawyers, a CIN (billing-augmented case) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use docket_core::{
  case::{Bill, Case, CasePatch, CaseStatus, Cin, NewCase, Role},
  lifecycle::{CallContext, LifecycleManager},
  store::CaseStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, store_err};

fn parse_role(segment: &str) -> Result<Role, ApiError> {
  segment
    .parse::<Role>()
    .map_err(|_| ApiError::NotFound(format!("unknown role scope: {segment}")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /registrar/case-creation`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaseBody {
  #[serde(flatten)]
  pub case:         NewCase,
  /// First hearing to book, if any.
  pub hearing_date: Option<NaiveDate>,
}

/// `POST /registrar/case-creation` — returns 201 + `{"case": ...}`.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCaseBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore,
{
  let manager = LifecycleManager::new(&*store);
  let ctx = CallContext::new(Role::Registrar);

  let case = manager.create(ctx, body.case, body.hearing_date).await?;
  tracing::info!(cin = %case.cin, "case registered");

  Ok((StatusCode::CREATED, Json(json!({ "case": case }))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /registrar/case-updation/:cin` — body is a [`CasePatch`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(cin): Path<Cin>,
  Json(patch): Json<CasePatch>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  let manager = LifecycleManager::new(&*store);
  let ctx = CallContext::new(Role::Registrar);

  let case = manager.update(ctx, cin, patch).await?;
  tracing::info!(cin = %case.cin, status = %case.status, "case updated");

  Ok(Json(json!({ "case": case })))
}

// ─── Direct lookup ───────────────────────────────────────────────────────────

/// `GET /:role/case-query/:cin`
pub async fn query_one<S>(
  State(store): State<Arc<S>>,
  Path((role, cin)): Path<(String, Cin)>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  parse_role(&role)?;

  let case = store
    .get_case(cin)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("case {cin} not found")))?;

  Ok(Json(json!({ "case": case })))
}

// ─── Listing / alternate collection ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to cases with a hearing on this exact day.
  pub date: Option<NaiveDate>,
}

/// A case together with its fee records — the lawyer-scoped alternate
/// representation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseWithBilling {
  #[serde(flatten)]
  pub case:  Case,
  pub bills: Vec<Bill>,
}

/// `GET /:role/cases/:key`
///
/// `:key` is a status name (`pending` / `resolved`) for the plain listing.
/// On the lawyer scope it may instead be a CIN, selecting the alternate
/// collection that returns the billing-augmented case.
pub async fn list_or_alternate<S>(
  State(store): State<Arc<S>>,
  Path((role, key)): Path<(String, String)>,
  Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: CaseStore,
{
  let role = parse_role(&role)?;

  if let Ok(status) = key.parse::<CaseStatus>() {
    // Lawyers see only the resolved docket.
    if role == Role::Lawyer && status != CaseStatus::Resolved {
      return Err(ApiError::Forbidden(
        "lawyers may list only resolved cases".into(),
      ));
    }
    let cases = store
      .list_cases(status, params.date)
      .await
      .map_err(store_err)?;
    return Ok(Json(json!({ "cases": cases })));
  }

  if role == Role::Lawyer
    && let Ok(cin) = key.parse::<Cin>()
  {
    let case = store
      .get_case(cin)
      .await
      .map_err(store_err)?
      .ok_or_else(|| ApiError::NotFound(format!("case {cin} not found")))?;
    let bills = store.get_bills(cin).await.map_err(store_err)?;
    return Ok(Json(json!({ "case": CaseWithBilling { case, bills } })));
  }

  Err(ApiError::BadRequest(format!(
    "expected a case status or CIN, got {key:?}"
  )))
}
