//! JSON REST API for Docket.
//!
//! Exposes an axum [`Router`] backed by any [`docket_core::store::CaseStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility: the
//! `Authorization` bearer token is an opaque role supplier resolved outside
//! this crate, and here the role arrives as the leading path segment.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", docket_api::api_router(store.clone()))
//! ```

pub mod bills;
pub mod cases;
pub mod error;
pub mod hearings;
pub mod summaries;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use docket_core::store::CaseStore;

pub use error::ApiError;

/// Assemble the complete API route table over `store`.
///
/// State is applied before returning, so the `Router<()>` nests into any
/// parent router. Route shapes mirror the role-scoped endpoint families the
/// retrieval resolver probes.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CaseStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Registrar mutations
    .route("/registrar/case-creation", post(cases::create::<S>))
    .route("/registrar/case-updation/{cin}", put(cases::update::<S>))
    // Calendar projection
    .route("/registrar/hearing-dates", get(hearings::occupied::<S>))
    // Role-scoped reads. `{key}` in the listing route is a status name for
    // every role, or a CIN on the lawyer's alternate collection — the
    // handler disambiguates, as the original endpoints overlap.
    .route("/{role}/case-query/{cin}", get(cases::query_one::<S>))
    .route("/{role}/cases/{key}", get(cases::list_or_alternate::<S>))
    // Summary sub-resource (resolver fallback path)
    .route("/case/{cin}/summary", get(summaries::list::<S>))
    // Billing (lawyer alternate view)
    .route("/lawyer/bill/{cin}", post(bills::create::<S>))
    .route("/lawyer/bill/{cin}/{bill_id}/clear", put(bills::clear::<S>))
    .with_state(store)
}
