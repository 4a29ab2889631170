//! The `CaseStore` trait and its contract.
//!
//! The trait is implemented by storage backends (e.g. `docket-store-sqlite`).
//! Higher layers (`docket-api`, the lifecycle manager, the scheduler) depend
//! on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  calendar::DayOccupancy,
  case::{Bill, Case, CaseStatus, Cin, Hearing, NewCase, Summary},
};

/// Abstraction over a Docket case store backend.
///
/// Hearing and summary histories are append-only views: a summary is never
/// updated in place, and past hearings are never deleted. The only hearing
/// removal is [`free_hearing`](CaseStore::free_hearing), which releases the
/// single active (future) booking of a case.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Cases ─────────────────────────────────────────────────────────────

  /// Register a new case: the store assigns the CIN and `created_at`, and
  /// the case starts `Pending`.
  fn create_case(
    &self,
    new: NewCase,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  /// Retrieve a case with its hearing and summary histories embedded.
  /// Returns `None` if not found.
  fn get_case(
    &self,
    cin: Cin,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// List cases with the given status; when `date` is set, only cases with
  /// a hearing on that exact day are returned.
  fn list_cases(
    &self,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  fn set_status(
    &self,
    cin: Cin,
    status: CaseStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_description(
    &self,
    cin: Cin,
    description: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Hearings ──────────────────────────────────────────────────────────

  /// Book a hearing for `cin` on `day`.
  ///
  /// The conflict check and the insert must commit together: when another
  /// pending case holds an active hearing (dated `today` or later) on
  /// `day`, the booking fails with
  /// [`DateConflict`](crate::Error::DateConflict) and nothing is written.
  /// Two racing bookings for the same free day must serialise so that
  /// exactly one succeeds.
  fn book_hearing(
    &self,
    cin: Cin,
    day: NaiveDate,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Hearing, Self::Error>> + Send + '_;

  /// Release the hearing held by `cin` on `day`. Idempotent: freeing a day
  /// that `cin` does not hold is a no-op, not an error.
  fn free_hearing(
    &self,
    cin: Cin,
    day: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Summaries ─────────────────────────────────────────────────────────

  /// Append a summary record; the store assigns `created_at`. Prior
  /// summaries are never touched.
  fn append_summary(
    &self,
    cin: Cin,
    content: String,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  fn get_summaries(
    &self,
    cin: Cin,
  ) -> impl Future<Output = Result<Vec<Summary>, Self::Error>> + Send + '_;

  // ── Calendar projection ───────────────────────────────────────────────

  /// Occupancy for every day of `month`/`year`, in day order, computed
  /// from hearing records on each call (see [`crate::calendar`]). Hearings
  /// of `exclude` are masked out for the caller editing that case.
  fn occupied_days(
    &self,
    month: u32,
    year: i32,
    today: NaiveDate,
    exclude: Option<Cin>,
  ) -> impl Future<Output = Result<Vec<DayOccupancy>, Self::Error>> + Send + '_;

  // ── Billing (lawyer-scoped alternate view) ────────────────────────────

  fn get_bills(
    &self,
    cin: Cin,
  ) -> impl Future<Output = Result<Vec<Bill>, Self::Error>> + Send + '_;

  fn add_bill(
    &self,
    cin: Cin,
    amount: i64,
  ) -> impl Future<Output = Result<Bill, Self::Error>> + Send + '_;

  /// Mark a bill paid. Fails if the bill does not belong to `cin`.
  fn clear_bill(
    &self,
    cin: Cin,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Bill, Self::Error>> + Send + '_;
}
