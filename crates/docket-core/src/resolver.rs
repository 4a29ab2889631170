//! Multi-strategy case retrieval.
//!
//! A caller may not know which role-scoped collection a case lives in. The
//! resolver tries an ordered list of lookup strategies against a
//! [`CaseSource`], stopping at the first hit. Every miss is recorded and
//! never aborts the chain; only exhausting all strategies yields
//! [`Error::NotFound`], carrying the last recorded reason.

use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Error, Result, calendar,
  case::{Case, CaseStatus, Cin, Role, Summary},
  store::CaseStore,
};

// ─── Source ──────────────────────────────────────────────────────────────────

/// Role-scoped read access to the case repository, as seen by the resolver.
///
/// Implemented over HTTP by `docket-client`, and for any [`CaseStore`] by
/// the [`StoreSource`] adapter (the local backend exposes one collection per
/// role, so the role only partitions remote endpoint families).
pub trait CaseSource: Send + Sync {
  /// Role-specific direct lookup by CIN.
  fn fetch_case(
    &self,
    role: Role,
    cin: Cin,
  ) -> impl Future<Output = Result<Case>> + Send + '_;

  /// Role-specific listing filtered by status (and day, when given).
  fn fetch_cases(
    &self,
    role: Role,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<Case>>> + Send + '_;

  /// The role's alternate collection for the same case — e.g. the lawyer
  /// endpoint that returns the billing-augmented representation.
  fn fetch_case_alt(
    &self,
    role: Role,
    cin: Cin,
  ) -> impl Future<Output = Result<Case>> + Send + '_;

  /// Summary sub-resource, used when a fetched case does not embed its
  /// summaries.
  fn fetch_summaries(
    &self,
    cin: Cin,
  ) -> impl Future<Output = Result<Vec<Summary>>> + Send + '_;
}

/// Adapts any [`CaseStore`] into a [`CaseSource`], ignoring the role.
pub struct StoreSource<'a, S>(pub &'a S);

impl<S: CaseStore + Sync> CaseSource for StoreSource<'_, S> {
  async fn fetch_case(&self, _role: Role, cin: Cin) -> Result<Case> {
    match self.0.get_case(cin).await {
      Ok(Some(case)) => Ok(case),
      Ok(None) => Err(Error::CaseNotFound(cin)),
      Err(err) => Err(err.into()),
    }
  }

  async fn fetch_cases(
    &self,
    _role: Role,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> Result<Vec<Case>> {
    self.0.list_cases(status, date).await.map_err(Into::into)
  }

  async fn fetch_case_alt(&self, role: Role, cin: Cin) -> Result<Case> {
    // The local store keeps a single representation per case.
    self.fetch_case(role, cin).await
  }

  async fn fetch_summaries(&self, cin: Cin) -> Result<Vec<Summary>> {
    self.0.get_summaries(cin).await.map_err(Into::into)
  }
}

// ─── Request & result ────────────────────────────────────────────────────────

/// What to resolve: a direct CIN, or a (status, date) filter — always with
/// the caller's role, supplied explicitly.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
  pub role:   Role,
  pub cin:    Option<Cin>,
  pub status: Option<CaseStatus>,
  pub date:   Option<NaiveDate>,
}

impl ResolveRequest {
  pub fn by_cin(role: Role, cin: Cin) -> Self {
    Self { role, cin: Some(cin), status: None, date: None }
  }

  pub fn by_filter(
    role: Role,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> Self {
    Self { role, cin: None, status: Some(status), date }
  }

  /// Lawyers see only resolved cases unless they ask otherwise; everyone
  /// else defaults to the pending docket.
  fn effective_status(&self) -> CaseStatus {
    self.status.unwrap_or(match self.role {
      Role::Lawyer => CaseStatus::Resolved,
      _ => CaseStatus::Pending,
    })
  }
}

/// A normalised retrieval result: the case, its current summary (latest
/// `created_at`), and its next hearing (earliest future date). A `None`
/// next hearing means the case is not scheduled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCase {
  pub case:            Case,
  pub current_summary: Option<Summary>,
  pub next_hearing:    Option<NaiveDate>,
}

impl ResolvedCase {
  /// Human-readable schedule, with absence reported explicitly.
  pub fn schedule_label(&self) -> String {
    match self.next_hearing {
      Some(day) => day.format("%Y-%m-%d").to_string(),
      None => "not scheduled".to_string(),
    }
  }
}

// ─── Strategy chain ──────────────────────────────────────────────────────────

/// The uniform outcome of one lookup strategy.
enum Probe {
  Found(Vec<Case>),
  Miss(String),
}

/// The ordered strategies. Which of them apply depends on the request: a
/// direct lookup needs a CIN, the alternate collection exists for lawyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
  Direct,
  Listing,
  Alternate,
}

/// Resolves cases by folding the strategy list left-to-right,
/// short-circuiting on the first non-empty result.
pub struct CaseResolver<'a, S> {
  source: &'a S,
}

impl<'a, S: CaseSource> CaseResolver<'a, S> {
  pub fn new(source: &'a S) -> Self { Self { source } }

  /// Run the chain for `request` and normalise every hit.
  ///
  /// Results are sorted ascending by next hearing date, unscheduled cases
  /// last.
  pub async fn resolve(
    &self,
    request: &ResolveRequest,
    today: NaiveDate,
  ) -> Result<Vec<ResolvedCase>> {
    let mut last_miss = String::from("no applicable retrieval strategy");

    for strategy in self.strategies(request) {
      match self.probe(strategy, request).await {
        Probe::Found(cases) => {
          let mut resolved = Vec::with_capacity(cases.len());
          for case in cases {
            resolved.push(self.normalize(case, today).await);
          }
          resolved.sort_by_key(|r| (r.next_hearing.is_none(), r.next_hearing));
          return Ok(resolved);
        }
        Probe::Miss(reason) => last_miss = reason,
      }
    }

    Err(Error::NotFound { last_error: last_miss })
  }

  fn strategies(&self, request: &ResolveRequest) -> Vec<Strategy> {
    let mut chain = Vec::new();
    if request.cin.is_some() {
      chain.push(Strategy::Direct);
    }
    chain.push(Strategy::Listing);
    if request.role == Role::Lawyer && request.cin.is_some() {
      chain.push(Strategy::Alternate);
    }
    chain
  }

  async fn probe(
    &self,
    strategy: Strategy,
    request: &ResolveRequest,
  ) -> Probe {
    match strategy {
      Strategy::Direct => {
        let cin = request.cin.expect("Direct requires a cin");
        match self.source.fetch_case(request.role, cin).await {
          Ok(case) => Probe::Found(vec![case]),
          Err(err) => Probe::Miss(err.to_string()),
        }
      }
      Strategy::Listing => {
        let status = request.effective_status();
        match self
          .source
          .fetch_cases(request.role, status, request.date)
          .await
        {
          Ok(cases) => match request.cin {
            // Scan the listing for the CIN we are after.
            Some(cin) => {
              match cases.into_iter().find(|c| c.cin == cin) {
                Some(case) => Probe::Found(vec![case]),
                None => Probe::Miss(format!(
                  "case {cin} not in the {status} listing"
                )),
              }
            }
            None if cases.is_empty() => {
              Probe::Miss(format!("no {status} cases matched"))
            }
            None => Probe::Found(cases),
          },
          Err(err) => Probe::Miss(err.to_string()),
        }
      }
      Strategy::Alternate => {
        let cin = request.cin.expect("Alternate requires a cin");
        match self.source.fetch_case_alt(request.role, cin).await {
          Ok(case) => Probe::Found(vec![case]),
          Err(err) => Probe::Miss(err.to_string()),
        }
      }
    }
  }

  /// Annotate a case with its current summary and next hearing date.
  async fn normalize(&self, case: Case, today: NaiveDate) -> ResolvedCase {
    let mut summaries = case.summaries.clone();
    if summaries.is_empty() {
      // Secondary fetch through the summary sub-resource; a miss here just
      // leaves the case without a current summary.
      summaries = self
        .source
        .fetch_summaries(case.cin)
        .await
        .unwrap_or_default();
    }
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let current_summary = summaries.into_iter().next();

    let next_hearing = calendar::next_hearing_date(&case.hearings, today);

    ResolvedCase { case, current_summary, next_hearing }
  }
}
