//! Async HTTP client wrapping the Docket JSON API.
//!
//! Implements [`CaseSource`], so the retrieval resolver can run its strategy
//! chain against a remote case repository: transport failures surface as
//! [`Error::Transport`] and become recorded misses rather than aborting the
//! chain.

use std::time::Duration;

use chrono::NaiveDate;
use docket_core::{
  Error, Result,
  calendar::DayOccupancy,
  case::{
    Bill, Case, CasePatch, CaseStatus, Cin, NewCase, Role, Summary,
  },
  resolver::CaseSource,
};
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the Docket API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Opaque role token forwarded as a bearer credential; the server side
  /// resolves it, this client never inspects it.
  pub token:    Option<String>,
}

/// Async HTTP client for the Docket JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

// ─── Response envelopes ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CaseEnvelope {
  case: Case,
}

#[derive(Deserialize)]
struct CasesEnvelope {
  cases: Vec<Case>,
}

#[derive(Deserialize)]
struct DatesEnvelope {
  dates: Vec<DayOccupancy>,
}

#[derive(Deserialize)]
struct SummariesEnvelope {
  summaries: Vec<Summary>,
}

#[derive(Deserialize)]
struct BillEnvelope {
  bill: Bill,
}

#[derive(Deserialize)]
struct MessageEnvelope {
  message: Option<String>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| Error::Transport(format!("failed to build client: {e}")))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send a request and decode the success envelope, mapping HTTP failures
  /// to the core error vocabulary.
  async fn expect<T: serde::de::DeserializeOwned>(
    &self,
    req: reqwest::RequestBuilder,
    what: &str,
  ) -> Result<T> {
    let resp = self
      .auth(req)
      .send()
      .await
      .map_err(|e| Error::Transport(format!("{what}: {e}")))?;

    let status = resp.status();
    if status.is_success() {
      return resp
        .json()
        .await
        .map_err(|e| Error::Transport(format!("decoding {what}: {e}")));
    }

    // The API reports failures as {"message": ...}.
    let message = resp
      .json::<MessageEnvelope>()
      .await
      .ok()
      .and_then(|m| m.message)
      .unwrap_or_else(|| status.to_string());

    if status == reqwest::StatusCode::NOT_FOUND {
      Err(Error::NotFound { last_error: message })
    } else {
      Err(Error::Transport(format!("{what}: {status} - {message}")))
    }
  }

  // ── Registrar mutations ───────────────────────────────────────────────────

  /// `POST /api/registrar/case-creation`
  pub async fn register_case(
    &self,
    case: &NewCase,
    hearing_date: Option<NaiveDate>,
  ) -> Result<Case> {
    let mut body = serde_json::to_value(case)?;
    if let Some(day) = hearing_date {
      body["hearingDate"] = serde_json::to_value(day)?;
    }
    let env: CaseEnvelope = self
      .expect(
        self
          .client
          .post(self.url("/registrar/case-creation"))
          .json(&body),
        "POST /registrar/case-creation",
      )
      .await?;
    Ok(env.case)
  }

  /// `PUT /api/registrar/case-updation/:cin`
  pub async fn update_case(&self, cin: Cin, patch: &CasePatch) -> Result<Case> {
    let env: CaseEnvelope = self
      .expect(
        self
          .client
          .put(self.url(&format!("/registrar/case-updation/{cin}")))
          .json(patch),
        "PUT /registrar/case-updation",
      )
      .await?;
    Ok(env.case)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /api/:role/case-query/:cin`
  pub async fn case_query(&self, role: Role, cin: Cin) -> Result<Case> {
    let path = format!("/{}/case-query/{cin}", role.as_path());
    let env: CaseEnvelope = self
      .expect(self.client.get(self.url(&path)), "GET case-query")
      .await?;
    Ok(env.case)
  }

  /// `GET /api/:role/cases/:status[?date=]`
  pub async fn cases(
    &self,
    role: Role,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> Result<Vec<Case>> {
    let path = format!(
      "/{}/cases/{}",
      role.as_path(),
      status.as_str().to_ascii_lowercase()
    );
    let mut req = self.client.get(self.url(&path));
    if let Some(day) = date {
      req = req.query(&[("date", day.format("%Y-%m-%d").to_string())]);
    }
    let env: CasesEnvelope = self.expect(req, "GET cases").await?;
    Ok(env.cases)
  }

  /// `GET /api/lawyer/cases/:cin` — the billing-augmented representation.
  /// Unknown fields (the bills) are ignored when only the case is wanted.
  pub async fn lawyer_case(&self, cin: Cin) -> Result<Case> {
    let path = format!("/lawyer/cases/{cin}");
    let env: CaseEnvelope = self
      .expect(self.client.get(self.url(&path)), "GET lawyer case")
      .await?;
    Ok(env.case)
  }

  /// `GET /api/registrar/hearing-dates?month=&year=[&exclude=]`
  pub async fn hearing_dates(
    &self,
    month: u32,
    year: i32,
    exclude: Option<Cin>,
  ) -> Result<Vec<DayOccupancy>> {
    let mut req = self
      .client
      .get(self.url("/registrar/hearing-dates"))
      .query(&[("month", month.to_string()), ("year", year.to_string())]);
    if let Some(cin) = exclude {
      req = req.query(&[("exclude", cin.to_string())]);
    }
    let env: DatesEnvelope = self.expect(req, "GET hearing-dates").await?;
    Ok(env.dates)
  }

  /// `GET /api/case/:cin/summary`
  pub async fn summaries(&self, cin: Cin) -> Result<Vec<Summary>> {
    let path = format!("/case/{cin}/summary");
    let env: SummariesEnvelope = self
      .expect(self.client.get(self.url(&path)), "GET summaries")
      .await?;
    Ok(env.summaries)
  }

  // ── Billing ───────────────────────────────────────────────────────────────

  /// `POST /api/lawyer/bill/:cin`
  pub async fn add_bill(&self, cin: Cin, amount: i64) -> Result<Bill> {
    let env: BillEnvelope = self
      .expect(
        self
          .client
          .post(self.url(&format!("/lawyer/bill/{cin}")))
          .json(&serde_json::json!({ "amount": amount })),
        "POST bill",
      )
      .await?;
    Ok(env.bill)
  }

  /// `PUT /api/lawyer/bill/:cin/:bill_id/clear`
  pub async fn clear_bill(&self, cin: Cin, bill_id: Uuid) -> Result<Bill> {
    let env: BillEnvelope = self
      .expect(
        self
          .client
          .put(self.url(&format!("/lawyer/bill/{cin}/{bill_id}/clear"))),
        "PUT bill clear",
      )
      .await?;
    Ok(env.bill)
  }
}

// ─── CaseSource ──────────────────────────────────────────────────────────────

impl CaseSource for ApiClient {
  async fn fetch_case(&self, role: Role, cin: Cin) -> Result<Case> {
    self.case_query(role, cin).await
  }

  async fn fetch_cases(
    &self,
    role: Role,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> Result<Vec<Case>> {
    self.cases(role, status, date).await
  }

  async fn fetch_case_alt(&self, _role: Role, cin: Cin) -> Result<Case> {
    self.lawyer_case(cin).await
  }

  async fn fetch_summaries(&self, cin: Cin) -> Result<Vec<Summary>> {
    self.summaries(cin).await
  }
}
