//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar days as `YYYY-MM-DD`,
//! and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use docket_core::case::{Case, CaseStatus, Cin, Hearing, Summary};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_day(day: NaiveDate) -> String {
  day.format("%Y-%m-%d").to_string()
}

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── CaseStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(status: CaseStatus) -> &'static str { status.as_str() }

pub fn decode_status(s: &str) -> Result<CaseStatus> {
  match s {
    "PENDING" => Ok(CaseStatus::Pending),
    "RESOLVED" => Ok(CaseStatus::Resolved),
    other => Err(Error::Decode(format!("unknown case status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `cases` row.
pub struct RawCase {
  pub cin:               String,
  pub defendant_name:    String,
  pub defendant_address: String,
  pub crime_type:        String,
  pub crime_date:        String,
  pub crime_location:    String,
  pub arresting_officer: String,
  pub arrest_date:       String,
  pub status:            String,
  pub case_description:  String,
  pub created_at:        String,
}

impl RawCase {
  /// Decode into a [`Case`]; hearing and summary histories are attached by
  /// the caller.
  pub fn into_case(
    self,
    hearings: Vec<Hearing>,
    summaries: Vec<Summary>,
  ) -> Result<Case> {
    Ok(Case {
      cin: Cin::from(decode_uuid(&self.cin)?),
      defendant_name: self.defendant_name,
      defendant_address: self.defendant_address,
      crime_type: self.crime_type,
      crime_date: decode_day(&self.crime_date)?,
      crime_location: self.crime_location,
      arresting_officer: self.arresting_officer,
      arrest_date: decode_day(&self.arrest_date)?,
      status: decode_status(&self.status)?,
      case_description: self.case_description,
      hearings,
      summaries,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `hearings` row.
pub struct RawHearing {
  pub cin:          String,
  pub hearing_date: String,
  pub scheduled_at: String,
}

impl RawHearing {
  pub fn into_hearing(self) -> Result<Hearing> {
    Ok(Hearing {
      cin:          Cin::from(decode_uuid(&self.cin)?),
      hearing_date: decode_day(&self.hearing_date)?,
      scheduled_at: decode_dt(&self.scheduled_at)?,
    })
  }
}

/// Raw strings read directly from a `summaries` row.
pub struct RawSummary {
  pub content:    String,
  pub created_at: String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<Summary> {
    Ok(Summary {
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `bills` row.
pub struct RawBill {
  pub bill_id:   String,
  pub cin:       String,
  pub amount:    i64,
  pub paid:      bool,
  pub issued_at: String,
}

impl RawBill {
  pub fn into_bill(self) -> Result<docket_core::case::Bill> {
    Ok(docket_core::case::Bill {
      bill_id:   decode_uuid(&self.bill_id)?,
      cin:       Cin::from(decode_uuid(&self.cin)?),
      amount:    self.amount,
      paid:      self.paid,
      issued_at: decode_dt(&self.issued_at)?,
    })
  }
}
