//! Case records and their satellite types.
//!
//! A case owns two append-only histories: its hearings (past hearings are
//! retained forever, never deleted) and its summaries (each update that
//! supplies new summary text appends a record). The record itself is mutated
//! only through the lifecycle manager.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Case Identification Number — assigned once at registration, never
/// reassigned, never reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cin(Uuid);

impl Cin {
  /// Mint a fresh CIN. Only stores should call this, at case creation.
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for Cin {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for Cin {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for Cin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for Cin {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self(Uuid::parse_str(s)?))
  }
}

// ─── Status & roles ──────────────────────────────────────────────────────────

/// The two-state case machine. `Resolved` is terminal — there is no
/// transition out of it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseStatus {
  #[default]
  Pending,
  Resolved,
}

impl CaseStatus {
  /// The discriminant stored in the `status` column and used in URL paths.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "PENDING",
      Self::Resolved => "RESOLVED",
    }
  }
}

impl fmt::Display for CaseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CaseStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_uppercase().as_str() {
      "PENDING" => Ok(Self::Pending),
      "RESOLVED" => Ok(Self::Resolved),
      other => Err(Error::Validation(format!("unknown case status: {other}"))),
    }
  }
}

/// The caller's scope. An opaque token supplier furnishes this; the core
/// uses it only to select which role-scoped endpoint family to call, and to
/// gate mutation (only the registrar mutates).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
  Registrar,
  Judge,
  Lawyer,
}

impl Role {
  /// Lowercase form used as the URL path segment (`/registrar/...`).
  pub fn as_path(&self) -> &'static str {
    match self {
      Self::Registrar => "registrar",
      Self::Judge => "judge",
      Self::Lawyer => "lawyer",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "registrar" => Ok(Self::Registrar),
      "judge" => Ok(Self::Judge),
      "lawyer" => Ok(Self::Lawyer),
      other => Err(Error::Validation(format!("unknown role: {other}"))),
    }
  }
}

// ─── Satellite records ───────────────────────────────────────────────────────

/// A scheduled court appearance. Past hearings are history; only a hearing
/// dated today-or-later counts towards calendar occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
  pub cin:          Cin,
  pub hearing_date: NaiveDate,
  pub scheduled_at: DateTime<Utc>,
}

/// A narrative summary entry. Append-only: the "current" summary is the one
/// with the latest `created_at`, and prior entries are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

/// A fee record attached to a case — the lawyer-scoped alternate view of a
/// case carries these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
  pub bill_id:   Uuid,
  pub cin:       Cin,
  /// Minor currency units.
  pub amount:    i64,
  pub paid:      bool,
  pub issued_at: DateTime<Utc>,
}

// ─── Case ────────────────────────────────────────────────────────────────────

/// A judicial case record, with its hearing and summary histories embedded.
/// Owned exclusively by the case store; mutated only through the lifecycle
/// manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
  pub cin:               Cin,
  pub defendant_name:    String,
  pub defendant_address: String,
  pub crime_type:        String,
  pub crime_date:        NaiveDate,
  pub crime_location:    String,
  pub arresting_officer: String,
  pub arrest_date:       NaiveDate,
  pub status:            CaseStatus,
  #[serde(default)]
  pub case_description:  String,
  #[serde(default)]
  pub hearings:          Vec<Hearing>,
  #[serde(default)]
  pub summaries:         Vec<Summary>,
  pub created_at:        DateTime<Utc>,
}

// ─── NewCase ─────────────────────────────────────────────────────────────────

/// Input to case registration. The CIN, status (`Pending`), and `created_at`
/// are assigned by the store, never accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
  pub defendant_name:    String,
  pub defendant_address: String,
  pub crime_type:        String,
  pub crime_date:        NaiveDate,
  pub crime_location:    String,
  pub arresting_officer: String,
  pub arrest_date:       NaiveDate,
  #[serde(default)]
  pub case_description:  String,
}

impl NewCase {
  /// Check that every required free-text field is present and non-blank.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("defendantName", &self.defendant_name),
      ("defendantAddress", &self.defendant_address),
      ("crimeType", &self.crime_type),
      ("crimeLocation", &self.crime_location),
      ("arrestingOfficer", &self.arresting_officer),
    ];
    let missing: Vec<&str> = required
      .iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(name, _)| *name)
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(format!(
        "missing required fields: {}",
        missing.join(", ")
      )))
    }
  }
}

// ─── CasePatch ───────────────────────────────────────────────────────────────

/// Input to a lifecycle update. Every field is optional; absent fields leave
/// the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePatch {
  pub status:            Option<CaseStatus>,
  /// Non-empty text appends a new [`Summary`]; it never overwrites one.
  pub summary:           Option<String>,
  pub next_hearing_date: Option<NaiveDate>,
  /// The hearing day currently held by the case, to be freed when the date
  /// changes. When absent, the store's view of the next hearing is used.
  pub old_hearing_date:  Option<NaiveDate>,
  pub case_description:  Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_case() -> NewCase {
    NewCase {
      defendant_name:    "J. Doe".into(),
      defendant_address: "14 Court Lane".into(),
      crime_type:        "burglary".into(),
      crime_date:        NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
      crime_location:    "Dockside".into(),
      arresting_officer: "Off. Reyes".into(),
      arrest_date:       NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
      case_description:  String::new(),
    }
  }

  #[test]
  fn validate_accepts_complete_input() {
    assert!(new_case().validate().is_ok());
  }

  #[test]
  fn validate_names_every_missing_field() {
    let mut input = new_case();
    input.defendant_name = "  ".into();
    input.arresting_officer = String::new();

    let err = input.validate().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("defendantName"));
    assert!(msg.contains("arrestingOfficer"));
    assert!(!msg.contains("crimeType"));
  }

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("resolved".parse::<CaseStatus>().unwrap(), CaseStatus::Resolved);
    assert_eq!("PENDING".parse::<CaseStatus>().unwrap(), CaseStatus::Pending);
    assert!("open".parse::<CaseStatus>().is_err());
  }

  #[test]
  fn role_parses_path_segments() {
    assert_eq!("registrar".parse::<Role>().unwrap(), Role::Registrar);
    assert_eq!("LAWYER".parse::<Role>().unwrap(), Role::Lawyer);
    assert!("clerk".parse::<Role>().is_err());
  }
}
