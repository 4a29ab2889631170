//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`].

use std::path::Path;

use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use docket_core::{
  calendar::{self, DayOccupancy},
  case::{Bill, Case, CaseStatus, Cin, Hearing, NewCase, Summary},
  store::CaseStore,
};

use crate::{
  Error, Result,
  encode::{
    RawBill, RawCase, RawHearing, RawSummary, encode_day, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Docket case store backed by a single SQLite file.
///
/// Clones share the underlying connection handle.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open the database at `path`, creating it and its schema as needed.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store; the tests run against this.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn case_exists(&self, cin: Cin) -> Result<bool> {
    let cin_str = encode_uuid(cin.as_uuid());
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM cases WHERE cin = ?1",
              rusqlite::params![cin_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── Row loading (runs on the connection thread) ─────────────────────────────

fn read_case_row(
  conn: &rusqlite::Connection,
  cin_str: &str,
) -> rusqlite::Result<Option<RawCase>> {
  conn
    .query_row(
      "SELECT cin, defendant_name, defendant_address, crime_type, crime_date,
              crime_location, arresting_officer, arrest_date, status,
              case_description, created_at
       FROM cases WHERE cin = ?1",
      rusqlite::params![cin_str],
      |row| {
        Ok(RawCase {
          cin:               row.get(0)?,
          defendant_name:    row.get(1)?,
          defendant_address: row.get(2)?,
          crime_type:        row.get(3)?,
          crime_date:        row.get(4)?,
          crime_location:    row.get(5)?,
          arresting_officer: row.get(6)?,
          arrest_date:       row.get(7)?,
          status:            row.get(8)?,
          case_description:  row.get(9)?,
          created_at:        row.get(10)?,
        })
      },
    )
    .optional()
}

fn read_hearing_rows(
  conn: &rusqlite::Connection,
  cin_str: &str,
) -> rusqlite::Result<Vec<RawHearing>> {
  let mut stmt = conn.prepare(
    "SELECT cin, hearing_date, scheduled_at FROM hearings
     WHERE cin = ?1 ORDER BY hearing_date",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![cin_str], |row| {
      Ok(RawHearing {
        cin:          row.get(0)?,
        hearing_date: row.get(1)?,
        scheduled_at: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_summary_rows(
  conn: &rusqlite::Connection,
  cin_str: &str,
) -> rusqlite::Result<Vec<RawSummary>> {
  let mut stmt = conn.prepare(
    "SELECT content, created_at FROM summaries
     WHERE cin = ?1 ORDER BY created_at",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![cin_str], |row| {
      Ok(RawSummary {
        content:    row.get(0)?,
        created_at: row.get(1)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

type RawCaseBundle = (RawCase, Vec<RawHearing>, Vec<RawSummary>);

fn load_case_bundle(
  conn: &rusqlite::Connection,
  cin_str: &str,
) -> rusqlite::Result<Option<RawCaseBundle>> {
  let Some(raw) = read_case_row(conn, cin_str)? else {
    return Ok(None);
  };
  let hearings = read_hearing_rows(conn, cin_str)?;
  let summaries = read_summary_rows(conn, cin_str)?;
  Ok(Some((raw, hearings, summaries)))
}

fn decode_bundle(bundle: RawCaseBundle) -> Result<Case> {
  let (raw, hearings, summaries) = bundle;
  let hearings = hearings
    .into_iter()
    .map(RawHearing::into_hearing)
    .collect::<Result<Vec<_>>>()?;
  let summaries = summaries
    .into_iter()
    .map(RawSummary::into_summary)
    .collect::<Result<Vec<_>>>()?;
  raw.into_case(hearings, summaries)
}

/// Outcome of the transactional booking attempt, carried out of the
/// connection closure so the domain error is raised on the caller side.
enum BookOutcome {
  Booked,
  Conflict,
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Cases ─────────────────────────────────────────────────────────────────

  async fn create_case(&self, new: NewCase) -> Result<Case> {
    let case = Case {
      cin: Cin::new(),
      defendant_name: new.defendant_name,
      defendant_address: new.defendant_address,
      crime_type: new.crime_type,
      crime_date: new.crime_date,
      crime_location: new.crime_location,
      arresting_officer: new.arresting_officer,
      arrest_date: new.arrest_date,
      status: CaseStatus::Pending,
      case_description: new.case_description,
      hearings: Vec::new(),
      summaries: Vec::new(),
      created_at: Utc::now(),
    };

    let cin_str = encode_uuid(case.cin.as_uuid());
    let crime_date_str = encode_day(case.crime_date);
    let arrest_date_str = encode_day(case.arrest_date);
    let status_str = encode_status(case.status).to_owned();
    let created_at_str = encode_dt(case.created_at);
    let fields = (
      case.defendant_name.clone(),
      case.defendant_address.clone(),
      case.crime_type.clone(),
      case.crime_location.clone(),
      case.arresting_officer.clone(),
      case.case_description.clone(),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cases (
             cin, defendant_name, defendant_address, crime_type, crime_date,
             crime_location, arresting_officer, arrest_date, status,
             case_description, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            cin_str,
            fields.0,
            fields.1,
            fields.2,
            crime_date_str,
            fields.3,
            fields.4,
            arrest_date_str,
            status_str,
            fields.5,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(case)
  }

  async fn get_case(&self, cin: Cin) -> Result<Option<Case>> {
    let cin_str = encode_uuid(cin.as_uuid());

    let bundle = self
      .conn
      .call(move |conn| Ok(load_case_bundle(conn, &cin_str)?))
      .await?;

    bundle.map(decode_bundle).transpose()
  }

  async fn list_cases(
    &self,
    status: CaseStatus,
    date: Option<NaiveDate>,
  ) -> Result<Vec<Case>> {
    let status_str = encode_status(status).to_owned();
    let date_str = date.map(encode_day);

    let bundles: Vec<RawCaseBundle> = self
      .conn
      .call(move |conn| {
        let cins: Vec<String> = if let Some(day) = date_str {
          let mut stmt = conn.prepare(
            "SELECT cin FROM cases
             WHERE status = ?1
               AND EXISTS (SELECT 1 FROM hearings h
                           WHERE h.cin = cases.cin AND h.hearing_date = ?2)
             ORDER BY created_at",
          )?;
          stmt
            .query_map(rusqlite::params![status_str, day], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT cin FROM cases WHERE status = ?1 ORDER BY created_at",
          )?;
          stmt
            .query_map(rusqlite::params![status_str], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut bundles = Vec::with_capacity(cins.len());
        for cin_str in cins {
          if let Some(bundle) = load_case_bundle(conn, &cin_str)? {
            bundles.push(bundle);
          }
        }
        Ok(bundles)
      })
      .await?;

    bundles.into_iter().map(decode_bundle).collect()
  }

  async fn set_status(&self, cin: Cin, status: CaseStatus) -> Result<()> {
    let cin_str = encode_uuid(cin.as_uuid());
    let status_str = encode_status(status).to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cases SET status = ?2 WHERE cin = ?1",
          rusqlite::params![cin_str, status_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(docket_core::Error::CaseNotFound(cin)));
    }
    Ok(())
  }

  async fn set_description(&self, cin: Cin, description: String) -> Result<()> {
    let cin_str = encode_uuid(cin.as_uuid());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cases SET case_description = ?2 WHERE cin = ?1",
          rusqlite::params![cin_str, description],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(docket_core::Error::CaseNotFound(cin)));
    }
    Ok(())
  }

  // ── Hearings ──────────────────────────────────────────────────────────────

  async fn book_hearing(
    &self,
    cin: Cin,
    day: NaiveDate,
    today: NaiveDate,
  ) -> Result<Hearing> {
    if !self.case_exists(cin).await? {
      return Err(Error::Core(docket_core::Error::CaseNotFound(cin)));
    }

    let hearing = Hearing {
      cin,
      hearing_date: day,
      scheduled_at: Utc::now(),
    };

    let cin_str = encode_uuid(cin.as_uuid());
    let day_str = encode_day(day);
    let today_str = encode_day(today);
    let at_str = encode_dt(hearing.scheduled_at);

    // Conflict check and insert commit together: two bookings racing for
    // the same free day serialise here, and exactly one sees it free.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let held: bool = tx
          .query_row(
            "SELECT 1 FROM hearings h
             JOIN cases c ON c.cin = h.cin
             WHERE h.hearing_date = ?1
               AND h.cin != ?2
               AND c.status = 'PENDING'
               AND h.hearing_date >= ?3
             LIMIT 1",
            rusqlite::params![day_str, cin_str, today_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if held {
          return Ok(BookOutcome::Conflict);
        }

        tx.execute(
          "INSERT OR REPLACE INTO hearings (cin, hearing_date, scheduled_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![cin_str, day_str, at_str],
        )?;
        tx.commit()?;
        Ok(BookOutcome::Booked)
      })
      .await?;

    match outcome {
      BookOutcome::Booked => Ok(hearing),
      BookOutcome::Conflict => {
        Err(Error::Core(docket_core::Error::DateConflict(day)))
      }
    }
  }

  async fn free_hearing(&self, cin: Cin, day: NaiveDate) -> Result<()> {
    let cin_str = encode_uuid(cin.as_uuid());
    let day_str = encode_day(day);

    // Deliberately not an error when no row matches.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM hearings WHERE cin = ?1 AND hearing_date = ?2",
          rusqlite::params![cin_str, day_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Summaries ─────────────────────────────────────────────────────────────

  async fn append_summary(&self, cin: Cin, content: String) -> Result<Summary> {
    if !self.case_exists(cin).await? {
      return Err(Error::Core(docket_core::Error::CaseNotFound(cin)));
    }

    let summary = Summary {
      content,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(Uuid::new_v4());
    let cin_str = encode_uuid(cin.as_uuid());
    let content_str = summary.content.clone();
    let at_str = encode_dt(summary.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO summaries (summary_id, cin, content, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, cin_str, content_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(summary)
  }

  async fn get_summaries(&self, cin: Cin) -> Result<Vec<Summary>> {
    let cin_str = encode_uuid(cin.as_uuid());

    let raws = self
      .conn
      .call(move |conn| Ok(read_summary_rows(conn, &cin_str)?))
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  // ── Calendar projection ───────────────────────────────────────────────────

  async fn occupied_days(
    &self,
    month: u32,
    year: i32,
    today: NaiveDate,
    exclude: Option<Cin>,
  ) -> Result<Vec<DayOccupancy>> {
    let range = NaiveDate::from_ymd_opt(year, month, 1).and_then(|first| {
      let last = first.with_day(calendar::days_in_month(month, year)?)?;
      Some((first, last))
    });
    let Some((first, last)) = range else {
      return Err(Error::Core(docket_core::Error::Validation(format!(
        "invalid month: {month}/{year}"
      ))));
    };
    let from_str = encode_day(first);
    let to_str = encode_day(last);

    let rows: Vec<(RawHearing, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT h.cin, h.hearing_date, h.scheduled_at, c.status
           FROM hearings h
           JOIN cases c ON c.cin = h.cin
           WHERE h.hearing_date BETWEEN ?1 AND ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], |row| {
            Ok((
              RawHearing {
                cin:          row.get(0)?,
                hearing_date: row.get(1)?,
                scheduled_at: row.get(2)?,
              },
              row.get::<_, String>(3)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut hearings = Vec::with_capacity(rows.len());
    for (raw, status) in rows {
      hearings.push((raw.into_hearing()?, crate::encode::decode_status(&status)?));
    }

    Ok(calendar::month_occupancy(
      hearings.iter().map(|(h, s)| (h, *s)),
      month,
      year,
      today,
      exclude,
    ))
  }

  // ── Billing ───────────────────────────────────────────────────────────────

  async fn get_bills(&self, cin: Cin) -> Result<Vec<Bill>> {
    let cin_str = encode_uuid(cin.as_uuid());

    let raws: Vec<RawBill> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT bill_id, cin, amount, paid, issued_at FROM bills
           WHERE cin = ?1 ORDER BY issued_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cin_str], |row| {
            Ok(RawBill {
              bill_id:   row.get(0)?,
              cin:       row.get(1)?,
              amount:    row.get(2)?,
              paid:      row.get(3)?,
              issued_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBill::into_bill).collect()
  }

  async fn add_bill(&self, cin: Cin, amount: i64) -> Result<Bill> {
    if !self.case_exists(cin).await? {
      return Err(Error::Core(docket_core::Error::CaseNotFound(cin)));
    }

    let bill = Bill {
      bill_id: Uuid::new_v4(),
      cin,
      amount,
      paid: false,
      issued_at: Utc::now(),
    };

    let id_str = encode_uuid(bill.bill_id);
    let cin_str = encode_uuid(cin.as_uuid());
    let at_str = encode_dt(bill.issued_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bills (bill_id, cin, amount, paid, issued_at)
           VALUES (?1, ?2, ?3, 0, ?4)",
          rusqlite::params![id_str, cin_str, amount, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(bill)
  }

  async fn clear_bill(&self, cin: Cin, bill_id: Uuid) -> Result<Bill> {
    let id_str = encode_uuid(bill_id);
    let cin_str = encode_uuid(cin.as_uuid());

    let raw: Option<RawBill> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE bills SET paid = 1 WHERE bill_id = ?1 AND cin = ?2",
          rusqlite::params![id_str, cin_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT bill_id, cin, amount, paid, issued_at FROM bills
               WHERE bill_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawBill {
                  bill_id:   row.get(0)?,
                  cin:       row.get(1)?,
                  amount:    row.get(2)?,
                  paid:      row.get(3)?,
                  issued_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(docket_core::Error::BillNotFound(bill_id)))?
      .into_bill()
  }
}
