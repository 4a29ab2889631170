//! Calendar occupancy — a pure read-side projection over hearing records.
//!
//! Occupancy is never persisted as its own truth. A day is occupied iff at
//! least one pending case has a hearing on it dated today-or-later, so any
//! change to a hearing changes the projection on the next read. Past days
//! are always reported free, regardless of stored data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::case::{CaseStatus, Cin, Hearing};

/// One day of the monthly occupancy view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOccupancy {
  pub day:      u32,
  pub occupied: bool,
}

/// Number of days in `month` of `year`; `None` unless `month` is 1-12.
pub fn days_in_month(month: u32, year: i32) -> Option<u32> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next = if month == 12 {
    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
  } else {
    NaiveDate::from_ymd_opt(year, month + 1, 1)?
  };
  Some(next.signed_duration_since(first).num_days() as u32)
}

/// Project the occupancy of every day in `month`/`year` from hearing
/// records, each paired with its owning case's status.
///
/// A day is occupied iff some pending case has a hearing on it dated
/// `today` or later. Hearings belonging to `exclude` are ignored: the
/// editor of that case sees its own current hearing day as free (the day
/// about to be freed by the in-flight update), while every other caller
/// still sees it occupied.
pub fn month_occupancy<'a, I>(
  hearings: I,
  month: u32,
  year: i32,
  today: NaiveDate,
  exclude: Option<Cin>,
) -> Vec<DayOccupancy>
where
  I: IntoIterator<Item = (&'a Hearing, CaseStatus)>,
{
  // An invalid month has no days to project.
  let Some(len) = days_in_month(month, year) else {
    return Vec::new();
  };
  let mut days: Vec<DayOccupancy> = (1..=len)
    .map(|day| DayOccupancy { day, occupied: false })
    .collect();

  for (hearing, status) in hearings {
    if status != CaseStatus::Pending {
      continue;
    }
    if exclude.is_some_and(|cin| cin == hearing.cin) {
      continue;
    }
    let date = hearing.hearing_date;
    if date.month() != month || date.year() != year || date < today {
      continue;
    }
    days[date.day() as usize - 1].occupied = true;
  }

  days
}

/// The earliest hearing dated `today` or later; `None` means the case is
/// not scheduled — callers must report that explicitly, not silently.
pub fn next_hearing_date(
  hearings: &[Hearing],
  today: NaiveDate,
) -> Option<NaiveDate> {
  hearings
    .iter()
    .map(|h| h.hearing_date)
    .filter(|d| *d >= today)
    .min()
}
