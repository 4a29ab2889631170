//! Hearing scheduling against the shared monthly calendar.
//!
//! The scheduler owns the no-past-date rule and the free-then-book
//! composition. Day mutual exclusion itself lives in the store's
//! [`book_hearing`](crate::store::CaseStore::book_hearing) contract; there
//! is no locking primitive at this layer.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  case::{CaseStatus, Cin, Hearing},
  store::CaseStore,
};

/// Books and frees calendar days on behalf of a case.
pub struct HearingScheduler<'a, S> {
  store: &'a S,
}

impl<'a, S: CaseStore> HearingScheduler<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Book `day` for `cin`.
  ///
  /// Fails with [`Error::InvalidDate`] when `day` precedes `today` and the
  /// case's resulting status is `Pending`; fails with
  /// [`Error::DateConflict`] when another case holds the day.
  pub async fn book(
    &self,
    cin: Cin,
    day: NaiveDate,
    status: CaseStatus,
    today: NaiveDate,
  ) -> Result<Hearing> {
    if status == CaseStatus::Pending && day < today {
      return Err(Error::InvalidDate(day));
    }
    self
      .store
      .book_hearing(cin, day, today)
      .await
      .map_err(Into::into)
  }

  /// Release `day` if `cin` holds it. Idempotent.
  pub async fn free(&self, cin: Cin, day: NaiveDate) -> Result<()> {
    self.store.free_hearing(cin, day).await.map_err(Into::into)
  }

  /// Move a case's booking from `old` to `new` as one logical operation.
  ///
  /// `old == new` is a no-op: the day is never transiently freed only to
  /// fail the re-book. When the booking of `new` fails after `old` was
  /// freed, the old booking is restored before the error is surfaced, so
  /// the day is not silently lost. Within one call, the free is always
  /// issued before the book.
  pub async fn reschedule(
    &self,
    cin: Cin,
    old: Option<NaiveDate>,
    new: Option<NaiveDate>,
    status: CaseStatus,
    today: NaiveDate,
  ) -> Result<Option<Hearing>> {
    if old == new {
      return Ok(None);
    }

    if let Some(day) = old {
      self.free(cin, day).await?;
    }

    let Some(day) = new else { return Ok(None) };

    match self.book(cin, day, status, today).await {
      Ok(hearing) => Ok(Some(hearing)),
      Err(err) => {
        if let Some(prev) = old {
          // Compensation: put the original booking back. The day was ours a
          // moment ago, so a conflict here is unexpected.
          if let Err(restore) = self.store.book_hearing(cin, prev, today).await
          {
            let restore: Error = restore.into();
            return Err(Error::Store(format!(
              "failed to restore hearing on {prev} after booking error \
               ({err}): {restore}",
            )));
          }
        }
        Err(err)
      }
    }
  }
}
