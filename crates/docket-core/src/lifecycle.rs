//! The case lifecycle manager — owner of the status state machine and the
//! summary append log.
//!
//! Cases start `Pending` and may transition once, to `Resolved`, which is
//! terminal. Resolving frees the case's active hearing day and the case can
//! never acquire a new one. All mutation is gated on the caller's context:
//! the role and "today" arrive explicitly at every call, never from ambient
//! state.

use chrono::{NaiveDate, Utc};

use crate::{
  Error, Result, calendar,
  case::{Case, CasePatch, CaseStatus, Cin, NewCase, Role},
  scheduler::HearingScheduler,
  store::CaseStore,
};

/// Who is calling, and what day it is. Constructed at the call boundary and
/// threaded through; the core never consults a session or a global clock
/// mid-operation.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
  pub role:  Role,
  pub today: NaiveDate,
}

impl CallContext {
  /// Context for `role` dated today (UTC).
  pub fn new(role: Role) -> Self {
    Self { role, today: Utc::now().date_naive() }
  }

  /// Context with an explicit date — the form tests use.
  pub fn on(role: Role, today: NaiveDate) -> Self {
    Self { role, today }
  }
}

/// Orchestrates case creation and updates over a [`CaseStore`], delegating
/// calendar work to the [`HearingScheduler`].
pub struct LifecycleManager<'a, S> {
  store:     &'a S,
  scheduler: HearingScheduler<'a, S>,
}

impl<'a, S: CaseStore> LifecycleManager<'a, S> {
  pub fn new(store: &'a S) -> Self {
    Self { store, scheduler: HearingScheduler::new(store) }
  }

  /// Register a new case, `Pending`, optionally booking its first hearing.
  ///
  /// Validation (required fields, no past hearing date) happens before any
  /// write. A booking conflict after the case row is written leaves the
  /// case registered without a hearing; the caller re-reads and re-books.
  pub async fn create(
    &self,
    ctx: CallContext,
    new: NewCase,
    hearing_date: Option<NaiveDate>,
  ) -> Result<Case> {
    if ctx.role != Role::Registrar {
      return Err(Error::Validation(
        "only the registrar may register cases".into(),
      ));
    }
    new.validate()?;
    if let Some(day) = hearing_date
      && day < ctx.today
    {
      return Err(Error::InvalidDate(day));
    }

    let mut case = self.store.create_case(new).await.map_err(Into::into)?;

    if let Some(day) = hearing_date {
      let hearing = self
        .scheduler
        .book(case.cin, day, CaseStatus::Pending, ctx.today)
        .await?;
      case.hearings.push(hearing);
    }

    Ok(case)
  }

  /// Apply a [`CasePatch`] to a case.
  ///
  /// The order of operations keeps failures invisible to other readers:
  /// everything is validated against the stored record first, the calendar
  /// change goes through the scheduler (which compensates on failure), and
  /// if a later write fails the hearing change is rescheduled back.
  pub async fn update(
    &self,
    ctx: CallContext,
    cin: Cin,
    patch: CasePatch,
  ) -> Result<Case> {
    let case = self
      .store
      .get_case(cin)
      .await
      .map_err(Into::into)?
      .ok_or(Error::CaseNotFound(cin))?;

    // View-only gate: resolved cases are immutable, and only the registrar
    // mutates at all.
    if ctx.role != Role::Registrar || case.status == CaseStatus::Resolved {
      return Err(Error::ImmutableCase(cin));
    }

    let target = patch.status.unwrap_or(case.status);

    if target == CaseStatus::Pending
      && let Some(day) = patch.next_hearing_date
      && day < ctx.today
    {
      return Err(Error::InvalidDate(day));
    }

    // The day currently held by this case. The caller may name it
    // explicitly; otherwise it is derived from the stored hearings. A day
    // already in the past is history, not an active booking, and is never
    // freed, whatever the caller claims.
    let old = patch
      .old_hearing_date
      .filter(|day| *day >= ctx.today)
      .or_else(|| calendar::next_hearing_date(&case.hearings, ctx.today));

    let (freed, booked) = match target {
      CaseStatus::Resolved => {
        // Resolving frees the active day and never books a new one, even
        // if a date was supplied.
        if let Some(day) = old {
          self.scheduler.free(cin, day).await?;
        }
        (old, None)
      }
      CaseStatus::Pending => {
        // An absent date means "leave the schedule alone", not "unschedule".
        match patch.next_hearing_date {
          Some(day) if Some(day) != old => {
            self
              .scheduler
              .reschedule(cin, old, Some(day), target, ctx.today)
              .await?;
            (old, Some(day))
          }
          _ => (None, None),
        }
      }
    };

    let result = self.apply_record_writes(&case, target, &patch).await;

    if let Err(err) = result {
      // Undo the calendar change so no partial state is observable. If even
      // the undo fails, report both failures rather than leaving the
      // calendar silently inconsistent.
      if (freed.is_some() || booked.is_some())
        && let Err(restore) = self
          .scheduler
          .reschedule(cin, booked, freed, case.status, ctx.today)
          .await
      {
        return Err(Error::Store(format!(
          "failed to restore the hearing schedule after a record write \
           error ({err}): {restore}",
        )));
      }
      return Err(err);
    }

    self
      .store
      .get_case(cin)
      .await
      .map_err(Into::into)?
      .ok_or(Error::CaseNotFound(cin))
  }

  /// The non-calendar writes of an update: status, description, summary.
  async fn apply_record_writes(
    &self,
    case: &Case,
    target: CaseStatus,
    patch: &CasePatch,
  ) -> Result<()> {
    if target != case.status {
      self
        .store
        .set_status(case.cin, target)
        .await
        .map_err(Into::into)?;
    }

    if let Some(description) = &patch.case_description
      && *description != case.case_description
    {
      self
        .store
        .set_description(case.cin, description.clone())
        .await
        .map_err(Into::into)?;
    }

    if let Some(summary) = &patch.summary
      && !summary.trim().is_empty()
    {
      self
        .store
        .append_summary(case.cin, summary.clone())
        .await
        .map_err(Into::into)?;
    }

    Ok(())
  }
}
