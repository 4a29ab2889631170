//! Integration tests for `SqliteStore` against an in-memory database,
//! including the lifecycle manager and scheduler running on top of it.

use chrono::NaiveDate;
use docket_core::{
  Error as CoreError,
  case::{CasePatch, CaseStatus, Cin, NewCase, Role},
  lifecycle::{CallContext, LifecycleManager},
  resolver::{CaseResolver, ResolveRequest, StoreSource},
  scheduler::HearingScheduler,
  store::CaseStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_case(defendant: &str) -> NewCase {
  NewCase {
    defendant_name:    defendant.into(),
    defendant_address: "14 Court Lane".into(),
    crime_type:        "burglary".into(),
    crime_date:        date(2025, 1, 4),
    crime_location:    "Dockside".into(),
    arresting_officer: "Off. Reyes".into(),
    arrest_date:       date(2025, 1, 5),
    case_description:  String::new(),
  }
}

fn registrar(today: NaiveDate) -> CallContext {
  CallContext::on(Role::Registrar, today)
}

async fn occupied(
  s: &SqliteStore,
  month: u32,
  year: i32,
  today: NaiveDate,
) -> Vec<u32> {
  s.occupied_days(month, year, today, None)
    .await
    .unwrap()
    .into_iter()
    .filter(|d| d.occupied)
    .map(|d| d.day)
    .collect()
}

// ─── Cases ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_case() {
  let s = store().await;

  let case = s.create_case(new_case("J. Doe")).await.unwrap();
  assert_eq!(case.status, CaseStatus::Pending);

  let fetched = s.get_case(case.cin).await.unwrap().unwrap();
  assert_eq!(fetched.cin, case.cin);
  assert_eq!(fetched.defendant_name, "J. Doe");
  assert!(fetched.hearings.is_empty());
  assert!(fetched.summaries.is_empty());
}

#[tokio::test]
async fn get_case_missing_returns_none() {
  let s = store().await;
  assert!(s.get_case(Cin::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn cins_are_unique_across_creations() {
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();
  assert_ne!(a.cin, b.cin);
}

#[tokio::test]
async fn list_cases_filters_by_status_and_date() {
  let s = store().await;
  let today = date(2025, 3, 1);

  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();
  s.book_hearing(b.cin, date(2025, 3, 12), today).await.unwrap();
  s.set_status(b.cin, CaseStatus::Resolved).await.unwrap();

  let pending = s.list_cases(CaseStatus::Pending, None).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].cin, a.cin);

  let on_day = s
    .list_cases(CaseStatus::Pending, Some(date(2025, 3, 10)))
    .await
    .unwrap();
  assert_eq!(on_day.len(), 1);

  let wrong_day = s
    .list_cases(CaseStatus::Pending, Some(date(2025, 3, 11)))
    .await
    .unwrap();
  assert!(wrong_day.is_empty());
}

// ─── Occupancy projection ────────────────────────────────────────────────────

#[tokio::test]
async fn occupancy_counts_distinct_future_days_of_pending_cases() {
  let s = store().await;
  let today = date(2025, 3, 1);

  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();
  s.book_hearing(b.cin, date(2025, 3, 20), today).await.unwrap();

  assert_eq!(occupied(&s, 3, 2025, today).await, vec![10, 20]);
}

#[tokio::test]
async fn past_days_are_reported_free_despite_stored_hearings() {
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), date(2025, 3, 1))
    .await
    .unwrap();

  // Time moves past the hearing; the stored row remains but the day frees.
  assert!(occupied(&s, 3, 2025, date(2025, 3, 11)).await.is_empty());

  let fetched = s.get_case(a.cin).await.unwrap().unwrap();
  assert_eq!(fetched.hearings.len(), 1, "history is retained");
}

#[tokio::test]
async fn editor_sees_own_current_day_free_others_do_not() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();

  let for_editor = s
    .occupied_days(3, 2025, today, Some(a.cin))
    .await
    .unwrap();
  assert!(!for_editor[9].occupied);

  let for_others = s.occupied_days(3, 2025, today, None).await.unwrap();
  assert!(for_others[9].occupied);
}

// ─── Booking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_booking_on_a_taken_day_conflicts() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();

  s.book_hearing(a.cin, date(2025, 4, 1), today).await.unwrap();
  let err = s
    .book_hearing(b.cin, date(2025, 4, 1), today)
    .await
    .unwrap_err();

  match err.into() {
    CoreError::DateConflict(day) => assert_eq!(day, date(2025, 4, 1)),
    other => panic!("expected DateConflict, got {other}"),
  }
}

#[tokio::test]
async fn racing_bookings_for_one_free_day_admit_exactly_one() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();

  let (ra, rb) = tokio::join!(
    s.book_hearing(a.cin, date(2025, 4, 1), today),
    s.book_hearing(b.cin, date(2025, 4, 1), today),
  );

  let successes = [ra.is_ok(), rb.is_ok()];
  assert_eq!(successes.iter().filter(|ok| **ok).count(), 1);
  assert_eq!(occupied(&s, 4, 2025, today).await, vec![1]);
}

#[tokio::test]
async fn booking_a_past_day_for_a_resolved_case_is_allowed_but_not_occupied() {
  // Recording history: a resolved case may carry past hearings without
  // affecting occupancy.
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 2, 10), date(2025, 3, 1))
    .await
    .unwrap();
  s.set_status(a.cin, CaseStatus::Resolved).await.unwrap();

  assert!(occupied(&s, 2, 2025, date(2025, 3, 1)).await.is_empty());
}

#[tokio::test]
async fn free_is_idempotent() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();

  // Freeing a day never booked is a no-op.
  s.free_hearing(a.cin, date(2025, 3, 10)).await.unwrap();

  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();
  s.free_hearing(a.cin, date(2025, 3, 10)).await.unwrap();
  s.free_hearing(a.cin, date(2025, 3, 10)).await.unwrap();

  assert!(occupied(&s, 3, 2025, today).await.is_empty());
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reschedule_to_same_day_is_a_no_op() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();

  let scheduler = HearingScheduler::new(&s);
  let moved = scheduler
    .reschedule(
      a.cin,
      Some(date(2025, 3, 10)),
      Some(date(2025, 3, 10)),
      CaseStatus::Pending,
      today,
    )
    .await
    .unwrap();

  assert!(moved.is_none());
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![10]);
}

#[tokio::test]
async fn reschedule_moves_the_occupied_day() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();

  let scheduler = HearingScheduler::new(&s);
  scheduler
    .reschedule(
      a.cin,
      Some(date(2025, 3, 10)),
      Some(date(2025, 3, 15)),
      CaseStatus::Pending,
      today,
    )
    .await
    .unwrap();

  assert_eq!(occupied(&s, 3, 2025, today).await, vec![15]);
}

#[tokio::test]
async fn failed_rebook_restores_the_old_day() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();
  s.book_hearing(a.cin, date(2025, 3, 10), today).await.unwrap();
  s.book_hearing(b.cin, date(2025, 3, 15), today).await.unwrap();

  let scheduler = HearingScheduler::new(&s);
  let err = scheduler
    .reschedule(
      a.cin,
      Some(date(2025, 3, 10)),
      Some(date(2025, 3, 15)), // taken by b
      CaseStatus::Pending,
      today,
    )
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::DateConflict(_)));
  // The old booking is not silently lost.
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![10, 15]);
}

#[tokio::test]
async fn booking_a_past_day_while_pending_is_invalid() {
  let s = store().await;
  let today = date(2025, 3, 10);
  let a = s.create_case(new_case("A")).await.unwrap();

  let scheduler = HearingScheduler::new(&s);
  let err = scheduler
    .book(a.cin, date(2025, 3, 5), CaseStatus::Pending, today)
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::InvalidDate(_)));
  assert!(occupied(&s, 3, 2025, today).await.is_empty());
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_books_the_first_hearing() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), Some(date(2025, 3, 10)))
    .await
    .unwrap();

  assert_eq!(case.status, CaseStatus::Pending);
  assert_eq!(case.hearings.len(), 1);
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![10]);
}

#[tokio::test]
async fn create_rejects_missing_fields_without_writing() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let mut input = new_case("");
  input.crime_type = String::new();

  let err = manager
    .create(registrar(today), input, Some(date(2025, 3, 10)))
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::Validation(_)));
  assert!(s.list_cases(CaseStatus::Pending, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_past_hearing_date() {
  let s = store().await;
  let manager = LifecycleManager::new(&s);

  let err = manager
    .create(
      registrar(date(2025, 3, 10)),
      new_case("J. Doe"),
      Some(date(2025, 3, 5)),
    )
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::InvalidDate(_)));
}

#[tokio::test]
async fn create_update_resolve_scenario() {
  // Create with hearing 2025-03-10; move to 2025-03-15; resolve.
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), Some(date(2025, 3, 10)))
    .await
    .unwrap();
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![10]);

  manager
    .update(registrar(today), case.cin, CasePatch {
      next_hearing_date: Some(date(2025, 3, 15)),
      old_hearing_date: Some(date(2025, 3, 10)),
      summary: Some("adjourned to the 15th".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![15]);

  manager
    .update(registrar(today), case.cin, CasePatch {
      status: Some(CaseStatus::Resolved),
      summary: Some("verdict entered".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(occupied(&s, 3, 2025, today).await.is_empty());

  let fetched = s.get_case(case.cin).await.unwrap().unwrap();
  assert_eq!(fetched.status, CaseStatus::Resolved);
  assert_eq!(fetched.summaries.len(), 2);
}

#[tokio::test]
async fn update_with_past_date_fails_and_calendar_is_unchanged() {
  let s = store().await;
  let today = date(2025, 3, 12);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), Some(date(2025, 3, 20)))
    .await
    .unwrap();

  let err = manager
    .update(registrar(today), case.cin, CasePatch {
      next_hearing_date: Some(date(2025, 3, 5)),
      ..Default::default()
    })
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::InvalidDate(_)));
  assert_eq!(occupied(&s, 3, 2025, today).await, vec![20]);
}

#[tokio::test]
async fn resolving_with_a_stale_old_date_keeps_hearing_history() {
  let s = store().await;
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(
      registrar(date(2025, 3, 1)),
      new_case("J. Doe"),
      Some(date(2025, 3, 10)),
    )
    .await
    .unwrap();

  // Time moves past the hearing; the caller still names the old day when
  // resolving. The stored row is history now and must survive.
  manager
    .update(registrar(date(2025, 4, 1)), case.cin, CasePatch {
      status: Some(CaseStatus::Resolved),
      old_hearing_date: Some(date(2025, 3, 10)),
      ..Default::default()
    })
    .await
    .unwrap();

  let fetched = s.get_case(case.cin).await.unwrap().unwrap();
  assert_eq!(fetched.status, CaseStatus::Resolved);
  assert_eq!(fetched.hearings.len(), 1, "past hearings are never deleted");
}

#[tokio::test]
async fn resolved_case_rejects_further_updates() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), None)
    .await
    .unwrap();
  manager
    .update(registrar(today), case.cin, CasePatch {
      status: Some(CaseStatus::Resolved),
      ..Default::default()
    })
    .await
    .unwrap();

  let err = manager
    .update(registrar(today), case.cin, CasePatch {
      summary: Some("late addendum".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::ImmutableCase(_)));
  let fetched = s.get_case(case.cin).await.unwrap().unwrap();
  assert!(fetched.summaries.is_empty());
}

#[tokio::test]
async fn non_registrar_roles_cannot_mutate() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), None)
    .await
    .unwrap();

  for role in [Role::Judge, Role::Lawyer] {
    let err = manager
      .update(CallContext::on(role, today), case.cin, CasePatch {
        summary: Some("should not land".into()),
        ..Default::default()
      })
      .await
      .unwrap_err();
    assert!(matches!(err, CoreError::ImmutableCase(_)));
  }
}

#[tokio::test]
async fn resolving_ignores_a_supplied_new_date() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), Some(date(2025, 3, 10)))
    .await
    .unwrap();

  manager
    .update(registrar(today), case.cin, CasePatch {
      status: Some(CaseStatus::Resolved),
      next_hearing_date: Some(date(2025, 3, 25)),
      old_hearing_date: Some(date(2025, 3, 10)),
      ..Default::default()
    })
    .await
    .unwrap();

  // The old day is freed and no new day is acquired.
  assert!(occupied(&s, 3, 2025, today).await.is_empty());
}

// ─── Summaries ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn summaries_append_and_never_mutate() {
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();

  s.append_summary(a.cin, "first".into()).await.unwrap();
  s.append_summary(a.cin, "second".into()).await.unwrap();
  s.append_summary(a.cin, "third".into()).await.unwrap();

  let summaries = s.get_summaries(a.cin).await.unwrap();
  assert_eq!(summaries.len(), 3);
  assert_eq!(summaries[0].content, "first");

  // Current summary is the latest by created_at.
  let current = summaries
    .iter()
    .max_by_key(|sm| sm.created_at)
    .unwrap();
  assert_eq!(current.content, "third");
}

// ─── Retrieval over the local store ──────────────────────────────────────────

#[tokio::test]
async fn resolver_finds_a_case_in_the_local_store() {
  let s = store().await;
  let today = date(2025, 3, 1);
  let manager = LifecycleManager::new(&s);

  let case = manager
    .create(registrar(today), new_case("J. Doe"), Some(date(2025, 3, 10)))
    .await
    .unwrap();
  s.append_summary(case.cin, "opening filed".into()).await.unwrap();

  let source = StoreSource(&s);
  let resolver = CaseResolver::new(&source);
  let found = resolver
    .resolve(&ResolveRequest::by_cin(Role::Judge, case.cin), today)
    .await
    .unwrap();

  assert_eq!(found.len(), 1);
  assert_eq!(found[0].next_hearing, Some(date(2025, 3, 10)));
  assert_eq!(
    found[0].current_summary.as_ref().unwrap().content,
    "opening filed"
  );
}

#[tokio::test]
async fn resolver_exhausts_strategies_for_an_unknown_cin() {
  let s = store().await;
  let source = StoreSource(&s);
  let resolver = CaseResolver::new(&source);

  let err = resolver
    .resolve(
      &ResolveRequest::by_cin(Role::Judge, Cin::new()),
      date(2025, 3, 1),
    )
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::NotFound { .. }));
}

// ─── Billing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bills_attach_to_a_case_and_clear_to_paid() {
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();

  let bill = s.add_bill(a.cin, 25_000).await.unwrap();
  assert!(!bill.paid);

  let cleared = s.clear_bill(a.cin, bill.bill_id).await.unwrap();
  assert!(cleared.paid);
  assert_eq!(cleared.amount, 25_000);

  let bills = s.get_bills(a.cin).await.unwrap();
  assert_eq!(bills.len(), 1);
  assert!(bills[0].paid);
}

#[tokio::test]
async fn clearing_a_foreign_bill_fails() {
  let s = store().await;
  let a = s.create_case(new_case("A")).await.unwrap();
  let b = s.create_case(new_case("B")).await.unwrap();

  let bill = s.add_bill(a.cin, 10_000).await.unwrap();
  let err = s.clear_bill(b.cin, bill.bill_id).await.unwrap_err();

  assert!(matches!(err.into(), CoreError::BillNotFound(_)));
}
