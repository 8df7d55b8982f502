//! Tests for recurrence expansion and atomic batch commits.

use calctl_core::recurrence::{commit_batch, expand, Frequency, RepeatRule};
use calctl_core::store::EventStore;
use calctl_core::{CalError, Config, MinuteOfDay, NewEvent};
use chrono::NaiveDate;
use tempfile::TempDir;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn base(date: NaiveDate, hour: u16, duration: i64) -> NewEvent {
    NewEvent::new("Standup", date, MinuteOfDay::from_hm(hour, 0).unwrap(), duration)
        .unwrap()
        .with_description("Daily sync")
        .with_location("Room 2")
}

fn rule(frequency: Frequency, count: u32) -> RepeatRule {
    RepeatRule { frequency, count }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

#[test]
fn daily_five_consecutive_days() {
    let batch = expand(&base(ymd(2026, 2, 10), 9, 15), &rule(Frequency::Daily, 5)).unwrap();

    assert_eq!(batch.len(), 5);
    for (k, occurrence) in batch.iter().enumerate() {
        assert_eq!(occurrence.date, ymd(2026, 2, 10 + k as u32));
        assert_eq!(occurrence.title, "Standup");
        assert_eq!(occurrence.start_time.to_string(), "09:00");
        assert_eq!(occurrence.duration_minutes, 15);
        assert_eq!(occurrence.description, "Daily sync");
        assert_eq!(occurrence.location, "Room 2");
    }
}

#[test]
fn weekly_steps_seven_days() {
    let batch = expand(&base(ymd(2026, 2, 10), 14, 60), &rule(Frequency::Weekly, 3)).unwrap();

    let dates: Vec<NaiveDate> = batch.iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![ymd(2026, 2, 10), ymd(2026, 2, 17), ymd(2026, 2, 24)]
    );
}

#[test]
fn daily_crosses_month_and_leap_day() {
    let batch = expand(&base(ymd(2024, 2, 28), 9, 15), &rule(Frequency::Daily, 3)).unwrap();

    let dates: Vec<NaiveDate> = batch.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]);
}

#[test]
fn count_one_is_just_the_base() {
    let event = base(ymd(2026, 2, 10), 9, 15);
    let batch = expand(&event, &RepeatRule::once()).unwrap();
    assert_eq!(batch, vec![event]);
}

#[test]
fn zero_count_is_invalid() {
    assert!(matches!(
        expand(&base(ymd(2026, 2, 10), 9, 15), &rule(Frequency::Daily, 0)),
        Err(CalError::InvalidInput(_))
    ));
}

#[test]
fn dates_past_the_calendar_range_are_invalid() {
    let far = base(NaiveDate::MAX, 9, 15);
    assert!(matches!(
        expand(&far, &rule(Frequency::Weekly, 2)),
        Err(CalError::InvalidInput(_))
    ));
}

// ---------------------------------------------------------------------------
// Atomic commits
// ---------------------------------------------------------------------------

fn open(dir: &TempDir) -> EventStore {
    EventStore::open(Config::new(dir.path().join("events.json"))).unwrap()
}

/// Store with a "Dentist" appointment on 2026-05-12 09:00-10:00.
fn store_with_blocker(dir: &TempDir) -> EventStore {
    let mut store = open(dir);
    let blocker = NewEvent::new(
        "Dentist",
        ymd(2026, 5, 12),
        MinuteOfDay::from_hm(9, 0).unwrap(),
        60,
    )
    .unwrap();
    store.insert(blocker).unwrap();
    store
}

#[test]
fn colliding_occurrence_fails_whole_batch() {
    let dir = TempDir::new().unwrap();
    let mut store = store_with_blocker(&dir);
    let before = store.events().to_vec();

    // Third occurrence (2026-05-12) hits the dentist.
    let batch = expand(&base(ymd(2026, 5, 10), 9, 30), &rule(Frequency::Daily, 5)).unwrap();
    let result = commit_batch(&mut store, batch, false);

    match result {
        Err(CalError::Conflict(conflicts)) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].existing.title, "Dentist");
            assert_eq!(conflicts[0].candidate.date, ymd(2026, 5, 12));
        }
        other => panic!("expected Conflict, got {:?}", other.map(|c| c.events.len())),
    }
    assert_eq!(store.events(), before.as_slice());

    // Nothing reached the disk either.
    drop(store);
    assert_eq!(open(&dir).events().len(), 1);
}

#[test]
fn forced_batch_persists_every_occurrence() {
    let dir = TempDir::new().unwrap();
    let mut store = store_with_blocker(&dir);

    let batch = expand(&base(ymd(2026, 5, 10), 9, 30), &rule(Frequency::Daily, 5)).unwrap();
    let commit = commit_batch(&mut store, batch, true).unwrap();

    assert_eq!(commit.events.len(), 5);
    assert_eq!(commit.conflicts.len(), 1, "override still reports collisions");
    drop(store);
    assert_eq!(open(&dir).events().len(), 6);
}

#[test]
fn every_collision_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut store = store_with_blocker(&dir);
    store
        .insert(
            NewEvent::new(
                "Gym",
                ymd(2026, 5, 14),
                MinuteOfDay::from_hm(9, 15).unwrap(),
                45,
            )
            .unwrap(),
        )
        .unwrap();

    let batch = expand(&base(ymd(2026, 5, 10), 9, 30), &rule(Frequency::Daily, 5)).unwrap();
    match commit_batch(&mut store, batch, false) {
        Err(CalError::Conflict(conflicts)) => {
            let titles: Vec<&str> = conflicts.iter().map(|c| c.existing.title.as_str()).collect();
            assert_eq!(titles, vec!["Dentist", "Gym"]);
        }
        other => panic!("expected Conflict, got {:?}", other.map(|c| c.events.len())),
    }
}

#[test]
fn clean_batch_commits_with_no_conflicts() {
    let dir = TempDir::new().unwrap();
    let mut store = store_with_blocker(&dir);

    // 10:00 starts exactly when the dentist ends.
    let batch = expand(&base(ymd(2026, 5, 10), 10, 30), &rule(Frequency::Daily, 5)).unwrap();
    let commit = commit_batch(&mut store, batch, false).unwrap();

    assert_eq!(commit.events.len(), 5);
    assert!(commit.conflicts.is_empty());
    assert_eq!(store.events().len(), 6);
}
