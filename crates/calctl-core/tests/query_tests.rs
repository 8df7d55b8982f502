//! Tests for listing, agenda grouping and search.

use calctl_core::query::{agenda, list, search, AgendaSpan, DateRange};
use calctl_core::{CalError, Event, MinuteOfDay};
use chrono::{NaiveDate, NaiveDateTime};

fn may(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
}

fn event(id: &str, title: &str, day: u32, hour: u16) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        date: may(day),
        start_time: MinuteOfDay::from_hm(hour, 0).unwrap(),
        duration_minutes: 30,
        description: String::new(),
        location: String::new(),
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

/// One event on each of May 10..=13, inserted out of order.
fn four_days() -> Vec<Event> {
    vec![
        event("e13", "Thirteenth", 13, 9),
        event("e10", "Tenth", 10, 9),
        event("e12", "Twelfth", 12, 9),
        event("e11", "Eleventh", 11, 9),
    ]
}

fn dates(events: &[Event]) -> Vec<u32> {
    use chrono::Datelike;
    events.iter().map(|e| e.date.day()).collect()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn explicit_range_is_inclusive_on_both_ends() {
    let range = DateRange::Between {
        from: Some(may(11)),
        to: Some(may(13)),
    };
    assert_eq!(dates(&list(&four_days(), &range, may(1))), vec![11, 12, 13]);
}

#[test]
fn single_day_range() {
    let range = DateRange::Between {
        from: Some(may(11)),
        to: Some(may(11)),
    };
    assert_eq!(dates(&list(&four_days(), &range, may(1))), vec![11]);
}

#[test]
fn open_ended_ranges() {
    let from_only = DateRange::Between {
        from: Some(may(12)),
        to: None,
    };
    assert_eq!(dates(&list(&four_days(), &from_only, may(1))), vec![12, 13]);

    let to_only = DateRange::Between {
        from: None,
        to: Some(may(11)),
    };
    assert_eq!(dates(&list(&four_days(), &to_only, may(1))), vec![10, 11]);
}

#[test]
fn default_range_is_today_onwards() {
    assert_eq!(
        dates(&list(&four_days(), &DateRange::default(), may(12))),
        vec![12, 13]
    );
}

#[test]
fn today_range() {
    assert_eq!(dates(&list(&four_days(), &DateRange::Today, may(11))), vec![11]);
}

#[test]
fn week_is_today_plus_six_days() {
    let events = vec![
        event("before", "Before", 9, 9),
        event("first", "First", 10, 9),
        event("last", "Last", 16, 9),
        event("after", "After", 17, 9),
    ];
    let ids: Vec<String> = list(&events, &DateRange::Week, may(10))
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["first", "last"]);
}

#[test]
fn list_sorts_by_date_then_start_time() {
    let events = vec![
        event("late", "Late", 10, 15),
        event("next-day", "Next", 11, 8),
        event("early", "Early", 10, 8),
    ];
    let ids: Vec<String> = list(&events, &DateRange::Between { from: None, to: None }, may(1))
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["early", "late", "next-day"]);
}

// ---------------------------------------------------------------------------
// agenda
// ---------------------------------------------------------------------------

#[test]
fn day_agenda_sorted_by_start_time() {
    let events = vec![
        event("b", "Lunch", 10, 12),
        event("a", "Standup", 10, 9),
        event("c", "Elsewhere", 11, 9),
    ];
    let result = agenda(&events, AgendaSpan::Day(may(10)), may(1));

    assert_eq!(result.days.len(), 1);
    assert_eq!(result.days[0].date, may(10));
    let titles: Vec<&str> = result.days[0].events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Standup", "Lunch"]);
    assert_eq!(result.total, 2);
}

#[test]
fn week_agenda_has_seven_ascending_days() {
    let result = agenda(&four_days(), AgendaSpan::Week, may(11));

    assert_eq!(result.days.len(), 7);
    let days: Vec<NaiveDate> = result.days.iter().map(|d| d.date).collect();
    assert_eq!(days, (11..=17).map(may).collect::<Vec<_>>());
    assert_eq!(result.total, 3, "May 11, 12, 13");
    assert!(result.days[3].events.is_empty());
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[test]
fn search_is_case_insensitive_on_title() {
    let events = vec![event("m", "Team Meeting", 10, 9), event("l", "Lunch", 10, 12)];
    let found = search(&events, "team", false).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Team Meeting");
}

#[test]
fn search_matches_description_and_location_unless_title_only() {
    let mut in_description = event("d", "Sync", 10, 9);
    in_description.description = "Quarterly TEAM planning".to_string();
    let mut in_location = event("l", "Lunch", 10, 12);
    in_location.location = "Team room".to_string();
    let events = vec![in_description, in_location];

    assert_eq!(search(&events, "team", false).unwrap().len(), 2);
    assert!(search(&events, "team", true).unwrap().is_empty());
}

#[test]
fn empty_query_is_invalid() {
    assert!(matches!(
        search(&four_days(), "", false),
        Err(CalError::InvalidInput(_))
    ));
    assert!(matches!(
        search(&four_days(), "   ", true),
        Err(CalError::InvalidInput(_))
    ));
}

#[test]
fn search_results_are_chronological() {
    let found = search(&four_days(), "t", true).unwrap();
    assert_eq!(dates(&found), vec![10, 11, 12, 13]);
}
