//! Read-only views over a loaded collection: date-range listing, agenda
//! grouping, and keyword search.
//!
//! "Today" is always passed in by the caller so results are deterministic.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::event::Event;
use crate::validate;

/// Days covered by a `Week` view, today included.
pub const WEEK_DAYS: u64 = 7;

/// Which dates a listing covers. Every bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// Today and everything after it.
    #[default]
    Upcoming,
    Today,
    /// Today plus the following six days.
    Week,
    Between {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateRange {
    /// Inclusive `(from, to)` bounds relative to `today`; `None` is unbounded.
    pub fn bounds(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            DateRange::Upcoming => (Some(today), None),
            DateRange::Today => (Some(today), Some(today)),
            DateRange::Week => (Some(today), Some(week_end(today))),
            DateRange::Between { from, to } => (from, to),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let (from, to) = self.bounds(today);
        from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
    }
}

fn week_end(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Sort by `(date, start_time, id)`.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| {
        (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id))
    });
}

/// Events within `range`, in chronological order.
pub fn list(events: &[Event], range: &DateRange, today: NaiveDate) -> Vec<Event> {
    let mut matched: Vec<Event> = events
        .iter()
        .filter(|e| range.contains(e.date, today))
        .cloned()
        .collect();
    sort_chronologically(&mut matched);
    matched
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgendaSpan {
    Day(NaiveDate),
    /// Today plus the following six days.
    Week,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub days: Vec<AgendaDay>,
    pub total: usize,
}

/// Group events by day in ascending date order.
///
/// Every day of the span gets a group, even when it has no events; each group
/// is sorted by start time.
pub fn agenda(events: &[Event], span: AgendaSpan, today: NaiveDate) -> Agenda {
    let dates: Vec<NaiveDate> = match span {
        AgendaSpan::Day(date) => vec![date],
        AgendaSpan::Week => today.iter_days().take(WEEK_DAYS as usize).collect(),
    };

    let days: Vec<AgendaDay> = dates
        .into_iter()
        .map(|date| AgendaDay {
            date,
            events: list(
                events,
                &DateRange::Between {
                    from: Some(date),
                    to: Some(date),
                },
                today,
            ),
        })
        .collect();
    let total = days.iter().map(|day| day.events.len()).sum();

    Agenda { days, total }
}

/// Case-insensitive substring search.
///
/// Matches the title, and also the description and location unless
/// `title_only` is set.
///
/// # Errors
/// Returns `CalError::InvalidInput` if `query` is empty after trimming.
pub fn search(events: &[Event], query: &str, title_only: bool) -> Result<Vec<Event>> {
    let needle = validate::validate_query(query)?.to_lowercase();

    let mut matched: Vec<Event> = events
        .iter()
        .filter(|e| {
            let hit = |text: &str| text.to_lowercase().contains(&needle);
            hit(&e.title) || (!title_only && (hit(&e.description) || hit(&e.location)))
        })
        .cloned()
        .collect();
    sort_chronologically(&mut matched);
    Ok(matched)
}
