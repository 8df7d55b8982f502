//! Command-level operations over one locked event store.
//!
//! Each method is one logical transaction: raw input is validated first, the
//! loaded collection is checked and mutated in memory, and the store saves the
//! whole collection before the method returns.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::conflict::{find_conflicts, Conflict};
use crate::error::{CalError, Result};
use crate::event::{Event, EventPatch, NewEvent};
use crate::query::{self, Agenda, AgendaSpan, DateRange};
use crate::recurrence::{self, BatchCommit, RepeatRule};
use crate::store::EventStore;
use crate::validate;

/// Raw input for `add`, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub title: String,
    pub date: String,
    pub time: String,
    pub duration: i64,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `daily` or `weekly`; `None` adds a single event.
    pub repeat: Option<String>,
    /// Occurrence count, only read when `repeat` is set. Defaults to 1.
    pub count: Option<i64>,
    /// Store the event(s) even if they conflict.
    pub force: bool,
}

/// Raw input for `edit`. Only `Some` fields are changed.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub force: bool,
}

/// One field whose value changed during an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub event: Event,
    pub changes: Vec<FieldChange>,
    /// Collisions accepted because conflicts were overridden.
    pub conflicts: Vec<Conflict>,
}

/// An event together with every other event overlapping it.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub overlapping: Vec<Event>,
}

pub struct CalendarService {
    store: EventStore,
    today: NaiveDate,
}

impl CalendarService {
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(EventStore::open(config)?))
    }

    pub fn new(store: EventStore) -> Self {
        Self {
            store,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used by relative ranges (`today`, `week`, upcoming).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Add one event, or a whole recurring batch when `repeat` is set.
    pub fn add(&mut self, request: &AddRequest) -> Result<BatchCommit> {
        let date = validate::parse_date(&request.date)?;
        let start = validate::parse_time(&request.time)?;
        let mut base = NewEvent::new(&request.title, date, start, request.duration)?;
        if let Some(description) = &request.description {
            base = base.with_description(description);
        }
        if let Some(location) = &request.location {
            base = base.with_location(location);
        }

        let rule = match &request.repeat {
            Some(frequency) => validate::validate_repeat(frequency, request.count)?,
            None => RepeatRule::once(),
        };

        let batch = recurrence::expand(&base, &rule)?;
        recurrence::commit_batch(&mut self.store, batch, request.force)
    }

    /// Change the supplied fields of an event and report what changed.
    pub fn edit(&mut self, id: &str, request: &EditRequest) -> Result<EditOutcome> {
        let patch = build_patch(request)?;
        if patch.is_empty() {
            return Err(CalError::invalid("No fields provided to edit"));
        }

        let old = self.store.get(id)?.clone();
        let candidate = patch.apply_to(&old);
        validate::validate_end(candidate.start_time, candidate.duration_minutes)?;

        let conflicts = find_conflicts(&candidate.slot(), self.store.events(), Some(id));
        if !conflicts.is_empty() {
            if !request.force {
                return Err(CalError::Conflict(conflicts));
            }
            warn!(id, conflicts = conflicts.len(), "editing event despite conflicts");
        }

        let event = self.store.update(id, &patch)?;
        let changes = diff(&old, &event);
        Ok(EditOutcome {
            event,
            changes,
            conflicts,
        })
    }

    pub fn get(&self, id: &str) -> Result<Event> {
        self.store.get(id).cloned()
    }

    /// Look up an event along with the events it overlaps.
    pub fn show(&self, id: &str) -> Result<EventDetail> {
        let event = self.get(id)?;
        let slot = event.slot();
        let mut overlapping: Vec<Event> = self
            .store
            .events()
            .iter()
            .filter(|other| other.id != event.id && slot.overlaps(&other.slot()))
            .cloned()
            .collect();
        query::sort_chronologically(&mut overlapping);
        Ok(EventDetail { event, overlapping })
    }

    /// Delete one event. With `preview` the lookup runs but nothing is written.
    pub fn delete(&mut self, id: &str, preview: bool) -> Result<Event> {
        if preview {
            return self.get(id);
        }
        self.store.delete(id)
    }

    /// Delete every event on a date. No match is reported as `NotFound`.
    pub fn delete_on_date(&mut self, date: &str, preview: bool) -> Result<Vec<Event>> {
        let date = validate::parse_date(date)?;
        let removed = if preview {
            self.events_on(date)
        } else {
            self.store.delete_by_date(date)?
        };
        if removed.is_empty() {
            return Err(CalError::NotFound(format!("No events found on {}", date)));
        }
        Ok(removed)
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        self.list(&DateRange::Between {
            from: Some(date),
            to: Some(date),
        })
    }

    pub fn list(&self, range: &DateRange) -> Vec<Event> {
        query::list(self.store.events(), range, self.today)
    }

    pub fn agenda(&self, span: AgendaSpan) -> Agenda {
        query::agenda(self.store.events(), span, self.today)
    }

    pub fn search(&self, query: &str, title_only: bool) -> Result<Vec<Event>> {
        query::search(self.store.events(), query, title_only)
    }
}

fn build_patch(request: &EditRequest) -> Result<EventPatch> {
    Ok(EventPatch {
        title: request
            .title
            .as_deref()
            .map(validate::validate_title)
            .transpose()?,
        date: request
            .date
            .as_deref()
            .map(validate::parse_date)
            .transpose()?,
        start_time: request
            .time
            .as_deref()
            .map(validate::parse_time)
            .transpose()?,
        duration_minutes: request
            .duration
            .map(validate::validate_duration)
            .transpose()?,
        description: request.description.as_deref().map(|s| s.trim().to_string()),
        location: request.location.as_deref().map(|s| s.trim().to_string()),
    })
}

fn diff(old: &Event, new: &Event) -> Vec<FieldChange> {
    let pairs = [
        ("title", old.title.clone(), new.title.clone()),
        ("description", old.description.clone(), new.description.clone()),
        ("date", old.date.to_string(), new.date.to_string()),
        (
            "start_time",
            old.start_time.to_string(),
            new.start_time.to_string(),
        ),
        (
            "duration_minutes",
            old.duration_minutes.to_string(),
            new.duration_minutes.to_string(),
        ),
        ("location", old.location.clone(), new.location.clone()),
    ];

    pairs
        .into_iter()
        .filter(|(_, before, after)| before != after)
        .map(|(field, old, new)| FieldChange { field, old, new })
        .collect()
}
