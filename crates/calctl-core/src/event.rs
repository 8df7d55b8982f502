//! The event entity and the value types it is built from.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::conflict::Slot;
use crate::error::{CalError, Result};
use crate::validate;

/// Last valid minute of a day (23:59).
pub const LAST_MINUTE: u16 = 1439;

/// A wall-clock time of day with minute precision, `00:00`..=`23:59`.
///
/// Serialized as a zero-padded `HH:MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes <= LAST_MINUTE).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    /// Clamp to the last minute of the day instead of failing.
    pub fn saturating(minutes: u16) -> Self {
        Self(minutes.min(LAST_MINUTE))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for MinuteOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MinuteOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        validate::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// A persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: MinuteOfDay,
    pub duration_minutes: u16,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub location: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Event {
    /// Minute of day at which the event ends (exclusive).
    pub fn end_minute(&self) -> u16 {
        self.start_time.minutes().saturating_add(self.duration_minutes)
    }

    /// End time for display. Valid for every event that passed [`Event::check`].
    pub fn end_time(&self) -> MinuteOfDay {
        MinuteOfDay::saturating(self.end_minute())
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date,
            start: self.start_time.minutes(),
            end: self.end_minute(),
        }
    }

    /// Re-check the entity invariants on a record read back from storage.
    pub(crate) fn check(&self) -> Result<()> {
        let problem = if self.id.trim().is_empty() {
            Some("empty id")
        } else if self.title.trim().is_empty() {
            Some("empty title")
        } else if self.duration_minutes == 0 || self.duration_minutes > LAST_MINUTE {
            Some("duration out of range")
        } else if self.end_minute() > LAST_MINUTE {
            Some("event crosses midnight")
        } else {
            None
        };
        match problem {
            Some(problem) => Err(CalError::Storage(format!(
                "malformed event store: event '{}' has {}",
                self.id, problem
            ))),
            None => Ok(()),
        }
    }
}

/// Caller-supplied fields of an event that does not have an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: MinuteOfDay,
    pub duration_minutes: u16,
    pub description: String,
    pub location: String,
}

impl NewEvent {
    /// Build a candidate event, enforcing the title, duration and midnight rules.
    pub fn new(
        title: &str,
        date: NaiveDate,
        start_time: MinuteOfDay,
        duration_minutes: i64,
    ) -> Result<Self> {
        let title = validate::validate_title(title)?;
        let duration_minutes = validate::validate_duration(duration_minutes)?;
        validate::validate_end(start_time, duration_minutes)?;
        Ok(Self {
            title,
            date,
            start_time,
            duration_minutes,
            description: String::new(),
            location: String::new(),
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.trim().to_string();
        self
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.date,
            start: self.start_time.minutes(),
            end: self.start_time.minutes() + self.duration_minutes,
        }
    }

    pub(crate) fn into_event(self, id: String, now: NaiveDateTime) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            description: self.description,
            location: self.location,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<MinuteOfDay>,
    pub duration_minutes: Option<u16>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.duration_minutes.is_none()
            && self.description.is_none()
            && self.location.is_none()
    }

    /// Copy of `event` with the provided fields replaced. Timestamps are untouched.
    pub fn apply_to(&self, event: &Event) -> Event {
        let mut next = event.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(start_time) = self.start_time {
            next.start_time = start_time;
        }
        if let Some(duration) = self.duration_minutes {
            next.duration_minutes = duration;
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        next
    }
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_of_day_displays_zero_padded() {
        assert_eq!(MinuteOfDay::from_hm(9, 5).unwrap().to_string(), "09:05");
        assert_eq!(MinuteOfDay::new(LAST_MINUTE).unwrap().to_string(), "23:59");
        assert!(MinuteOfDay::new(1440).is_none());
        assert!(MinuteOfDay::from_hm(24, 0).is_none());
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let base = NewEvent::new(
            "Standup",
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            MinuteOfDay::from_hm(9, 0).unwrap(),
            15,
        )
        .unwrap()
        .with_location("Room 4")
        .into_event("evt-00000001".to_string(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap());

        let patch = EventPatch {
            duration_minutes: Some(30),
            ..EventPatch::default()
        };
        let next = patch.apply_to(&base);

        assert_eq!(next.duration_minutes, 30);
        assert_eq!(next.title, "Standup");
        assert_eq!(next.location, "Room 4");
        assert!(!patch.is_empty());
        assert!(EventPatch::default().is_empty());
    }

    #[test]
    fn null_description_reads_as_empty() {
        let json = r#"{
            "id": "evt-1a2b3c4d",
            "title": "Dentist",
            "date": "2026-04-01",
            "start_time": "08:30",
            "duration_minutes": 45,
            "description": null,
            "created_at": "2026-03-01T10:00:00",
            "updated_at": "2026-03-01T10:00:00"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.description, "");
        assert_eq!(event.location, "");
        assert_eq!(event.end_time().to_string(), "09:15");
    }
}
