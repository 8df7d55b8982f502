//! Detect overlapping events on the same calendar day.
//!
//! Events occupy the half-open interval `[start, start + duration)`, so
//! back-to-back events (one ends exactly when the next starts) are NOT conflicts.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::event::{Event, MinuteOfDay};

/// The time a candidate occupies on one day, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(serialize_with = "as_clock")]
    pub start: u16,
    #[serde(serialize_with = "as_clock")]
    pub end: u16,
}

impl Slot {
    /// Two slots overlap iff they share a date and `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }

    pub fn overlap_minutes(&self, other: &Slot) -> u16 {
        if !self.overlaps(other) {
            return 0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }
}

fn as_clock<S: Serializer>(minutes: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&MinuteOfDay::saturating(*minutes))
}

/// A collision between a candidate slot and an event already in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub candidate: Slot,
    pub existing: Event,
    pub overlap_minutes: u16,
}

/// Find every event in `events` whose slot overlaps `candidate`.
///
/// `exclude_id` skips the event being edited so it never conflicts with its own
/// previous version. The result keeps the collection's insertion order.
pub fn find_conflicts(candidate: &Slot, events: &[Event], exclude_id: Option<&str>) -> Vec<Conflict> {
    events
        .iter()
        .filter(|event| exclude_id != Some(event.id.as_str()))
        .filter_map(|event| {
            let existing = event.slot();
            candidate.overlaps(&existing).then(|| Conflict {
                candidate: *candidate,
                existing: event.clone(),
                overlap_minutes: candidate.overlap_minutes(&existing),
            })
        })
        .collect()
}

/// Check a whole batch of candidates, collecting the conflicts of all of them.
pub fn find_batch_conflicts(candidates: &[Slot], events: &[Event]) -> Vec<Conflict> {
    candidates
        .iter()
        .flat_map(|slot| find_conflicts(slot, events, None))
        .collect()
}
