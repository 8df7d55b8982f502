//! Recurrence expansion and all-or-nothing batch commits.
//!
//! A repeating `add` expands one base event into a batch of occurrences that
//! share everything but the date. The batch is conflict-checked against the
//! persisted collection as a whole and then inserted with a single save, so a
//! partially committed batch is never visible.

use chrono::Days;
use serde::Serialize;
use tracing::warn;

use crate::conflict::{find_batch_conflicts, Conflict, Slot};
use crate::error::{CalError, Result};
use crate::event::{Event, NewEvent};
use crate::store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    /// Days between consecutive occurrences.
    pub fn step_days(self) -> u64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
        }
    }
}

/// A validated repeat rule; see [`crate::validate::validate_repeat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepeatRule {
    pub frequency: Frequency,
    pub count: u32,
}

impl RepeatRule {
    /// A rule producing only the base event.
    pub fn once() -> Self {
        Self {
            frequency: Frequency::Daily,
            count: 1,
        }
    }
}

/// Expand `base` into `rule.count` occurrences.
///
/// Occurrence *k* (0-indexed) falls on `base.date + k * step` days; all other
/// fields are copied unchanged.
///
/// # Errors
/// Returns `CalError::InvalidInput` if the count is zero or an occurrence date
/// falls outside the supported calendar range.
pub fn expand(base: &NewEvent, rule: &RepeatRule) -> Result<Vec<NewEvent>> {
    if rule.count == 0 {
        return Err(CalError::invalid("Count must be a positive integer"));
    }

    (0..u64::from(rule.count))
        .map(|k| {
            let date = base
                .date
                .checked_add_days(Days::new(k * rule.frequency.step_days()))
                .ok_or_else(|| {
                    CalError::invalid(format!(
                        "Occurrence {} of \"{}\" falls outside the supported date range",
                        k + 1,
                        base.title
                    ))
                })?;
            Ok(NewEvent {
                date,
                ..base.clone()
            })
        })
        .collect()
}

/// Outcome of a committed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCommit {
    pub events: Vec<Event>,
    /// Collisions that were accepted because conflicts were overridden.
    pub conflicts: Vec<Conflict>,
}

/// Commit a batch of candidates atomically.
///
/// Every candidate is checked against the events already persisted in `store`
/// (not against the other candidates). Without `force`, any collision fails the
/// whole batch with `CalError::Conflict` and nothing is written. With `force`
/// the batch is stored and the collisions are reported back for display.
pub fn commit_batch(store: &mut EventStore, batch: Vec<NewEvent>, force: bool) -> Result<BatchCommit> {
    let slots: Vec<Slot> = batch.iter().map(NewEvent::slot).collect();
    let conflicts = find_batch_conflicts(&slots, store.events());

    if !conflicts.is_empty() {
        if !force {
            return Err(CalError::Conflict(conflicts));
        }
        warn!(
            conflicts = conflicts.len(),
            "storing events despite conflicts"
        );
    }

    let events = store.insert_all(batch)?;
    Ok(BatchCommit { events, conflicts })
}
