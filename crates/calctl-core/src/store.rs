//! The durable event collection.
//!
//! The whole collection is read into one owned `Vec<Event>` when the store is
//! opened and written back as a unit after every mutation. Writes go to a
//! temporary file in the same directory which is then renamed over the store,
//! so a failed save never leaves a half-written file behind.
//!
//! An exclusive advisory lock on `<store>.lock` is held from `open` until the
//! store is dropped, covering the full load-validate-save cycle of a command.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use fs2::FileExt;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{CalError, Result};
use crate::event::{Event, EventPatch, NewEvent};
use crate::validate;

const ID_PREFIX: &str = "evt-";
const ID_HEX_LEN: usize = 8;

#[derive(Serialize)]
struct StoreFile<'a> {
    events: &'a [Event],
}

/// Exclusive owner of the event collection for one command.
#[derive(Debug)]
pub struct EventStore {
    config: Config,
    events: Vec<Event>,
    _lock: File,
}

impl EventStore {
    /// Lock the store and load its contents.
    ///
    /// Blocks while another process holds the lock.
    pub fn open(config: Config) -> Result<Self> {
        if let Some(dir) = config.data_dir() {
            fs::create_dir_all(dir).map_err(|e| storage(e, "create directory", dir))?;
        }

        let lock_path = config.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| storage(e, "open lock file", &lock_path))?;
        lock.lock_exclusive()
            .map_err(|e| storage(e, "lock", &lock_path))?;

        let events = load(&config.data_path)?;
        debug!(
            path = %config.data_path.display(),
            events = events.len(),
            "loaded event store"
        );

        Ok(Self {
            config,
            events,
            _lock: lock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every event, in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Result<&Event> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn insert(&mut self, event: NewEvent) -> Result<Event> {
        let mut stored = self.insert_all(vec![event])?;
        Ok(stored.remove(0))
    }

    /// Insert a batch with a single save: either all events become visible or none do.
    pub fn insert_all(&mut self, batch: Vec<NewEvent>) -> Result<Vec<Event>> {
        let now = now();
        let mut next = self.events.clone();
        let mut stored = Vec::with_capacity(batch.len());
        for candidate in batch {
            let event = candidate.into_event(fresh_id(&next), now);
            next.push(event.clone());
            stored.push(event);
        }

        self.commit(next)?;
        info!(
            count = stored.len(),
            ids = ?stored.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            "inserted events"
        );
        Ok(stored)
    }

    /// Apply the provided fields of `patch` and bump `updated_at`.
    pub fn update(&mut self, id: &str, patch: &EventPatch) -> Result<Event> {
        let index = self.position(id)?;
        let mut updated = patch.apply_to(&self.events[index]);
        validate::validate_title(&updated.title)?;
        validate::validate_duration(i64::from(updated.duration_minutes))?;
        validate::validate_end(updated.start_time, updated.duration_minutes)?;
        updated.updated_at = now();

        let mut next = self.events.clone();
        next[index] = updated.clone();
        self.commit(next)?;
        info!(id, "updated event");
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Event> {
        let index = self.position(id)?;
        let mut next = self.events.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        info!(id, "deleted event");
        Ok(removed)
    }

    /// Remove every event on `date`. Nothing is written when no event matches.
    pub fn delete_by_date(&mut self, date: NaiveDate) -> Result<Vec<Event>> {
        let (removed, kept): (Vec<Event>, Vec<Event>) =
            self.events.iter().cloned().partition(|e| e.date == date);
        if removed.is_empty() {
            return Ok(removed);
        }

        self.commit(kept)?;
        info!(%date, count = removed.len(), "deleted events on date");
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Persist `next`, then make it the in-memory collection.
    fn commit(&mut self, next: Vec<Event>) -> Result<()> {
        save(&self.config.data_path, &next)?;
        self.events = next;
        Ok(())
    }
}

/// Read the persisted collection. A missing or empty file is an empty collection.
///
/// Both the `{"events": [...]}` layout and a bare `[...]` array are accepted.
pub fn load(path: &Path) -> Result<Vec<Event>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).map_err(|e| storage(e, "read", path))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records = match serde_json::from_str::<Value>(&raw)? {
        Value::Array(records) => Value::Array(records),
        Value::Object(mut root) => root.remove("events").ok_or_else(|| {
            CalError::Storage("malformed event store: missing \"events\" list".to_string())
        })?,
        _ => {
            return Err(CalError::Storage(
                "malformed event store: expected an object or a list".to_string(),
            ))
        }
    };
    let events: Vec<Event> = serde_json::from_value(records)?;

    let mut seen = HashSet::new();
    for event in &events {
        event.check()?;
        if !seen.insert(event.id.as_str()) {
            return Err(CalError::Storage(format!(
                "malformed event store: duplicate id '{}'",
                event.id
            )));
        }
    }
    Ok(events)
}

/// Write the full collection through a temporary file and an atomic rename.
pub fn save(path: &Path, events: &[Event]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| storage(e, "create directory", dir))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| storage(e, "create temp file in", dir))?;
    serde_json::to_writer_pretty(&mut tmp, &StoreFile { events })?;
    tmp.write_all(b"\n")
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| storage(e, "write", path))?;
    tmp.persist(path)
        .map_err(|e| storage(e.error, "replace", path))?;

    debug!(path = %path.display(), events = events.len(), "saved event store");
    Ok(())
}

fn fresh_id(taken: &[Event]) -> String {
    loop {
        let hex = Uuid::new_v4().simple().to_string();
        let id = format!("{}{}", ID_PREFIX, &hex[..ID_HEX_LEN]);
        if !taken.iter().any(|e| e.id == id) {
            return id;
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

fn not_found(id: &str) -> CalError {
    CalError::NotFound(format!("Event {} not found", id))
}

fn storage(err: std::io::Error, action: &str, path: &Path) -> CalError {
    CalError::Storage(format!("failed to {} {}: {}", action, path.display(), err))
}
