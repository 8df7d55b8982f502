//! # calctl-core
//!
//! Event store and scheduling engine for the `calctl` personal calendar.
//!
//! Events live in a single JSON file that is loaded, validated, mutated in
//! memory and saved back as a unit per command. The engine refuses
//! double-bookings unless explicitly overridden, never commits part of a
//! recurring batch, and forbids events that cross midnight.
//!
//! ## Modules
//!
//! - [`validate`]: raw date/time/duration/repeat input → typed values
//! - [`event`]: `Event`, `NewEvent`, `EventPatch`, `MinuteOfDay`
//! - [`store`]: locked, atomically saved event collection
//! - [`conflict`]: same-day half-open interval overlap detection
//! - [`recurrence`]: daily/weekly expansion and all-or-nothing batch commits
//! - [`query`]: date-range listing, agenda grouping, keyword search
//! - [`service`]: command-level operations (`add`, `edit`, `delete`, ...)
//! - [`config`]: store location resolution
//! - [`error`]: `CalError` and exit-code mapping

pub mod config;
pub mod conflict;
pub mod error;
pub mod event;
pub mod query;
pub mod recurrence;
pub mod service;
pub mod store;
pub mod validate;

pub use config::Config;
pub use conflict::{find_conflicts, Conflict, Slot};
pub use error::{CalError, Result};
pub use event::{Event, EventPatch, MinuteOfDay, NewEvent};
pub use query::{Agenda, AgendaDay, AgendaSpan, DateRange};
pub use recurrence::{expand, BatchCommit, Frequency, RepeatRule};
pub use service::{AddRequest, CalendarService, EditOutcome, EditRequest, EventDetail, FieldChange};
pub use store::EventStore;
