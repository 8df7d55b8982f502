//! Parse and normalize raw user input into typed values.
//!
//! Every function here is pure: no I/O, no clock. Failures are reported as
//! [`CalError::InvalidInput`] with a message fit for showing to the user.

use chrono::NaiveDate;

use crate::error::{CalError, Result};
use crate::event::{MinuteOfDay, LAST_MINUTE};
use crate::recurrence::{Frequency, RepeatRule};

/// Parse a strict `YYYY-MM-DD` date and check that the day exists.
///
/// Month and day must be zero-padded to two digits. `2026-02-29` is rejected
/// because 2026 is not a leap year; `2024-02-29` is accepted.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let s = text.trim();
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(CalError::invalid(format!(
            "Invalid date format \"{}\" (expected YYYY-MM-DD)",
            s
        )));
    }

    // The shape check above guarantees these slices are ASCII digits.
    let year: i32 = s[0..4].parse().map_err(|_| bad_date(s))?;
    let month: u32 = s[5..7].parse().map_err(|_| bad_date(s))?;
    let day: u32 = s[8..10].parse().map_err(|_| bad_date(s))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| bad_date(s))
}

fn bad_date(s: &str) -> CalError {
    CalError::invalid(format!("Invalid date \"{}\": no such day", s))
}

/// Parse a 24-hour `H:MM` or `HH:MM` time.
///
/// 12-hour notation and `24:00` are rejected.
pub fn parse_time(text: &str) -> Result<MinuteOfDay> {
    let s = text.trim();
    let invalid =
        || CalError::invalid(format!("Invalid time format \"{}\" (expected HH:MM 24-hour)", s));

    let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 || !digits(hour) || !digits(minute) {
        return Err(invalid());
    }

    let hour: u16 = hour.parse().map_err(|_| invalid())?;
    let minute: u16 = minute.parse().map_err(|_| invalid())?;
    MinuteOfDay::from_hm(hour, minute).ok_or_else(invalid)
}

/// Accept a duration in minutes within `1..=1439`.
pub fn validate_duration(minutes: i64) -> Result<u16> {
    if minutes < 1 {
        return Err(CalError::invalid(
            "Duration must be a positive integer (minutes)",
        ));
    }
    if minutes > i64::from(LAST_MINUTE) {
        return Err(CalError::invalid(format!(
            "Duration must be at most {} minutes",
            LAST_MINUTE
        )));
    }
    Ok(minutes as u16)
}

/// Reject events that would cross or touch midnight.
pub fn validate_end(start: MinuteOfDay, duration_minutes: u16) -> Result<()> {
    let end = u32::from(start.minutes()) + u32::from(duration_minutes);
    if end > u32::from(LAST_MINUTE) {
        return Err(CalError::invalid(format!(
            "Event starting at {} with duration {} min would cross midnight",
            start, duration_minutes
        )));
    }
    Ok(())
}

pub fn validate_title(text: &str) -> Result<String> {
    let title = text.trim();
    if title.is_empty() {
        return Err(CalError::invalid("Title is required"));
    }
    Ok(title.to_string())
}

/// Build a repeat rule from a frequency name and an optional occurrence count.
///
/// `count` defaults to 1 when omitted.
pub fn validate_repeat(frequency: &str, count: Option<i64>) -> Result<RepeatRule> {
    let frequency = match frequency.trim().to_ascii_lowercase().as_str() {
        "daily" => Frequency::Daily,
        "weekly" => Frequency::Weekly,
        _ => {
            return Err(CalError::invalid(
                "Repeat must be \"daily\" or \"weekly\"",
            ))
        }
    };

    let count = count.unwrap_or(1);
    if count < 1 {
        return Err(CalError::invalid("Count must be a positive integer"));
    }
    let count = u32::try_from(count)
        .map_err(|_| CalError::invalid(format!("Count {} is too large", count)))?;

    Ok(RepeatRule { frequency, count })
}

pub fn validate_query(text: &str) -> Result<String> {
    let query = text.trim();
    if query.is_empty() {
        return Err(CalError::invalid("Search query cannot be empty"));
    }
    Ok(query.to_string())
}
