//! Human-readable and JSON rendering of command results.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use calctl_core::{Agenda, CalError, Conflict, EditOutcome, Event, EventDetail, MinuteOfDay};
use owo_colors::OwoColorize;
use serde::Serialize;

/// ANSI styling that is a no-op unless enabled and writing to a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn stdout(no_color: bool) -> Self {
        Self::detect(no_color, std::io::stdout().is_terminal())
    }

    pub fn stderr(no_color: bool) -> Self {
        Self::detect(no_color, std::io::stderr().is_terminal())
    }

    fn detect(no_color: bool, is_tty: bool) -> Self {
        let env_disabled = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            enabled: !no_color && !env_disabled && is_tty,
        }
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, |t| t.red().to_string())
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold().to_string())
    }

    pub fn dimmed(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn time_range(event: &Event) -> String {
    format!("{}-{}", event.start_time, event.end_time())
}

/// One-line summary: `evt-1a2b3c4d  2026-05-10  09:00-10:00  Title`.
pub fn event_line(palette: &Palette, event: &Event) -> String {
    let mut line = format!(
        "{}  {}  {}  {}",
        palette.dimmed(&event.id),
        event.date,
        time_range(event),
        palette.bold(&event.title)
    );
    if !event.location.is_empty() {
        line.push_str(&format!(" @ {}", event.location));
    }
    line
}

pub fn event_list(palette: &Palette, events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }
    let mut lines: Vec<String> = events.iter().map(|e| event_line(palette, e)).collect();
    lines.push(format!(
        "{} {}",
        events.len(),
        pluralize("event", events.len())
    ));
    lines.join("\n")
}

pub fn event_detail(palette: &Palette, detail: &EventDetail) -> String {
    let event = &detail.event;
    let mut lines = vec![
        palette.bold(&event.title),
        format!("  ID:          {}", event.id),
        format!("  Date:        {}", event.date),
        format!(
            "  Time:        {} ({} min)",
            time_range(event),
            event.duration_minutes
        ),
    ];
    if !event.description.is_empty() {
        lines.push(format!("  Description: {}", event.description));
    }
    if !event.location.is_empty() {
        lines.push(format!("  Location:    {}", event.location));
    }
    lines.push(format!(
        "  Created:     {}",
        event.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(format!(
        "  Updated:     {}",
        event.updated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if !detail.overlapping.is_empty() {
        lines.push(palette.yellow("  Overlaps with:"));
        for other in &detail.overlapping {
            lines.push(format!("    {}", event_line(palette, other)));
        }
    }
    lines.join("\n")
}

pub fn created(palette: &Palette, events: &[Event]) -> String {
    match events {
        [event] => format!(
            "{} {}",
            palette.green("Created"),
            event_line(palette, event)
        ),
        _ => {
            let mut lines = vec![palette.green(&format!(
                "Created {} {}",
                events.len(),
                pluralize("event", events.len())
            ))];
            lines.extend(events.iter().map(|e| format!("  {}", event_line(palette, e))));
            lines.join("\n")
        }
    }
}

pub fn edited(palette: &Palette, outcome: &EditOutcome) -> String {
    let mut lines = vec![format!(
        "{} {}",
        palette.green("Updated"),
        event_line(palette, &outcome.event)
    )];
    if outcome.changes.is_empty() {
        lines.push("  (no changes)".to_string());
    }
    for change in &outcome.changes {
        lines.push(format!(
            "  {}: {} -> {}",
            change.field,
            palette.red(&display_or_empty(&change.old)),
            palette.green(&display_or_empty(&change.new))
        ));
    }
    lines.join("\n")
}

pub fn deleted(palette: &Palette, events: &[Event], dry_run: bool) -> String {
    let verb = if dry_run { "Would delete" } else { "Deleted" };
    let mut lines = vec![palette.red(&format!(
        "{} {} {}",
        verb,
        events.len(),
        pluralize("event", events.len())
    ))];
    lines.extend(events.iter().map(|e| format!("  {}", event_line(palette, e))));
    lines.join("\n")
}

pub fn agenda(palette: &Palette, agenda: &Agenda) -> String {
    let mut lines = Vec::new();
    for day in &agenda.days {
        lines.push(palette.bold(&day.date.format("%A, %Y-%m-%d").to_string()));
        if day.events.is_empty() {
            lines.push(palette.dimmed("  (no events)"));
        }
        for event in &day.events {
            lines.push(format!(
                "  {}  {}  {}",
                time_range(event),
                event.title,
                palette.dimmed(&event.id)
            ));
        }
    }
    lines.push(format!(
        "{} {}",
        agenda.total,
        pluralize("event", agenda.total)
    ));
    lines.join("\n")
}

/// Conflicts accepted under `--force`, shown after the success message.
pub fn forced_conflicts(palette: &Palette, conflicts: &[Conflict]) -> Option<String> {
    if conflicts.is_empty() {
        return None;
    }
    let mut lines = vec![palette.yellow("Warning: scheduled despite conflicts:")];
    lines.extend(conflicts.iter().map(conflict_line));
    Some(lines.join("\n"))
}

fn conflict_line(conflict: &Conflict) -> String {
    let existing = &conflict.existing;
    let candidate = &conflict.candidate;
    format!(
        "  - {} ({}-{}) conflicts with {} \"{}\" ({}, {} min overlap)",
        candidate.date,
        MinuteOfDay::saturating(candidate.start),
        MinuteOfDay::saturating(candidate.end),
        existing.id,
        existing.title,
        time_range(existing),
        conflict.overlap_minutes
    )
}

/// Render an error for stderr, listing every collision for conflicts.
pub fn error(palette: &Palette, err: &anyhow::Error) -> String {
    let head = palette.red("Error:");
    match err.downcast_ref::<CalError>() {
        Some(CalError::Conflict(conflicts)) => {
            let mut lines = vec![format!("{} event conflicts with existing events:", head)];
            lines.extend(conflicts.iter().map(conflict_line));
            lines.push("Use --force to schedule anyway.".to_string());
            lines.join("\n")
        }
        _ => format!("{} {:#}", head, err),
    }
}

fn display_or_empty(text: &str) -> String {
    if text.is_empty() {
        "(empty)".to_string()
    } else {
        text.to_string()
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
