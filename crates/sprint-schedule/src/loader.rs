//! CSV loader for custom per-worker calendar events.
//!
//! # CSV format
//!
//! One row per event.  Workers are numbered in simulation order: programmers
//! first, then testers.  Days are zero-based and include the leading
//! regression days.
//!
//! ```csv
//! worker_id,day,start_minute,duration_minutes
//! 0,3,240,60
//! 0,4,240,60
//! 5,2,300,30
//! ```
//!
//! Every loaded event is an ad hoc meeting.  Workers and days without rows
//! get empty lists.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use sprint_core::DAY_MINUTES;

use crate::{Event, MeetingKind, ScheduleError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventRecord {
    worker_id:        u32,
    day:              u32,
    start_minute:     u32,
    duration_minutes: u32,
}

/// Per worker, per day, the events to pre-place.
pub type CustomEvents = Vec<Vec<Vec<Event>>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load custom events from a CSV file.
///
/// Returns `worker_count` lists of `total_days` day lists each.
pub fn load_custom_events_csv(
    path:         &Path,
    worker_count: usize,
    total_days:   usize,
) -> Result<CustomEvents, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_custom_events_reader(file, worker_count, total_days)
}

/// Like [`load_custom_events_csv`] but accepts any `Read` source.
pub fn load_custom_events_reader<R: Read>(
    reader:       R,
    worker_count: usize,
    total_days:   usize,
) -> Result<CustomEvents, ScheduleError> {
    let mut events: CustomEvents = vec![vec![Vec::new(); total_days]; worker_count];
    let mut csv_reader = csv::Reader::from_reader(reader);

    for result in csv_reader.deserialize::<EventRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        validate(&row, worker_count, total_days)?;
        events[row.worker_id as usize][row.day as usize].push(Event::meeting(
            row.day,
            row.start_minute,
            row.duration_minutes,
            MeetingKind::Adhoc,
        ));
    }

    Ok(events)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn validate(row: &EventRecord, worker_count: usize, total_days: usize) -> Result<(), ScheduleError> {
    if row.worker_id as usize >= worker_count {
        return Err(ScheduleError::Parse(format!(
            "worker_id {} out of range (team has {worker_count} workers)",
            row.worker_id
        )));
    }
    if row.day as usize >= total_days {
        return Err(ScheduleError::Parse(format!(
            "day {} out of range (run has {total_days} days)",
            row.day
        )));
    }
    let end = row.start_minute.checked_add(row.duration_minutes);
    if row.duration_minutes == 0 || end.is_none_or(|end| end > DAY_MINUTES) {
        return Err(ScheduleError::Parse(format!(
            "event at minute {} lasting {} does not fit in a {DAY_MINUTES}-minute day",
            row.start_minute, row.duration_minutes
        )));
    }
    Ok(())
}
