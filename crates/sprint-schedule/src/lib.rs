//! `sprint-schedule`: per-worker calendars built from conflict-free slots.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`event`]     | `Event`, `EventKind`, `MeetingKind`, `TicketWork`, `MetricCategory` |
//! | [`slot`]      | `TimeSlot`, `DayCalendar` (the slot allocator), `WorkPiece` |
//! | [`calendar`]  | `WorkerCalendar` (ceremonies, regression window, work placement) |
//! | [`loader`]    | `CustomEvents`, `load_custom_events_csv`, `load_custom_events_reader` |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                       |
//!
//! # Placement model (summary)
//!
//! Each day starts as one free slot `[0, 480)`.  Placing an event splits the
//! slot that contains it:
//!
//! ```text
//! gap before event  ≤ 30 min → Nothing filler     > 30 min → new free slot
//! gap after event   ≤ 30 min → Nothing filler     > 30 min → new free slot
//!                   (never filled after a ContextSwitch)
//! ```
//!
//! Events and free slots together always tile the whole day.

pub mod calendar;
pub mod error;
pub mod event;
pub mod loader;
pub mod slot;


pub use calendar::WorkerCalendar;
pub use error::{ScheduleError, ScheduleResult};
pub use event::{Event, EventKind, MeetingKind, MetricCategory, TicketWork};
pub use loader::{CustomEvents, load_custom_events_csv, load_custom_events_reader};
pub use slot::{DayCalendar, TimeSlot, WorkPiece};
