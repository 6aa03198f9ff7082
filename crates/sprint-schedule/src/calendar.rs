//! A worker's calendar for the whole run.
//!
//! # Ceremonies
//!
//! Every calendar is built with these events already in place:
//!
//! | Event    | When                                                       |
//! |----------|------------------------------------------------------------|
//! | Lunch    | 60 min at `lunch_offset`, every day                        |
//! | Standup  | 15 min at minute 0, every day but the first sprint day     |
//! | Planning | 120 min from minute 0 of the first sprint day, spilling over |
//! | Retro    | 60 min at minute 420 on the last regression day and last day |
//!
//! Custom events go in right after lunch.  Testers additionally spend every
//! free minute of the regression days on regression testing: the first
//! `regression_days` days wrap up the previous sprint, the last
//! `regression_days` days test this one.

use sprint_core::{DayTime, Role, SimConfig, TicketId, WorkerRng};
use sprint_workflow::{Ticket, WorkStage};

use crate::{
    DayCalendar, Event, EventKind, MeetingKind, ScheduleError, ScheduleResult, TicketWork,
};

const LUNCH_MINUTES: u32 = 60;
const STANDUP_MINUTES: u32 = 15;
const PLANNING_MINUTES: u32 = 120;
const RETRO_START: u32 = 420;
const RETRO_MINUTES: u32 = 60;

/// Bounds, in minutes, of the context switch drawn before each work piece.
const MIN_CONTEXT_SWITCH: u32 = 10;
const MAX_CONTEXT_SWITCH: u32 = 30;

#[derive(Clone, Debug)]
pub struct WorkerCalendar {
    role:           Role,
    days:           Vec<DayCalendar>,
    current_ticket: Option<TicketId>,
}

impl WorkerCalendar {
    /// Build a calendar with ceremonies (and, for testers, the regression
    /// window) already placed.
    ///
    /// `custom_events`, when given, must hold one list per simulated day.
    pub fn new(
        config:        &SimConfig,
        role:          Role,
        custom_events: Option<&[Vec<Event>]>,
    ) -> ScheduleResult<Self> {
        let total = config.total_days();
        if let Some(custom) = custom_events.filter(|c| c.len() != total as usize) {
            return Err(ScheduleError::ConfigurationMismatch {
                expected: total as usize,
                got:      custom.len(),
            });
        }

        let mut days: Vec<DayCalendar> = (0..total).map(DayCalendar::new).collect();
        let planning_day = config.first_sprint_day();

        for (d, day) in days.iter_mut().enumerate() {
            day.place(Event::meeting(day.day(), config.lunch_offset, LUNCH_MINUTES, MeetingKind::Lunch))?;
            if let Some(custom) = custom_events {
                for event in &custom[d] {
                    day.place(Event { day: day.day(), ..*event })?;
                }
            }
            if day.day() != planning_day {
                day.place(Event::meeting(day.day(), 0, STANDUP_MINUTES, MeetingKind::Standup))?;
            }
            let last_regression_day = config.regression_days.checked_sub(1);
            if Some(day.day()) == last_regression_day || day.day() + 1 == total {
                day.place(Event::meeting(day.day(), RETRO_START, RETRO_MINUTES, MeetingKind::Retro))?;
            }
        }

        place_planning(&mut days[planning_day as usize..])?;

        let mut calendar = Self { role, days, current_ticket: None };
        if role.is_tester() {
            calendar.reserve_regression_window(config.regression_days)?;
        }
        Ok(calendar)
    }

    /// Fill the free time of the first and last `regression_days` days with
    /// regression testing.
    fn reserve_regression_window(&mut self, regression_days: u32) -> ScheduleResult<()> {
        let total = self.days.len();
        let n = regression_days as usize;
        for d in (0..n).chain(total.saturating_sub(n)..total) {
            self.days[d].fill_free_with(EventKind::RegressionTesting)?;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn days(&self) -> &[DayCalendar] {
        &self.days
    }

    /// All events across every day, in time order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.days.iter().flat_map(DayCalendar::events)
    }

    /// Ticket the worker is currently assigned.
    #[inline]
    pub fn current_ticket(&self) -> Option<TicketId> {
        self.current_ticket
    }

    /// Drop the current assignment and return it.
    pub fn release_ticket(&mut self) -> Option<TicketId> {
        self.current_ticket.take()
    }

    /// Start of the earliest free slot on any day, or `None` once the whole
    /// calendar is spoken for.
    pub fn next_free_time(&self) -> Option<DayTime> {
        self.days
            .iter()
            .find_map(|d| d.earliest_free().map(|s| DayTime::from_parts(d.day(), s.start)))
    }

    /// Fill every free minute before `time` with `Nothing`.  Idempotent.
    pub fn backfill_until(&mut self, time: DayTime) -> ScheduleResult<()> {
        let last = (time.day() as usize).min(self.days.len());
        for day in &mut self.days[..last] {
            let span = day.span();
            day.backfill_until(span)?;
        }
        if let Some(day) = self.days.get_mut(time.day() as usize) {
            day.backfill_until(time.minute())?;
        }
        Ok(())
    }

    // ── Work placement ────────────────────────────────────────────────────

    /// Schedule the rest of `ticket`'s active iteration as early as possible.
    ///
    /// Each stretch of work is preceded by a context switch of 10 to 30
    /// minutes.  Work that does not fit in a slot continues in the next free
    /// slot, marked as resumed.  Returns the minute the iteration completes;
    /// the finished iteration is popped from the ticket.
    ///
    /// On `CapacityExceeded` the minutes already placed stay placed and are
    /// recorded on the ticket.
    pub fn add_work(&mut self, ticket: &mut Ticket, rng: &mut WorkerRng) -> ScheduleResult<DayTime> {
        let id = ticket.id;
        let stage = ticket
            .state()
            .stage()
            .filter(|s| s.role() == self.role)
            .ok_or(ScheduleError::WrongStage { ticket: id, role: self.role, state: ticket.state() })?;

        let redundant = match stage {
            WorkStage::Programming => !ticket.is_first_iteration(),
            WorkStage::CodeReview | WorkStage::Checking => !ticket.is_final_iteration(stage),
            WorkStage::Automation => false,
        };
        let (mut remaining, mut resumed) = match ticket.current_iteration(stage) {
            Some(it) if it.time_remaining() > 0 => (it.time_remaining(), it.is_started()),
            _ => return Err(ScheduleError::EmptyIteration(id)),
        };

        self.current_ticket = Some(id);
        let mut completion = DayTime::ZERO;

        while remaining > 0 {
            let Some(day) = self.days.iter_mut().find(|d| !d.is_full()) else {
                return Err(ScheduleError::CapacityExceeded { ticket: id, remaining });
            };
            let switch = rng.gen_range(MIN_CONTEXT_SWITCH..=MAX_CONTEXT_SWITCH);
            let work = TicketWork { ticket: id, stage, redundant, resumed };
            let Some(piece) = day.place_work_piece(switch, remaining, work)? else {
                return Err(ScheduleError::CapacityExceeded { ticket: id, remaining });
            };
            if piece.minutes == 0 {
                continue;
            }

            if let Some(it) = ticket.current_iteration_mut(stage) {
                it.progress(piece.minutes);
            }
            ticket.record_work(stage, piece.minutes);
            remaining -= piece.minutes;
            resumed = true;
            completion = DayTime::from_parts(day.day(), piece.end);
        }

        ticket.finish_iteration(stage);
        tracing::trace!(ticket = %id, ?stage, redundant, %completion, "iteration scheduled");
        Ok(completion)
    }
}

/// Spread sprint planning over the earliest free slots from the first sprint
/// day onwards.
fn place_planning(days: &mut [DayCalendar]) -> ScheduleResult<()> {
    let last_day = days.last().map_or(0, DayCalendar::day);
    let mut remaining = PLANNING_MINUTES;
    for day in days {
        while remaining > 0 {
            let Some(slot) = day.earliest_free().copied() else {
                break;
            };
            let minutes = remaining.min(slot.duration());
            day.place(Event::meeting(day.day(), slot.start, minutes, MeetingKind::Planning))?;
            remaining -= minutes;
        }
        if remaining == 0 {
            return Ok(());
        }
    }
    Err(ScheduleError::SchedulingConflict { day: last_day, start: 0, end: remaining })
}
