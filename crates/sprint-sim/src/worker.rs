//! A programmer or tester and their calendar.

use sprint_core::{DayTime, Role, TicketId, WorkerId, WorkerRng};
use sprint_schedule::{ScheduleResult, WorkerCalendar};
use sprint_workflow::Ticket;

pub struct Worker {
    pub id:       WorkerId,
    pub role:     Role,
    /// Display name such as `Tester #1`.
    pub name:     String,
    pub calendar: WorkerCalendar,
    completion:   Option<DayTime>,
    retired:      bool,
    rng:          WorkerRng,
}

impl Worker {
    pub fn new(id: WorkerId, role: Role, name: String, calendar: WorkerCalendar, rng: WorkerRng) -> Self {
        Self { id, role, name, calendar, completion: None, retired: false, rng }
    }

    /// When the iteration the worker is on will be finished.
    #[inline]
    pub fn completion(&self) -> Option<DayTime> {
        self.completion
    }

    #[inline]
    pub fn held_ticket(&self) -> Option<TicketId> {
        self.calendar.current_ticket()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.held_ticket().is_none() && !self.retired
    }

    /// Whether the worker can pick up work at `now`.
    pub fn is_available_at(&self, now: DayTime) -> bool {
        self.is_idle() && self.calendar.next_free_time().is_some_and(|t| t <= now)
    }

    /// No pending completion and no free time left this sprint.
    pub fn is_exhausted(&self) -> bool {
        self.retired || (self.completion.is_none() && self.calendar.next_free_time().is_none())
    }

    /// The next moment after `now` this worker needs attention, if any.
    ///
    /// A pending completion always comes first.  Idle workers whose free time
    /// has already arrived are waiting for work and contribute nothing.
    pub fn next_check_in(&self, now: DayTime) -> Option<DayTime> {
        if self.retired {
            return None;
        }
        match self.completion {
            Some(done) => Some(done),
            None => self.calendar.next_free_time().filter(|&t| t > now),
        }
    }

    /// Schedule the active iteration of `ticket` and hold it until done.
    pub fn assign(&mut self, ticket: &mut Ticket) -> ScheduleResult<DayTime> {
        let done = self.calendar.add_work(ticket, &mut self.rng)?;
        self.completion = Some(done);
        Ok(done)
    }

    /// Hand back the held ticket once its iteration completes.
    pub fn harvest(&mut self) -> Option<TicketId> {
        self.completion = None;
        self.calendar.release_ticket()
    }

    /// Stop scheduling this worker for the rest of the sprint and hand back
    /// whatever they were holding.
    pub fn retire(&mut self) -> Option<TicketId> {
        self.retired = true;
        self.completion = None;
        self.calendar.release_ticket()
    }
}
