//! Free-slot bookkeeping for one worker's day.

use sprint_core::DAY_MINUTES;

use crate::{Event, EventKind, ScheduleError, ScheduleResult, TicketWork};

/// Gaps at most this long are filled with `Nothing` instead of staying free.
const FILLER_THRESHOLD: u32 = 30;

// ── TimeSlot ──────────────────────────────────────────────────────────────────

/// A free interval `[start, end)` within a day.
///
/// `insertion_index` is where an event placed in this slot belongs in the
/// day's event list.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSlot {
    pub start:           u32,
    pub end:             u32,
    pub insertion_index: usize,
}

impl TimeSlot {
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, start: u32, end: u32) -> bool {
        self.start <= start && end <= self.end
    }
}

/// What [`DayCalendar::place_work_piece`] managed to fit.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct WorkPiece {
    /// Minutes of ticket work placed (zero if the switch used the whole slot).
    pub minutes: u32,
    /// Minute within the day at which the piece ends.
    pub end:     u32,
}

// ── DayCalendar ───────────────────────────────────────────────────────────────

/// One worker's day: events in time order plus the free slots between them.
#[derive(Clone, Debug)]
pub struct DayCalendar {
    day:    u32,
    span:   u32,
    events: Vec<Event>,
    free:   Vec<TimeSlot>,
}

impl DayCalendar {
    /// A full, empty workday.
    pub fn new(day: u32) -> Self {
        Self::with_span(day, DAY_MINUTES)
    }

    /// An empty calendar covering `[0, span)`.
    pub fn with_span(day: u32, span: u32) -> Self {
        let free = if span > 0 {
            vec![TimeSlot { start: 0, end: span, insertion_index: 0 }]
        } else {
            Vec::new()
        };
        Self { day, span, events: Vec::new(), free }
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[inline]
    pub fn span(&self) -> u32 {
        self.span
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Free slots in start order.
    pub fn free_slots(&self) -> &[TimeSlot] {
        &self.free
    }

    pub fn earliest_free(&self) -> Option<&TimeSlot> {
        self.free.first()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn free_minutes(&self) -> u32 {
        self.free.iter().map(TimeSlot::duration).sum()
    }

    // ── Placement ─────────────────────────────────────────────────────────

    /// Insert `event` into the free slot that fully contains it.
    ///
    /// Slack on either side of the event becomes `Nothing` when it is
    /// 30 minutes or shorter, and a new free slot otherwise.
    /// Slack after a context switch always stays free so the work that
    /// follows can start right away.
    pub fn place(&mut self, event: Event) -> ScheduleResult<()> {
        let end = event.end();
        let pos = self
            .free
            .iter()
            .position(|s| s.contains(event.start, end))
            .filter(|_| event.duration > 0)
            .ok_or(ScheduleError::SchedulingConflict { day: self.day, start: event.start, end })?;
        let slot = self.free[pos];
        let base = slot.insertion_index;

        let mut inserted: Vec<Event> = Vec::with_capacity(3);
        let mut replacement: Vec<TimeSlot> = Vec::with_capacity(2);

        let lead = event.start - slot.start;
        if lead > FILLER_THRESHOLD {
            replacement.push(TimeSlot { start: slot.start, end: event.start, insertion_index: base });
        } else if lead > 0 {
            inserted.push(Event::nothing(self.day, slot.start, lead));
        }

        inserted.push(Event { day: self.day, ..event });

        let trail = slot.end - end;
        let after_switch = matches!(event.kind, EventKind::ContextSwitch { .. });
        if trail > FILLER_THRESHOLD || (trail > 0 && after_switch) {
            replacement.push(TimeSlot {
                start:           end,
                end:             slot.end,
                insertion_index: base + inserted.len(),
            });
        } else if trail > 0 {
            inserted.push(Event::nothing(self.day, end, trail));
        }

        let added = inserted.len();
        self.events.splice(base..base, inserted);
        for later in &mut self.free[pos + 1..] {
            later.insertion_index += added;
        }
        self.free.splice(pos..=pos, replacement);
        Ok(())
    }

    /// Fill every free minute before `minute` with `Nothing`.
    ///
    /// Calling it again with the same or an earlier minute changes nothing.
    pub fn backfill_until(&mut self, minute: u32) -> ScheduleResult<()> {
        while let Some(slot) = self.free.first().copied().filter(|s| s.start < minute) {
            let end = slot.end.min(minute);
            self.place(Event::nothing(self.day, slot.start, end - slot.start))?;
        }
        Ok(())
    }

    /// Fill every remaining free slot with events of `kind`.
    pub fn fill_free_with(&mut self, kind: EventKind) -> ScheduleResult<()> {
        while let Some(slot) = self.free.first().copied() {
            self.place(Event::new(self.day, slot.start, slot.duration(), kind))?;
        }
        Ok(())
    }

    /// Put a context switch of up to `switch` minutes at the start of the
    /// earliest free slot, then as much of `minutes` of `work` as fits in the
    /// rest of that slot.
    ///
    /// Returns `None` if the day has no free slot.
    pub fn place_work_piece(
        &mut self,
        switch:  u32,
        minutes: u32,
        work:    TicketWork,
    ) -> ScheduleResult<Option<WorkPiece>> {
        let Some(slot) = self.earliest_free().copied() else {
            return Ok(None);
        };
        let switch = switch.clamp(1, slot.duration());
        self.place(Event::new(self.day, slot.start, switch, EventKind::ContextSwitch { ticket: work.ticket }))?;

        let start = slot.start + switch;
        let minutes = minutes.min(slot.end - start);
        if minutes > 0 {
            self.place(Event::new(self.day, start, minutes, EventKind::TicketWork(work)))?;
        }
        Ok(Some(WorkPiece { minutes, end: start + minutes }))
    }
}
