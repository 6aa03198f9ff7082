//! Calendar events and the metric categories they count towards.

use sprint_core::{DayTime, TicketId};
use sprint_workflow::WorkStage;

// ── Event kinds ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeetingKind {
    Standup,
    Planning,
    Retro,
    Lunch,
    /// Anything supplied through custom events.
    Adhoc,
}

/// A stretch of work on one iteration of a ticket.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TicketWork {
    pub ticket:    TicketId,
    pub stage:     WorkStage,
    /// Rework caused by an earlier failed check (or a partial check or
    /// review that will have to be repeated).
    pub redundant: bool,
    /// Continues an iteration that was interrupted earlier.
    pub resumed:   bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Meeting(MeetingKind),
    /// Getting back into a ticket before working on it.
    ContextSwitch { ticket: TicketId },
    TicketWork(TicketWork),
    /// Time too short to start anything, or time spent idle.
    Nothing,
    RegressionTesting,
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// An occupied interval `[start, start + duration)` within one day.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub day:      u32,
    /// Minute within the day.
    pub start:    u32,
    pub duration: u32,
    pub kind:     EventKind,
}

impl Event {
    pub fn new(day: u32, start: u32, duration: u32, kind: EventKind) -> Self {
        Self { day, start, duration, kind }
    }

    pub fn meeting(day: u32, start: u32, duration: u32, kind: MeetingKind) -> Self {
        Self::new(day, start, duration, EventKind::Meeting(kind))
    }

    pub fn nothing(day: u32, start: u32, duration: u32) -> Self {
        Self::new(day, start, duration, EventKind::Nothing)
    }

    /// Minute within the day just past the event.
    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.duration
    }

    #[inline]
    pub fn start_time(&self) -> DayTime {
        DayTime::from_parts(self.day, self.start)
    }

    #[inline]
    pub fn end_time(&self) -> DayTime {
        DayTime::from_parts(self.day, self.end())
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self.kind, EventKind::Nothing)
    }

    #[inline]
    pub fn is_context_switch(&self) -> bool {
        matches!(self.kind, EventKind::ContextSwitch { .. })
    }

    /// The ticket this event belongs to, if any.
    pub fn ticket(&self) -> Option<TicketId> {
        match self.kind {
            EventKind::ContextSwitch { ticket } => Some(ticket),
            EventKind::TicketWork(w) => Some(w.ticket),
            _ => None,
        }
    }

    /// Fixed categories this event's minutes count towards.
    ///
    /// Fluff and non-fluff splits depend on how the ticket ended up, so they
    /// are not included here; see [`MetricCategory::fluff_split`].
    pub fn categories(&self) -> &'static [MetricCategory] {
        use MetricCategory as M;
        match self.kind {
            EventKind::Meeting(_) => &[M::Meeting],
            EventKind::ContextSwitch { .. } => &[M::ContextSwitching],
            EventKind::Nothing => &[M::Nothing],
            EventKind::RegressionTesting => &[M::RegressionTesting],
            EventKind::TicketWork(w) => match (w.stage, w.redundant) {
                (WorkStage::Programming, false) => {
                    &[M::ProductiveTicketWork, M::Programming, M::ProductiveProgramming]
                }
                (WorkStage::Programming, true) => {
                    &[M::RedundantTicketWork, M::Programming, M::RedundantProgramming]
                }
                (WorkStage::CodeReview, false) => {
                    &[M::ProductiveTicketWork, M::CodeReview, M::ProductiveCodeReview]
                }
                (WorkStage::CodeReview, true) => {
                    &[M::RedundantTicketWork, M::CodeReview, M::RedundantCodeReview]
                }
                (WorkStage::Checking, false) => {
                    &[M::ProductiveTicketWork, M::Checking, M::ProductiveChecking]
                }
                (WorkStage::Checking, true) => {
                    &[M::RedundantTicketWork, M::Checking, M::RedundantChecking]
                }
                (WorkStage::Automation, _) => &[M::ProductiveTicketWork, M::Automation],
            },
        }
    }
}

// ── MetricCategory ────────────────────────────────────────────────────────────

/// Buckets a worker's minutes are counted in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricCategory {
    Meeting,
    ContextSwitching,
    ProductiveTicketWork,
    RedundantTicketWork,
    Programming,
    ProductiveProgramming,
    RedundantProgramming,
    FluffProgramming,
    NonFluffProgramming,
    CodeReview,
    ProductiveCodeReview,
    RedundantCodeReview,
    FluffCodeReview,
    NonFluffCodeReview,
    Checking,
    ProductiveChecking,
    RedundantChecking,
    FluffChecking,
    NonFluffChecking,
    Automation,
    RegressionTesting,
    Nothing,
}

impl MetricCategory {
    pub const COUNT: usize = 22;

    pub const ALL: [MetricCategory; Self::COUNT] = [
        MetricCategory::Meeting,
        MetricCategory::ContextSwitching,
        MetricCategory::ProductiveTicketWork,
        MetricCategory::RedundantTicketWork,
        MetricCategory::Programming,
        MetricCategory::ProductiveProgramming,
        MetricCategory::RedundantProgramming,
        MetricCategory::FluffProgramming,
        MetricCategory::NonFluffProgramming,
        MetricCategory::CodeReview,
        MetricCategory::ProductiveCodeReview,
        MetricCategory::RedundantCodeReview,
        MetricCategory::FluffCodeReview,
        MetricCategory::NonFluffCodeReview,
        MetricCategory::Checking,
        MetricCategory::ProductiveChecking,
        MetricCategory::RedundantChecking,
        MetricCategory::FluffChecking,
        MetricCategory::NonFluffChecking,
        MetricCategory::Automation,
        MetricCategory::RegressionTesting,
        MetricCategory::Nothing,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `(fluff, non_fluff)` categories for a stage, where fluff means work on
    /// a ticket that never passed QA.  Automation has no split.
    pub fn fluff_split(stage: WorkStage) -> Option<(MetricCategory, MetricCategory)> {
        match stage {
            WorkStage::Programming => {
                Some((MetricCategory::FluffProgramming, MetricCategory::NonFluffProgramming))
            }
            WorkStage::CodeReview => {
                Some((MetricCategory::FluffCodeReview, MetricCategory::NonFluffCodeReview))
            }
            WorkStage::Checking => {
                Some((MetricCategory::FluffChecking, MetricCategory::NonFluffChecking))
            }
            WorkStage::Automation => None,
        }
    }
}
