//! Which tickets sat where, minute by minute.

use sprint_core::{DayTime, TicketId};
use sprint_workflow::{Pool, WorkflowRouter, WorkflowState};

/// Ticket locations at one moment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub in_development:      Vec<TicketId>,
    pub awaiting_review:     Vec<TicketId>,
    pub in_review:           Vec<TicketId>,
    pub awaiting_qa:         Vec<TicketId>,
    pub in_qa:               Vec<TicketId>,
    pub sent_back:           Vec<TicketId>,
    pub awaiting_automation: Vec<TicketId>,
    pub being_automated:     Vec<TicketId>,
    pub done:                Vec<TicketId>,
    pub automated:           Vec<TicketId>,
    pub unfinished:          Vec<TicketId>,
}

impl PoolSnapshot {
    /// Read the router's pools plus the tickets workers are holding.
    pub fn capture(router: &WorkflowRouter, held: impl IntoIterator<Item = TicketId>) -> Self {
        let pools = router.contents();
        let mut snap = PoolSnapshot {
            awaiting_review:     pools.get(Pool::CodeReview).to_vec(),
            awaiting_qa:         pools.get(Pool::Qa).to_vec(),
            sent_back:           pools.get(Pool::PassBack).to_vec(),
            awaiting_automation: pools.get(Pool::NeedsAutomation).to_vec(),
            done:                pools.get(Pool::Done).to_vec(),
            automated:           pools.get(Pool::Automated).to_vec(),
            unfinished:          pools.get(Pool::Unfinished).to_vec(),
            ..PoolSnapshot::default()
        };
        for id in held {
            let Some(ticket) = router.ticket(id) else { continue };
            let list = match ticket.state() {
                WorkflowState::Programming => &mut snap.in_development,
                WorkflowState::CodeReview => &mut snap.in_review,
                WorkflowState::Checking => &mut snap.in_qa,
                WorkflowState::Automation => &mut snap.being_automated,
                WorkflowState::Automated => continue,
            };
            list.push(id);
        }
        snap
    }

    /// Tickets somewhere between being started and passing QA.
    pub fn in_flight(&self) -> usize {
        self.in_development.len()
            + self.awaiting_review.len()
            + self.in_review.len()
            + self.awaiting_qa.len()
            + self.in_qa.len()
            + self.sent_back.len()
    }
}

/// Contiguous run of snapshots covering `[start, end)`.
#[derive(Clone, Debug)]
struct Segment {
    start:    DayTime,
    end:      DayTime,
    snapshot: PoolSnapshot,
}

/// Snapshots recorded between check-ins, covering the run without gaps.
#[derive(Clone, Debug, Default)]
pub struct PoolTimeline {
    segments: Vec<Segment>,
}

impl PoolTimeline {
    /// Record that `snapshot` held for `[start, end)`.  Empty ranges are
    /// ignored.
    pub fn record(&mut self, start: DayTime, end: DayTime, snapshot: PoolSnapshot) {
        if start < end {
            self.segments.push(Segment { start, end, snapshot });
        }
    }

    /// First minute not yet covered.
    pub fn covered_until(&self) -> DayTime {
        self.segments.last().map_or(DayTime::ZERO, |s| s.end)
    }

    /// Snapshot in effect at minute `at`.
    pub fn at(&self, at: DayTime) -> Option<&PoolSnapshot> {
        let idx = self.segments.partition_point(|s| s.end <= at);
        self.segments.get(idx).filter(|s| s.start <= at).map(|s| &s.snapshot)
    }

    /// `(start, end, snapshot)` for every recorded segment, in time order.
    pub fn segments(&self) -> impl Iterator<Item = (DayTime, DayTime, &PoolSnapshot)> {
        self.segments.iter().map(|s| (s.start, s.end, &s.snapshot))
    }
}
