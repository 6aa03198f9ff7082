//! Per-worker, per-category minute counts over time.
//!
//! Every minute a worker spends in an event is stamped with the absolute
//! minute at which it ends (`start + 1 ..= start + duration`).  Stamps are
//! appended in time order, so "minutes spent up to `T`" is the number of
//! stamps at or before `T`, found by binary search.

use sprint_core::{DayTime, TicketId};
use sprint_schedule::{Event, EventKind, MetricCategory};

#[derive(Clone, Debug, Default)]
pub struct MinuteLedger {
    stamps: [Vec<u32>; MetricCategory::COUNT],
}

impl MinuteLedger {
    /// Build from a worker's events in time order.
    ///
    /// `reached_done` decides whether work on a ticket counts as fluff (the
    /// ticket never passed QA) or not.
    pub fn from_events<'a>(
        events:       impl IntoIterator<Item = &'a Event>,
        reached_done: impl Fn(TicketId) -> bool,
    ) -> Self {
        let mut ledger = Self::default();
        for event in events {
            for &category in event.categories() {
                ledger.stamp(category, event);
            }
            let EventKind::TicketWork(work) = event.kind else {
                continue;
            };
            if let Some((fluff, non_fluff)) = MetricCategory::fluff_split(work.stage) {
                let category = if reached_done(work.ticket) { non_fluff } else { fluff };
                ledger.stamp(category, event);
            }
        }
        ledger
    }

    fn stamp(&mut self, category: MetricCategory, event: &Event) {
        let start = event.start_time().0;
        self.stamps[category.index()].extend(start + 1..=start + event.duration);
    }

    /// Minutes spent in `category` up to and including minute `at`.
    pub fn minutes_at(&self, category: MetricCategory, at: DayTime) -> u32 {
        self.stamps[category.index()].partition_point(|&m| m <= at.0) as u32
    }

    /// Minutes spent in `category` over the whole run.
    pub fn total(&self, category: MetricCategory) -> u32 {
        self.stamps[category.index()].len() as u32
    }
}
