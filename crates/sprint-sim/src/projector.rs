//! Sustainability projection.
//!
//! # Model
//!
//! Every ticket that was not automated this sprint leaves regression checks
//! behind that someone will have to run by hand, and automation that will
//! have to happen later.  The projector tries to fit that owed work into the
//! idle time testers actually had this sprint:
//!
//! 1. Each tester's adjacent `Nothing` events (within one day) are merged
//!    into blocks, each treated as an empty calendar of its own.
//! 2. For every unautomated ticket, with `f` the share of its programming and
//!    review actually done:
//!    - checking owed   = `round(f × full check minutes)`
//!    - automation owed = `round(f × automation minutes not yet worked)`
//! 3. Owed work goes into the owning tester's blocks first (context switch
//!    included), then into the blocks of whichever tester has the most idle
//!    time left.
//! 4. `r` = unscheduled owed minutes / owed minutes.
//!
//! With `r > 0`, the testers' ticket time shrinks each future sprint by
//! `r × pool × (1 − check_refinement)` until it drops below a quarter of a
//! full check.  The number of sprints that takes is the projection.

use std::fmt;

use sprint_core::{SimConfig, SimRng, WorkerId};
use sprint_schedule::{DayCalendar, EventKind, ScheduleResult, TicketWork, WorkerCalendar};
use sprint_workflow::{Pool, WorkStage, WorkflowRouter, WorkflowState};

/// Bounds, in minutes, of the context switch before each block of catch-up.
const MIN_CONTEXT_SWITCH: u32 = 10;
const MAX_CONTEXT_SWITCH: u32 = 30;

/// Smallest useful check, as a share of a full run.
const MIN_VIABLE_CHECK_SHARE: f64 = 0.25;

// ── Projection ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Projection {
    /// Testers kept up; no deadlock in sight.
    Sustainable,
    /// Nothing passed QA this sprint, so there is nothing to extrapolate from.
    InsufficientData,
    /// Sprints until testers can no longer fit even a minimal check.
    SprintsUntilDeadlock(u32),
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Sustainable => f.write_str("sustainable"),
            Projection::InsufficientData => f.write_str("insufficient data"),
            Projection::SprintsUntilDeadlock(n) => write!(f, "deadlock in {n} sprints"),
        }
    }
}

/// The projection plus the figures it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionReport {
    pub projection:          Projection,
    /// Unscheduled share of owed minutes, in `[0, 1]`.
    pub growth_rate:         f64,
    pub owed_minutes:        u32,
    pub unscheduled_minutes: u32,
    /// Testers' ticket, context-switch and idle minutes over the sprint days.
    pub tester_pool_minutes: u32,
}

// ── SustainabilityProjector ───────────────────────────────────────────────────

pub struct SustainabilityProjector<'a> {
    config: &'a SimConfig,
}

/// One tester's idle blocks.
struct Blocks {
    owner:  WorkerId,
    blocks: Vec<DayCalendar>,
}

impl Blocks {
    fn capacity(&self) -> u32 {
        self.blocks.iter().map(DayCalendar::free_minutes).sum()
    }

    /// Place up to `minutes` of `work`; return what did not fit.
    fn absorb(&mut self, mut minutes: u32, work: TicketWork, rng: &mut SimRng) -> ScheduleResult<u32> {
        for block in &mut self.blocks {
            while minutes > 0 {
                let switch = rng.gen_range(MIN_CONTEXT_SWITCH..=MAX_CONTEXT_SWITCH);
                let Some(piece) = block.place_work_piece(switch, minutes, work)? else {
                    break;
                };
                minutes -= piece.minutes;
            }
            if minutes == 0 {
                break;
            }
        }
        Ok(minutes)
    }
}

impl<'a> SustainabilityProjector<'a> {
    pub fn new(config: &'a SimConfig) -> Self {
        Self { config }
    }

    /// Project from the testers' finished calendars and the closed pools.
    pub fn project<'c>(
        &self,
        testers: impl IntoIterator<Item = (WorkerId, &'c WorkerCalendar)>,
        router:  &WorkflowRouter,
        rng:     &mut SimRng,
    ) -> ScheduleResult<ProjectionReport> {
        let testers: Vec<(WorkerId, &WorkerCalendar)> = testers.into_iter().collect();
        let tester_pool_minutes = self.tester_pool_minutes(&testers);
        let mut blocks: Vec<Blocks> = testers
            .iter()
            .map(|&(owner, cal)| Blocks { owner, blocks: idle_blocks(cal) })
            .collect();

        let mut owed_minutes = 0;
        let mut unscheduled_minutes = 0;
        for ticket in router.tickets().filter(|t| t.state() != WorkflowState::Automated) {
            let f = ticket.development_fraction();
            let owed = [
                (WorkStage::Checking, (f * ticket.full_check_minutes() as f64).round() as u32),
                (WorkStage::Automation, (f * ticket.remaining_minutes(WorkStage::Automation) as f64).round() as u32),
            ];
            for (stage, minutes) in owed.into_iter().filter(|&(_, m)| m > 0) {
                owed_minutes += minutes;
                let work = TicketWork { ticket: ticket.id, stage, redundant: false, resumed: false };
                let mut left = minutes;
                if let Some(own) = blocks.iter_mut().find(|b| Some(b.owner) == ticket.tester) {
                    left = own.absorb(left, work, rng)?;
                }
                if left > 0 {
                    if let Some(roomiest) = blocks.iter_mut().max_by_key(|b| b.capacity()) {
                        left = roomiest.absorb(left, work, rng)?;
                    }
                }
                unscheduled_minutes += left;
            }
        }

        let growth_rate = if owed_minutes == 0 {
            0.0
        } else {
            unscheduled_minutes as f64 / owed_minutes as f64
        };
        let projection = if router.pool(Pool::Done).is_empty() {
            Projection::InsufficientData
        } else if unscheduled_minutes == 0 {
            Projection::Sustainable
        } else {
            Projection::SprintsUntilDeadlock(self.sprints_until_deadlock(growth_rate, tester_pool_minutes))
        };

        Ok(ProjectionReport {
            projection,
            growth_rate,
            owed_minutes,
            unscheduled_minutes,
            tester_pool_minutes,
        })
    }

    /// Sprints the tester pool lasts while it shrinks by the refined growth
    /// rate each sprint and a minimal check still fits. Saturates at
    /// `u32::MAX` when the pool never runs out in countable time.
    pub fn sprints_until_deadlock(&self, growth_rate: f64, pool_minutes: u32) -> u32 {
        let min_check = MIN_VIABLE_CHECK_SHARE * self.config.max_full_run_tester_work_hours * 60.0;
        let shrink = growth_rate * (1.0 - self.config.check_refinement);
        let pool = pool_minutes as f64;
        if shrink <= 0.0 {
            return u32::MAX;
        }
        if pool < min_check {
            return 0;
        }
        if shrink >= 1.0 {
            return 1;
        }

        // Last sprint index `n` with `pool * (1 - shrink)^n >= min_check`.
        let fits = |n: f64| pool * (1.0 - shrink).powf(n) >= min_check;
        let mut last = ((pool / min_check).ln() / -(-shrink).ln_1p()).floor();
        if !last.is_finite() || last >= u32::MAX as f64 {
            return u32::MAX;
        }
        if last > 0.0 && !fits(last) {
            last -= 1.0;
        } else if fits(last + 1.0) {
            last += 1.0;
        }
        let sprints = last + 1.0;
        if sprints >= u32::MAX as f64 { u32::MAX } else { sprints as u32 }
    }

    fn tester_pool_minutes(&self, testers: &[(WorkerId, &WorkerCalendar)]) -> u32 {
        let first = self.config.first_sprint_day();
        testers
            .iter()
            .flat_map(|(_, cal)| cal.days().iter().filter(move |d| d.day() >= first))
            .flat_map(DayCalendar::events)
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::TicketWork(_) | EventKind::ContextSwitch { .. } | EventKind::Nothing
                )
            })
            .map(|e| e.duration)
            .sum()
    }
}

/// Merge each day's adjacent `Nothing` events into empty block calendars.
fn idle_blocks(calendar: &WorkerCalendar) -> Vec<DayCalendar> {
    let mut blocks = Vec::new();
    for day in calendar.days() {
        let mut run: Option<(u32, u32)> = None;
        for event in day.events() {
            run = match (run, event.is_nothing()) {
                (Some((start, end)), true) if end == event.start => Some((start, event.end())),
                (open, is_nothing) => {
                    if let Some((start, end)) = open {
                        blocks.push(DayCalendar::with_span(day.day(), end - start));
                    }
                    is_nothing.then(|| (event.start, event.end()))
                }
            };
        }
        if let Some((start, end)) = run {
            blocks.push(DayCalendar::with_span(day.day(), end - start));
        }
    }
    blocks
}
