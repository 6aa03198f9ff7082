//! Sources of new tickets.
//!
//! The simulation asks a [`TicketGenerator`] for a fresh ticket whenever a
//! programmer has nothing in the pools to pick up.  Two implementations ship
//! here: [`RandomTicketGenerator`] draws plausible effort figures from the
//! run configuration, and [`FixedTicketGenerator`] replays fixed templates
//! for scripted scenarios and tests.

use rand_distr::{Distribution, Gamma, Poisson};
use sprint_core::{SimConfig, SimRng, TicketId};

use crate::{Ticket, WorkPlan, WorkflowError, WorkflowResult};

/// Produces fully populated tickets on demand.
pub trait TicketGenerator {
    /// Build the ticket that will carry `id`.
    fn next_ticket(&mut self, id: TicketId) -> WorkflowResult<Ticket>;
}

// ── FixedTicketGenerator ──────────────────────────────────────────────────────

/// Cycles through a list of `(priority, plan)` templates.
pub struct FixedTicketGenerator {
    templates: Vec<(u32, WorkPlan)>,
    next:      usize,
}

impl FixedTicketGenerator {
    /// Every ticket gets the same priority and plan.
    pub fn new(priority: u32, plan: WorkPlan) -> Self {
        Self::cycle(vec![(priority, plan)])
    }

    /// Hand out the templates in order, wrapping around at the end.
    ///
    /// An empty list yields tickets that fail validation.
    pub fn cycle(templates: Vec<(u32, WorkPlan)>) -> Self {
        Self { templates, next: 0 }
    }
}

impl TicketGenerator for FixedTicketGenerator {
    fn next_ticket(&mut self, id: TicketId) -> WorkflowResult<Ticket> {
        let (priority, plan) = match self.templates.get(self.next) {
            Some((p, plan)) => (*p, plan.clone()),
            None => (0, WorkPlan::default()),
        };
        if !self.templates.is_empty() {
            self.next = (self.next + 1) % self.templates.len();
        }
        Ticket::new(id, priority, plan)
    }
}

// ── RandomTicketGenerator ─────────────────────────────────────────────────────

/// Longest a full code review can take, in hours.
const MAX_CODE_REVIEW_HOURS: f64 = 1.0;

/// Floor on programming, checking and automation iterations, in minutes.
const MIN_WORK_MINUTES: u32 = 30;

/// Floor on code-review iterations, in minutes.
const MIN_REVIEW_MINUTES: u32 = 5;

/// Base effort, as a percentage of the configured maximum.
const EFFORT_SHAPE: f64 = 3.0;
const EFFORT_RATE: f64 = 0.1;

/// Fix effort, as a fraction of the base iteration.
const FIX_SHAPE: f64 = 1.0;
const FIX_RATE: f64 = 5.0;

/// Draws effort figures from skewed distributions.
///
/// - Initial programming, full check and full review: `Gamma(3, rate 0.1)`
///   read as a percentage of the configured maximum, so most tickets land
///   near 30% of it.
/// - Fixes after a pass back: `Gamma(1, rate 5)` as a fraction of the base
///   iteration, capped at the base.
/// - Automation: the same `Gamma(3, 0.1)` mirrored, so automation trends
///   towards its maximum.
/// - Pass-back count: `Poisson(average_pass_back_count)`.
/// - Priority: uniform in `0..=100`.
pub struct RandomTicketGenerator {
    rng:                      SimRng,
    effort:                   Gamma<f64>,
    fix_share:                Gamma<f64>,
    /// `None` when the configured mean is zero: tickets never bounce.
    pass_backs:               Option<Poisson<f64>>,
    max_initial_programming:  f64,
    max_full_check:           f64,
    max_automation:           f64,
}

impl RandomTicketGenerator {
    pub fn new(config: &SimConfig, rng: SimRng) -> WorkflowResult<Self> {
        let effort = Gamma::new(EFFORT_SHAPE, 1.0 / EFFORT_RATE)
            .map_err(|e| WorkflowError::Distribution { name: "effort", reason: e.to_string() })?;
        let fix_share = Gamma::new(FIX_SHAPE, 1.0 / FIX_RATE)
            .map_err(|e| WorkflowError::Distribution { name: "fix", reason: e.to_string() })?;
        let mean = config.average_pass_back_count;
        let pass_backs = if mean == 0.0 {
            None
        } else {
            let dist = Poisson::new(mean)
                .map_err(|e| WorkflowError::Distribution { name: "pass-back", reason: e.to_string() })?;
            Some(dist)
        };
        Ok(Self {
            rng,
            effort,
            fix_share,
            pass_backs,
            max_initial_programming: config.max_initial_programmer_work_hours,
            max_full_check:          config.max_full_run_tester_work_hours,
            max_automation:          config.max_qa_automation_hours,
        })
    }

    fn pass_back_count(&mut self) -> u32 {
        match &self.pass_backs {
            Some(dist) => dist.sample(self.rng.inner()) as u32,
            None => 0,
        }
    }

    // ── Effort samples ────────────────────────────────────────────────────

    fn base_minutes(&mut self, max_hours: f64, floor: u32) -> u32 {
        let share = (self.effort.sample(self.rng.inner()) / 100.0).min(1.0);
        let cap = (max_hours * 60.0).round() as u32;
        ((max_hours * share * 60.0).round() as u32 + floor).min(cap).max(1)
    }

    fn fix_minutes(&mut self, base: u32, floor: u32) -> u32 {
        let share = self.fix_share.sample(self.rng.inner());
        ((base as f64 * share).round() as u32 + floor).min(base)
    }

    fn automation_minutes(&mut self) -> u32 {
        let share = (1.0 - self.effort.sample(self.rng.inner()) / 100.0).max(0.0);
        (self.max_automation * share * 60.0).round() as u32 + MIN_WORK_MINUTES
    }
}

impl TicketGenerator for RandomTicketGenerator {
    fn next_ticket(&mut self, id: TicketId) -> WorkflowResult<Ticket> {
        let pass_backs = self.pass_back_count();
        let initial = self.base_minutes(self.max_initial_programming, MIN_WORK_MINUTES);
        let full_check = self.base_minutes(self.max_full_check, MIN_WORK_MINUTES);
        let full_review = self.base_minutes(MAX_CODE_REVIEW_HOURS, MIN_REVIEW_MINUTES);

        let mut plan = WorkPlan {
            programming: vec![initial],
            ..WorkPlan::default()
        };
        for _ in 0..pass_backs {
            let fix = self.fix_minutes(initial, MIN_WORK_MINUTES);
            plan.programming.push(fix);
            let review = self.fix_minutes(full_review, MIN_REVIEW_MINUTES);
            plan.code_review.push(review);
            let check = self.fix_minutes(full_check, MIN_WORK_MINUTES);
            plan.checking.push(check);
        }
        plan.code_review.push(full_review);
        plan.checking.push(full_check);
        plan.automation.push(self.automation_minutes());

        let priority = (self.rng.unit() * 100.0).round() as u32;
        Ticket::new(id, priority, plan)
    }
}
