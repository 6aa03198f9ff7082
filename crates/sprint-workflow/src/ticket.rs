//! Tickets, their per-stage work queues, and their workflow state.

use std::collections::VecDeque;

use sprint_core::{Role, TicketId, WorkerId};

use crate::{WorkIteration, WorkflowError, WorkflowResult};

// ── WorkStage ─────────────────────────────────────────────────────────────────

/// The kind of work an iteration represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkStage {
    Programming,
    CodeReview,
    Checking,
    Automation,
}

impl WorkStage {
    pub const ALL: [WorkStage; 4] = [
        WorkStage::Programming,
        WorkStage::CodeReview,
        WorkStage::Checking,
        WorkStage::Automation,
    ];

    /// Which role performs this stage.
    pub fn role(self) -> Role {
        match self {
            WorkStage::Programming | WorkStage::CodeReview => Role::Programmer,
            WorkStage::Checking | WorkStage::Automation => Role::Tester,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

// ── WorkflowState ─────────────────────────────────────────────────────────────

/// Where a ticket is in its lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkflowState {
    Programming,
    CodeReview,
    Checking,
    Automation,
    Automated,
}

impl WorkflowState {
    /// The stage whose queue is active in this state.
    pub fn stage(self) -> Option<WorkStage> {
        match self {
            WorkflowState::Programming => Some(WorkStage::Programming),
            WorkflowState::CodeReview => Some(WorkStage::CodeReview),
            WorkflowState::Checking => Some(WorkStage::Checking),
            WorkflowState::Automation => Some(WorkStage::Automation),
            WorkflowState::Automated => None,
        }
    }
}

// ── WorkPlan ──────────────────────────────────────────────────────────────────

/// Iteration durations, in minutes, for each stage of a new ticket.
///
/// `checking` is ordered with the full run last; `programming` with the
/// initial implementation first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkPlan {
    pub programming: Vec<u32>,
    pub code_review: Vec<u32>,
    pub checking:    Vec<u32>,
    pub automation:  Vec<u32>,
}

// ── Ticket ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ticket {
    pub id:       TicketId,
    /// Lower numbers are more urgent.
    pub priority: u32,

    /// Programmer who wrote the ticket's code.
    pub programmer: Option<WorkerId>,
    /// Tester who claimed the ticket for QA.
    pub tester:     Option<WorkerId>,

    queues:             [VecDeque<WorkIteration>; 4],
    state:              WorkflowState,
    pass_backs:         u32,
    stalled:            bool,
    planned:            [u32; 4],
    worked:             [u32; 4],
    full_check_minutes: u32,
}

impl Ticket {
    /// Build a ticket in the `Programming` state.
    ///
    /// Programming, checking and automation each need at least one
    /// iteration, and no iteration may be zero minutes long.  There must be a
    /// programming iteration for every checking iteration, since each check
    /// but the last sends the ticket back for a fix.  Code review may be
    /// empty, in which case review is skipped.
    pub fn new(id: TicketId, priority: u32, plan: WorkPlan) -> WorkflowResult<Ticket> {
        let invalid = |reason: &str| WorkflowError::InvalidTicket { id, reason: reason.to_string() };

        if plan.programming.is_empty() {
            return Err(invalid("no programming iterations"));
        }
        if plan.checking.is_empty() {
            return Err(invalid("no checking iterations"));
        }
        if plan.automation.is_empty() {
            return Err(invalid("no automation iterations"));
        }
        if plan.programming.len() < plan.checking.len() {
            return Err(invalid("every failed check needs a programming fix"));
        }
        let lists = [plan.programming, plan.code_review, plan.checking, plan.automation];
        if lists.iter().flatten().any(|&m| m == 0) {
            return Err(invalid("zero-minute iteration"));
        }

        let full_check_minutes = lists[WorkStage::Checking.slot()].last().copied().unwrap_or(0);
        let planned = [0, 1, 2, 3].map(|i| lists[i].iter().sum::<u32>());
        let queues = lists.map(|l| l.into_iter().map(WorkIteration::new).collect());

        Ok(Ticket {
            id,
            priority,
            programmer: None,
            tester: None,
            queues,
            state: WorkflowState::Programming,
            pass_backs: 0,
            stalled: false,
            planned,
            worked: [0; 4],
            full_check_minutes,
        })
    }

    // ── State ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WorkflowState) {
        self.state = state;
    }

    #[inline]
    pub fn pass_backs(&self) -> u32 {
        self.pass_backs
    }

    pub(crate) fn record_pass_back(&mut self) {
        self.pass_backs += 1;
    }

    /// True until QA first sends the ticket back.
    #[inline]
    pub fn is_first_iteration(&self) -> bool {
        self.pass_backs == 0
    }

    #[inline]
    pub fn needs_code_review(&self) -> bool {
        self.state == WorkflowState::CodeReview
    }

    #[inline]
    pub fn needs_automation(&self) -> bool {
        self.state != WorkflowState::Automated
    }

    /// Passed QA this sprint, whether or not automation has finished.
    #[inline]
    pub fn reached_done(&self) -> bool {
        matches!(self.state, WorkflowState::Automation | WorkflowState::Automated)
    }

    /// Set when a worker ran out of calendar while holding this ticket.
    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub(crate) fn mark_stalled(&mut self) {
        self.stalled = true;
    }

    // ── Work queues ───────────────────────────────────────────────────────

    pub fn queue(&self, stage: WorkStage) -> &VecDeque<WorkIteration> {
        &self.queues[stage.slot()]
    }

    /// The iteration currently being worked for `stage`.
    pub fn current_iteration(&self, stage: WorkStage) -> Option<&WorkIteration> {
        self.queues[stage.slot()].front()
    }

    pub fn current_iteration_mut(&mut self, stage: WorkStage) -> Option<&mut WorkIteration> {
        self.queues[stage.slot()].front_mut()
    }

    /// True when no iteration follows the current one in `stage`.
    pub fn is_final_iteration(&self, stage: WorkStage) -> bool {
        self.queues[stage.slot()].len() <= 1
    }

    /// Pop the current iteration once all its minutes have been placed.
    pub fn finish_iteration(&mut self, stage: WorkStage) -> Option<WorkIteration> {
        let queue = &mut self.queues[stage.slot()];
        if queue.front().is_some_and(WorkIteration::is_complete) {
            queue.pop_front()
        } else {
            None
        }
    }

    /// Drop the current iteration without working it.  Its minutes no longer
    /// count as planned work.
    pub fn discard_iteration(&mut self, stage: WorkStage) -> Option<WorkIteration> {
        let dropped = self.queues[stage.slot()].pop_front()?;
        self.planned[stage.slot()] -= dropped.original_time();
        Some(dropped)
    }

    // ── Bookkeeping ───────────────────────────────────────────────────────

    pub fn record_work(&mut self, stage: WorkStage, minutes: u32) {
        self.worked[stage.slot()] += minutes;
    }

    pub fn planned_minutes(&self, stage: WorkStage) -> u32 {
        self.planned[stage.slot()]
    }

    pub fn worked_minutes(&self, stage: WorkStage) -> u32 {
        self.worked[stage.slot()]
    }

    /// Minutes not yet placed across every iteration of `stage`.
    pub fn remaining_minutes(&self, stage: WorkStage) -> u32 {
        self.queues[stage.slot()].iter().map(WorkIteration::time_remaining).sum()
    }

    /// Length of a complete manual check once the ticket works.
    #[inline]
    pub fn full_check_minutes(&self) -> u32 {
        self.full_check_minutes
    }

    /// Share of planned programming and review minutes actually worked, in
    /// `[0, 1]`.
    pub fn development_fraction(&self) -> f64 {
        let planned = self.planned_minutes(WorkStage::Programming)
            + self.planned_minutes(WorkStage::CodeReview);
        if planned == 0 {
            return 1.0;
        }
        let worked = self.worked_minutes(WorkStage::Programming)
            + self.worked_minutes(WorkStage::CodeReview);
        (worked as f64 / planned as f64).clamp(0.0, 1.0)
    }
}
