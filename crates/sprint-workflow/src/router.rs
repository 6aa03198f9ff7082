//! Workflow pools and the policy for moving tickets between them.
//!
//! # Pools
//!
//! | Pool              | Holds                                          | Claimed by  |
//! |-------------------|------------------------------------------------|-------------|
//! | `CodeReview`      | programmed tickets awaiting a peer's review    | programmer  |
//! | `Qa`              | tickets ready for a manual check               | tester      |
//! | `PassBack`        | tickets QA sent back to their author           | programmer  |
//! | `NeedsAutomation` | checked tickets whose checks are not automated | tester      |
//! | `Done`            | every ticket that passed QA (record)           | none        |
//! | `Automated`       | every ticket whose checks were automated       | none        |
//! | `Unfinished`      | tickets that missed the sprint (record)        | none        |
//!
//! Ticket data lives in one arena keyed by `TicketId`; pools hold ids only.
//! A claimed ticket is removed from its pool and belongs to the claiming
//! worker until its iteration is routed back in.

use std::collections::BTreeMap;

use sprint_core::{Role, TicketId, WorkerId};

use crate::{Ticket, TicketGenerator, WorkStage, WorkflowError, WorkflowResult, WorkflowState};

/// Generated ticket numbers start here.
const FIRST_TICKET_NUMBER: u32 = 100;

// ── Pool ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pool {
    CodeReview,
    Qa,
    PassBack,
    NeedsAutomation,
    Done,
    Automated,
    Unfinished,
}

impl Pool {
    pub const ALL: [Pool; 7] = [
        Pool::CodeReview,
        Pool::Qa,
        Pool::PassBack,
        Pool::NeedsAutomation,
        Pool::Done,
        Pool::Automated,
        Pool::Unfinished,
    ];

    /// Whether workers take tickets out of this pool.
    pub fn is_claimable(self) -> bool {
        matches!(self, Pool::CodeReview | Pool::Qa | Pool::PassBack | Pool::NeedsAutomation)
    }
}

/// Point-in-time copy of every pool's ticket list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolContents {
    pools: [Vec<TicketId>; 7],
}

impl PoolContents {
    pub fn get(&self, pool: Pool) -> &[TicketId] {
        &self.pools[pool as usize]
    }
}

// ── WorkflowRouter ────────────────────────────────────────────────────────────

pub struct WorkflowRouter {
    tickets:          BTreeMap<TicketId, Ticket>,
    pools:            [Vec<TicketId>; 7],
    next_number:      u32,
    programmer_count: u32,
}

impl WorkflowRouter {
    /// Code review only happens when `programmer_count > 1`.
    pub fn new(programmer_count: u32) -> Self {
        Self {
            tickets: BTreeMap::new(),
            pools: Default::default(),
            next_number: FIRST_TICKET_NUMBER,
            programmer_count,
        }
    }

    // ── Arena access ──────────────────────────────────────────────────────

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.get(&id)
    }

    pub fn ticket_mut(&mut self, id: TicketId) -> Option<&mut Ticket> {
        self.tickets.get_mut(&id)
    }

    /// Every ticket ever created, in id order.
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    pub fn pool(&self, pool: Pool) -> &[TicketId] {
        &self.pools[pool as usize]
    }

    pub fn contents(&self) -> PoolContents {
        PoolContents { pools: self.pools.clone() }
    }

    /// Create a new ticket authored by `programmer`.  The caller holds it.
    pub fn spawn(
        &mut self,
        generator:  &mut dyn TicketGenerator,
        programmer: WorkerId,
    ) -> WorkflowResult<TicketId> {
        let id = TicketId(self.next_number);
        let mut ticket = generator.next_ticket(id)?;
        ticket.id = id;
        ticket.programmer = Some(programmer);
        self.next_number += 1;
        self.tickets.insert(id, ticket);
        tracing::debug!(ticket = %id, %programmer, "ticket created");
        Ok(id)
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Take the most urgent ticket `worker` may program or review.
    ///
    /// Candidates are the worker's own passed-back tickets and reviews of
    /// other programmers' tickets.  The lowest priority number wins; a tie
    /// goes to the review, then to whichever ticket entered its pool first.
    pub fn claim_for_programmer(&mut self, worker: WorkerId) -> Option<TicketId> {
        let reviews = self.candidates(Pool::CodeReview, 0, move |t| t.programmer != Some(worker));
        let fixes = self.candidates(Pool::PassBack, 1, move |t| t.programmer == Some(worker));
        let (pool, idx) = reviews.chain(fixes).min_by_key(|c| c.key).map(|c| (c.pool, c.idx))?;
        Some(self.pools[pool as usize].remove(idx))
    }

    /// Take the most urgent QA ticket `worker` may check, else the most
    /// urgent automation job.
    ///
    /// QA tickets must be unclaimed or already claimed by `worker`.  Ties on
    /// priority favor tickets the worker already owns, then pool order.  The
    /// claiming tester becomes the ticket's owner.
    pub fn claim_for_tester(&mut self, worker: WorkerId) -> Option<TicketId> {
        let (pool, idx) = self.tester_choice(worker)?;
        let id = self.pools[pool as usize].remove(idx);
        if let Some(ticket) = self.tickets.get_mut(&id) {
            ticket.tester = Some(worker);
        }
        Some(id)
    }

    /// Whether [`claim_for_tester`](Self::claim_for_tester) would find work.
    pub fn tester_work_available(&self, worker: WorkerId) -> bool {
        self.tester_choice(worker).is_some()
    }

    fn tester_choice(&self, worker: WorkerId) -> Option<(Pool, usize)> {
        let owned_rank = |t: &Ticket| if t.tester == Some(worker) { 0 } else { 1 };
        let check = self
            .pool(Pool::Qa)
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| self.tickets.get(id).map(|t| (idx, t)))
            .filter(|(_, t)| t.tester.is_none() || t.tester == Some(worker))
            .min_by_key(|(idx, t)| (t.priority, owned_rank(t), *idx));
        if let Some((idx, _)) = check {
            return Some((Pool::Qa, idx));
        }
        self.pool(Pool::NeedsAutomation)
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| self.tickets.get(id).map(|t| (idx, t)))
            .min_by_key(|(idx, t)| (t.priority, owned_rank(t), *idx))
            .map(|(idx, _)| (Pool::NeedsAutomation, idx))
    }

    fn candidates<'a>(
        &'a self,
        pool:   Pool,
        rank:   u8,
        accept: impl Fn(&Ticket) -> bool + 'a,
    ) -> impl Iterator<Item = Candidate> + 'a {
        self.pool(pool)
            .iter()
            .enumerate()
            .filter_map(move |(idx, id)| {
                let ticket = self.tickets.get(id)?;
                accept(ticket).then_some(Candidate {
                    pool,
                    idx,
                    key: (ticket.priority, rank, idx),
                })
            })
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Route a held ticket after `role` finished an iteration of it.
    ///
    /// Returns the claimable pool the ticket went to (`Automated` for the
    /// end of the line).
    pub fn route_completion(&mut self, id: TicketId, role: Role) -> WorkflowResult<Pool> {
        let programmer_count = self.programmer_count;
        let ticket = self.tickets.get_mut(&id).ok_or(WorkflowError::UnknownTicket(id))?;
        let state = ticket.state();
        if state.stage().map(WorkStage::role) != Some(role) {
            return Err(WorkflowError::WrongStage { id, role, state });
        }

        let dest = match state {
            WorkflowState::Programming => {
                if programmer_count > 1 && !ticket.queue(WorkStage::CodeReview).is_empty() {
                    ticket.set_state(WorkflowState::CodeReview);
                    Pool::CodeReview
                } else {
                    ticket.discard_iteration(WorkStage::CodeReview);
                    ticket.set_state(WorkflowState::Checking);
                    Pool::Qa
                }
            }
            WorkflowState::CodeReview => {
                ticket.set_state(WorkflowState::Checking);
                Pool::Qa
            }
            WorkflowState::Checking if !ticket.queue(WorkStage::Checking).is_empty() => {
                ticket.record_pass_back();
                ticket.set_state(WorkflowState::Programming);
                Pool::PassBack
            }
            WorkflowState::Checking => {
                ticket.set_state(WorkflowState::Automation);
                self.pools[Pool::Done as usize].push(id);
                Pool::NeedsAutomation
            }
            WorkflowState::Automation => {
                ticket.set_state(WorkflowState::Automated);
                Pool::Automated
            }
            WorkflowState::Automated => return Err(WorkflowError::WrongStage { id, role, state }),
        };
        self.pools[dest as usize].push(id);
        tracing::debug!(ticket = %id, from = ?state, to = ?dest, "ticket routed");
        Ok(dest)
    }

    /// Record that a held ticket could not be finished this sprint.
    pub fn mark_unfinished(&mut self, id: TicketId) -> WorkflowResult<()> {
        let ticket = self.tickets.get_mut(&id).ok_or(WorkflowError::UnknownTicket(id))?;
        ticket.mark_stalled();
        let unfinished = &mut self.pools[Pool::Unfinished as usize];
        if !unfinished.contains(&id) {
            unfinished.push(id);
        }
        Ok(())
    }

    /// End-of-sprint sweep: every ticket that never passed QA, wherever it
    /// sits, is recorded as unfinished.
    pub fn close_sprint(&mut self) {
        for pool in [Pool::CodeReview, Pool::Qa, Pool::PassBack] {
            self.pools[pool as usize].clear();
        }
        let stragglers: Vec<TicketId> = self
            .tickets
            .values()
            .filter(|t| !t.reached_done())
            .map(|t| t.id)
            .collect();
        let unfinished = &mut self.pools[Pool::Unfinished as usize];
        for id in stragglers {
            if !unfinished.contains(&id) {
                unfinished.push(id);
            }
        }
    }
}

struct Candidate {
    pool: Pool,
    idx:  usize,
    key:  (u32, u8, usize),
}
