//! The `Simulation` struct and its step loop.

use sprint_core::{DayTime, Role, SimConfig, SimRng, TicketId, WorkerId};
use sprint_schedule::{MetricCategory, ScheduleError};
use sprint_workflow::{TicketGenerator, WorkflowError, WorkflowRouter};

use crate::{
    MinuteLedger, PoolSnapshot, PoolTimeline, ProjectionReport, SimError, SimObserver, SimResult,
    SustainabilityProjector, Worker,
};

/// One sprint of work for a fixed team, stepped check-in by check-in.
///
/// Each step handles one minute of the clock (`now`): finished iterations
/// are routed onward, idle programmers take or create work, testers' past
/// free time is written off as `Nothing`, and idle testers take checks or
/// automation.  The clock then jumps to the next minute a worker finishes
/// something or becomes free.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    config:    SimConfig,
    workers:   Vec<Worker>,
    router:    WorkflowRouter,
    generator: Box<dyn TicketGenerator>,
    timeline:  PoolTimeline,
    /// Minute of the upcoming step; `None` before the first step.
    now:       Option<DayTime>,
    finished:  bool,
    ledgers:   Vec<MinuteLedger>,
    report:    Option<ProjectionReport>,
    /// Context-switch draws for the projection.
    rng:       SimRng,
}

impl Simulation {
    pub(crate) fn new(
        config:    SimConfig,
        workers:   Vec<Worker>,
        router:    WorkflowRouter,
        generator: Box<dyn TicketGenerator>,
        rng:       SimRng,
    ) -> Self {
        Self {
            config,
            workers,
            router,
            generator,
            timeline: PoolTimeline::default(),
            now: None,
            finished: false,
            ledgers: Vec::new(),
            report: None,
            rng,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Step until the sprint is over, then close it and project.
    ///
    /// Use [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<ProjectionReport> {
        while let Some(now) = self.upcoming()? {
            observer.on_step_start(now);
            let next = self.step()?;
            observer.on_step_end(now, next);
        }
        let report = self
            .report
            .clone()
            .ok_or_else(|| SimError::InvariantViolation("run ended without a projection".into()))?;
        observer.on_sim_end(&report);
        Ok(report)
    }

    /// Process the upcoming check-in.  Returns the minute of the one after
    /// it, or `None` once the sprint has been closed.
    pub fn step(&mut self) -> SimResult<Option<DayTime>> {
        let Some(now) = self.upcoming()? else {
            return Ok(None);
        };
        tracing::trace!(now = %now, "step");

        self.harvest(now)?;
        self.dispatch_programmers(now)?;
        for worker in self.workers.iter_mut().filter(|w| w.role.is_tester()) {
            worker.calendar.backfill_until(now)?;
        }
        self.dispatch_testers(now)?;

        match self.next_check_in(now)? {
            Some(next) => {
                tracing::trace!(now = %now, idle = next.since(now), "clock advanced");
                self.timeline.record(now, next, self.snapshot());
                self.now = Some(next);
                Ok(Some(next))
            }
            None => {
                self.finish(now)?;
                Ok(None)
            }
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Minute of the upcoming step.
    pub fn now(&self) -> Option<DayTime> {
        self.now.filter(|_| !self.finished)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Programmers first, then testers, in id order.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn router(&self) -> &WorkflowRouter {
        &self.router
    }

    pub fn timeline(&self) -> &PoolTimeline {
        &self.timeline
    }

    /// The projection, once the sprint is closed.
    pub fn report(&self) -> Option<&ProjectionReport> {
        self.report.as_ref()
    }

    /// Minutes `worker` spent in `category` up to minute `at`.
    ///
    /// `None` until the sprint is closed, or for an unknown worker.
    pub fn minutes_at(&self, worker: WorkerId, category: MetricCategory, at: DayTime) -> Option<u32> {
        self.ledgers.get(worker.index()).map(|l| l.minutes_at(category, at))
    }

    // ── Step phases ───────────────────────────────────────────────────────

    /// Minute of the upcoming step, starting the run on first use.
    fn upcoming(&mut self) -> SimResult<Option<DayTime>> {
        if self.finished {
            return Ok(None);
        }
        if self.now.is_none() {
            let first = self.workers.iter().filter_map(|w| w.calendar.next_free_time()).min();
            tracing::info!(
                programmers = self.config.programmer_count,
                testers     = self.config.tester_count,
                horizon     = %self.config.horizon(),
                "simulation started"
            );
            let Some(first) = first else {
                self.finish(DayTime::ZERO)?;
                return Ok(None);
            };
            self.timeline.record(DayTime::ZERO, first, PoolSnapshot::default());
            self.now = Some(first);
        }
        Ok(self.now)
    }

    /// Route every ticket whose iteration completes at `now`.
    fn harvest(&mut self, now: DayTime) -> SimResult<()> {
        for worker in &mut self.workers {
            match worker.completion() {
                Some(done) if done < now => {
                    return Err(SimError::InvariantViolation(format!(
                        "{} completion at {done} was skipped (now {now})",
                        worker.name
                    )));
                }
                Some(done) if done == now => {}
                _ => continue,
            }
            let id = worker.harvest().ok_or_else(|| {
                SimError::InvariantViolation(format!("{} completed work without a ticket", worker.name))
            })?;
            self.router.route_completion(id, worker.role)?;
        }
        Ok(())
    }

    fn dispatch_programmers(&mut self, now: DayTime) -> SimResult<()> {
        for idx in 0..self.workers.len() {
            let worker = &self.workers[idx];
            if worker.role != Role::Programmer || !worker.is_available_at(now) {
                continue;
            }
            let id = match self.router.claim_for_programmer(worker.id) {
                Some(id) => id,
                None => self.router.spawn(self.generator.as_mut(), worker.id)?,
            };
            self.start_work(idx, id)?;
        }
        Ok(())
    }

    fn dispatch_testers(&mut self, now: DayTime) -> SimResult<()> {
        for idx in 0..self.workers.len() {
            let worker = &self.workers[idx];
            if !worker.role.is_tester() || !worker.is_available_at(now) {
                continue;
            }
            if let Some(id) = self.router.claim_for_tester(worker.id) {
                self.start_work(idx, id)?;
            }
        }
        Ok(())
    }

    /// Hand ticket `id` to worker `idx`.  A worker who runs out of calendar
    /// is retired and the ticket recorded as unfinished.
    fn start_work(&mut self, idx: usize, id: TicketId) -> SimResult<()> {
        let worker = &mut self.workers[idx];
        let ticket = self.router.ticket_mut(id).ok_or(WorkflowError::UnknownTicket(id))?;
        match worker.assign(ticket) {
            Ok(done) => {
                tracing::debug!(worker = %worker.name, ticket = %id, done = %done, "work assigned");
                Ok(())
            }
            Err(ScheduleError::CapacityExceeded { remaining, .. }) => {
                tracing::warn!(
                    worker    = %worker.name,
                    ticket    = %id,
                    remaining,
                    "out of calendar; ticket left unfinished"
                );
                worker.retire();
                self.router.mark_unfinished(id)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The minute after `now` at which some worker next needs attention, or
    /// `None` when the sprint is effectively over.
    ///
    /// The sprint is over when nobody has a check-in left, or when no
    /// iteration is in progress, every programmer has run out of calendar,
    /// and no tester has anything to pick up.
    fn next_check_in(&self, now: DayTime) -> SimResult<Option<DayTime>> {
        let Some(next) = self.workers.iter().filter_map(|w| w.next_check_in(now)).min() else {
            return Ok(None);
        };
        if next <= now {
            return Err(SimError::InvariantViolation(format!("clock would not advance past {now}")));
        }
        if next >= self.config.horizon() {
            return Ok(None);
        }

        let in_progress = self.workers.iter().any(|w| w.completion().is_some());
        let programmers_done = self
            .workers
            .iter()
            .filter(|w| w.role == Role::Programmer)
            .all(Worker::is_exhausted);
        let tester_work = self
            .workers
            .iter()
            .filter(|w| w.role.is_tester() && !w.is_exhausted())
            .any(|w| self.router.tester_work_available(w.id));
        if !in_progress && programmers_done && !tester_work {
            return Ok(None);
        }
        Ok(Some(next))
    }

    fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot::capture(&self.router, self.workers.iter().filter_map(Worker::held_ticket))
    }

    // ── Close-out ─────────────────────────────────────────────────────────

    /// Close the sprint after the step at `last`: write off testers' unused
    /// time, sweep unfinished tickets, build ledgers, and project.
    fn finish(&mut self, last: DayTime) -> SimResult<()> {
        let horizon = self.config.horizon();
        self.timeline.record(last, horizon, self.snapshot());
        for worker in self.workers.iter_mut().filter(|w| w.role.is_tester()) {
            worker.calendar.backfill_until(horizon)?;
        }
        self.router.close_sprint();

        let router = &self.router;
        self.ledgers = self
            .workers
            .iter()
            .map(|w| {
                MinuteLedger::from_events(w.calendar.events(), |id| {
                    router.ticket(id).is_some_and(|t| t.reached_done())
                })
            })
            .collect();

        let testers = self
            .workers
            .iter()
            .filter(|w| w.role.is_tester())
            .map(|w| (w.id, &w.calendar));
        let report = SustainabilityProjector::new(&self.config).project(testers, router, &mut self.rng)?;

        tracing::info!(
            last_step   = %last,
            tickets     = router.tickets().count(),
            owed        = report.owed_minutes,
            unscheduled = report.unscheduled_minutes,
            projection  = %report.projection,
            "simulation finished"
        );
        self.report = Some(report);
        self.finished = true;
        Ok(())
    }
}
