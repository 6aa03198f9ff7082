//! Tests for sprint-sim.

use sprint_core::{DayTime, Role, SimConfig, SimRng, TicketId, WorkerId, WorkerRng};
use sprint_schedule::{
    Event, EventKind, MeetingKind, MetricCategory, ScheduleError, TicketWork, WorkerCalendar,
};
use sprint_workflow::{FixedTicketGenerator, Pool, WorkPlan, WorkStage, WorkflowRouter};

use crate::{
    MinuteLedger, NoopObserver, Projection, SimBuilder, SimError, SimObserver, Simulation,
    SustainabilityProjector,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One programmer, one tester, a one-day regression window and five sprint
/// days (six calendar days in total).
fn solo_config() -> SimConfig {
    SimConfig {
        sprint_days:      5,
        regression_days:  1,
        programmer_count: 1,
        tester_count:     1,
        ..SimConfig::default()
    }
}

fn hour_ticket() -> WorkPlan {
    WorkPlan {
        programming: vec![60],
        code_review: vec![],
        checking:    vec![30],
        automation:  vec![45],
    }
}

fn solo_sim() -> Simulation {
    SimBuilder::new(solo_config())
        .generator(FixedTicketGenerator::new(10, hour_ticket()))
        .build()
        .unwrap()
}

/// Events and free slots of one day must cover `[0, span)` exactly once.
fn assert_day_tiles(day: &sprint_schedule::DayCalendar) {
    let mut pieces: Vec<(u32, u32)> = day.events().iter().map(|e| (e.start, e.end())).collect();
    pieces.extend(day.free_slots().iter().map(|s| (s.start, s.end)));
    pieces.sort();
    let mut cursor = 0;
    for (start, end) in pieces {
        assert_eq!(start, cursor, "gap or overlap on day {} at minute {cursor}", day.day());
        assert!(end > start, "empty piece on day {} at minute {start}", day.day());
        cursor = end;
    }
    assert_eq!(cursor, day.span(), "day {} not covered to its end", day.day());
}

const PROGRAMMER: WorkerId = WorkerId(0);
const TESTER: WorkerId = WorkerId(1);

#[derive(Default)]
struct Recorder {
    steps: Vec<(DayTime, Option<DayTime>)>,
    ended: usize,
}

impl SimObserver for Recorder {
    fn on_step_end(&mut self, now: DayTime, next: Option<DayTime>) {
        self.steps.push((now, next));
    }

    fn on_sim_end(&mut self, _report: &crate::ProjectionReport) {
        self.ended += 1;
    }
}

/// Drives one ticket by hand, outside the step loop.
struct Bench {
    config:     SimConfig,
    router:     WorkflowRouter,
    generator:  FixedTicketGenerator,
    programmer: WorkerCalendar,
    tester:     WorkerCalendar,
    rng:        WorkerRng,
}

impl Bench {
    fn new() -> Self {
        let config = solo_config();
        Bench {
            router:     WorkflowRouter::new(1),
            generator:  FixedTicketGenerator::new(10, hour_ticket()),
            programmer: WorkerCalendar::new(&config, Role::Programmer, None).unwrap(),
            tester:     WorkerCalendar::new(&config, Role::Tester, None).unwrap(),
            rng:        WorkerRng::new(3, TESTER),
            config,
        }
    }

    fn programmed(&mut self) -> TicketId {
        let id = self.router.spawn(&mut self.generator, PROGRAMMER).unwrap();
        self.programmer.add_work(self.router.ticket_mut(id).unwrap(), &mut self.rng).unwrap();
        self.programmer.release_ticket();
        assert_eq!(self.router.route_completion(id, Role::Programmer).unwrap(), Pool::Qa);
        id
    }

    /// Claim and finish one tester iteration; returns where the ticket went.
    fn tester_pass(&mut self) -> Pool {
        let id = self.router.claim_for_tester(TESTER).unwrap();
        self.tester.add_work(self.router.ticket_mut(id).unwrap(), &mut self.rng).unwrap();
        self.tester.release_ticket();
        self.router.route_completion(id, Role::Tester).unwrap()
    }

    fn project(&self) -> crate::ProjectionReport {
        SustainabilityProjector::new(&self.config)
            .project([(TESTER, &self.tester)], &self.router, &mut SimRng::new(5))
            .unwrap()
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_programmers_then_testers() {
        let config = SimConfig { programmer_count: 2, tester_count: 1, ..SimConfig::default() };
        let sim = SimBuilder::new(config).build().unwrap();
        let names: Vec<&str> = sim.workers().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["Programmer #1", "Programmer #2", "Tester #1"]);
        assert_eq!(sim.workers()[2].role, Role::Tester);
        assert_eq!(sim.workers()[2].id, WorkerId(2));
        assert!(sim.now().is_none());
        assert!(!sim.is_finished());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig { sprint_days: 0, ..SimConfig::default() };
        let err = SimBuilder::new(config).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn custom_event_worker_count_mismatch_errors() {
        let err = SimBuilder::new(solo_config())
            .custom_events(vec![vec![Vec::new(); 6]])
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SimError::ConfigurationMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn custom_event_day_count_mismatch_errors() {
        let err = SimBuilder::new(solo_config())
            .custom_events(vec![vec![Vec::new(); 6], vec![Vec::new(); 5]])
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SimError::Schedule(ScheduleError::ConfigurationMismatch { expected: 6, got: 5 })
        ));
    }

    #[test]
    fn custom_events_land_in_the_right_calendar() {
        let mut events = vec![vec![Vec::new(); 6]; 2];
        events[1][3].push(Event::meeting(3, 300, 45, MeetingKind::Adhoc));
        let sim = SimBuilder::new(solo_config()).custom_events(events).build().unwrap();
        let adhoc = |w: usize| {
            sim.workers()[w]
                .calendar
                .events()
                .filter(|e| e.kind == EventKind::Meeting(MeetingKind::Adhoc))
                .count()
        };
        assert_eq!(adhoc(0), 0);
        assert_eq!(adhoc(1), 1);
    }
}

// ── Step loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn first_step_is_after_the_opening_standup() {
        let mut sim = solo_sim();
        let next = sim.step().unwrap().unwrap();
        // The programmer starts at 00:15; the tester is in regression all day.
        assert!(next > DayTime(15));
        assert_eq!(sim.workers()[0].held_ticket(), Some(TicketId(100)));
        assert!(sim.workers()[1].held_ticket().is_none());
    }

    #[test]
    fn solo_ticket_skips_review_and_reaches_qa() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();

        let events: Vec<&Event> = sim.workers()[0]
            .calendar
            .events()
            .filter(|e| e.ticket() == Some(TicketId(100)))
            .collect();
        assert_eq!(events.len(), 2);
        let (switch, work) = (events[0], events[1]);
        assert!(switch.is_context_switch());
        assert_eq!((switch.day, switch.start), (0, 15));
        assert!((10..=30).contains(&switch.duration));
        assert_eq!(work.start, switch.end());
        assert_eq!(work.duration, 60);
        let EventKind::TicketWork(w) = work.kind else { panic!("expected ticket work") };
        assert_eq!(w.stage, WorkStage::Programming);
        assert!(!w.redundant);

        let reviews = sim
            .workers()
            .iter()
            .flat_map(|w| w.calendar.events())
            .filter(|e| matches!(e.kind, EventKind::TicketWork(w) if w.stage == WorkStage::CodeReview))
            .count();
        assert_eq!(reviews, 0);

        let snap = sim.timeline().at(work.end_time()).unwrap();
        assert!(snap.awaiting_qa.contains(&TicketId(100)));
        assert!(!snap.in_development.contains(&TicketId(100)));
    }

    #[test]
    fn clock_strictly_increases_within_horizon() {
        let mut sim = solo_sim();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        let horizon = solo_config().horizon();
        assert!(!rec.steps.is_empty());
        for pair in rec.steps.windows(2) {
            assert_eq!(pair[0].1, Some(pair[1].0));
            assert!(pair[1].0 > pair[0].0);
        }
        assert!(rec.steps.iter().all(|&(now, _)| now < horizon));
        assert_eq!(rec.steps.last().unwrap().1, None);
        assert_eq!(rec.ended, 1);
        assert!(sim.is_finished());
        assert!(sim.step().unwrap().is_none());
    }

    #[test]
    fn timeline_covers_the_whole_run() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();

        let segments: Vec<_> = sim.timeline().segments().collect();
        assert_eq!(segments[0].0, DayTime::ZERO);
        assert_eq!(segments[0].2.in_flight(), 0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        assert_eq!(sim.timeline().covered_until(), solo_config().horizon());
        assert!(sim.timeline().at(solo_config().horizon()).is_none());
    }

    #[test]
    fn testers_unused_time_is_written_off() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();
        let tester = &sim.workers()[1].calendar;
        assert!(tester.next_free_time().is_none());
        assert!(tester.events().any(Event::is_nothing));
    }

    #[test]
    fn finished_tickets_move_through_qa() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();
        let router = sim.router();
        assert!(router.pool(Pool::Done).contains(&TicketId(100)));
        assert!(router.pool(Pool::Qa).is_empty());
        assert!(router.pool(Pool::CodeReview).is_empty());
        let mut unfinished = router.pool(Pool::Unfinished).to_vec();
        unfinished.sort();
        unfinished.dedup();
        assert_eq!(unfinished.len(), router.pool(Pool::Unfinished).len());
    }

    #[test]
    fn default_config_runs_to_a_projection() {
        let mut sim = SimBuilder::new(SimConfig::default()).build().unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.report(), Some(&report));
        assert!(report.unscheduled_minutes <= report.owed_minutes);
        assert!((0.0..=1.0).contains(&report.growth_rate));
        assert!(sim.router().tickets().count() > 0);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut sim = SimBuilder::new(SimConfig::default()).build().unwrap();
            let report = sim.run(&mut NoopObserver).unwrap();
            let events: Vec<Vec<Event>> = sim
                .workers()
                .iter()
                .map(|w| w.calendar.events().copied().collect())
                .collect();
            (report, events)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn team_runs_review_others_work_and_keep_days_tiled() {
        for (programmers, testers) in [(2, 1), (3, 2), (4, 1)] {
            for seed in [1, 7, 42] {
                let config = SimConfig {
                    programmer_count: programmers,
                    tester_count: testers,
                    seed,
                    ..SimConfig::default()
                };
                let mut sim = SimBuilder::new(config).build().unwrap();
                sim.run(&mut NoopObserver).unwrap();

                let mut reviews = 0;
                for worker in sim.workers() {
                    for event in worker.calendar.events() {
                        let EventKind::TicketWork(w) = event.kind else { continue };
                        if w.stage != WorkStage::CodeReview {
                            continue;
                        }
                        reviews += 1;
                        let ticket = sim.router().ticket(w.ticket).unwrap();
                        assert_ne!(
                            ticket.programmer,
                            Some(worker.id),
                            "{} reviewed their own ticket {} (seed {seed})",
                            worker.name,
                            w.ticket
                        );
                    }
                    worker.calendar.days().iter().for_each(assert_day_tiles);
                }
                assert!(reviews > 0, "no reviews with {programmers} programmers (seed {seed})");
            }
        }
    }

    #[test]
    fn different_seeds_differ() {
        let events = |seed| {
            let mut sim = SimBuilder::new(SimConfig { seed, ..SimConfig::default() }).build().unwrap();
            sim.run(&mut NoopObserver).unwrap();
            sim.workers()[0].calendar.events().copied().collect::<Vec<Event>>()
        };
        assert_ne!(events(1), events(2));
    }
}

// ── Minute ledgers ────────────────────────────────────────────────────────────

#[cfg(test)]
mod ledger_tests {
    use super::*;

    #[test]
    fn unavailable_before_the_run_closes() {
        let sim = solo_sim();
        assert_eq!(sim.minutes_at(PROGRAMMER, MetricCategory::Meeting, DayTime(100)), None);
    }

    #[test]
    fn meetings_accumulate_over_the_run() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();
        let at = |t| sim.minutes_at(PROGRAMMER, MetricCategory::Meeting, t).unwrap();
        assert_eq!(at(DayTime(0)), 0);
        assert_eq!(at(DayTime(10)), 10);
        assert_eq!(at(DayTime(15)), 15);
        assert_eq!(at(DayTime(100)), 15);
        // Lunch ×6, standup ×5, retro ×2, planning.
        assert_eq!(at(solo_config().horizon()), 360 + 75 + 120 + 120);
    }

    #[test]
    fn tester_regression_minutes() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();
        let horizon = solo_config().horizon();
        let regression = sim.minutes_at(TESTER, MetricCategory::RegressionTesting, horizon).unwrap();
        assert_eq!(regression, 2 * (480 - 60 - 15 - 60));
        assert_eq!(sim.minutes_at(WorkerId(9), MetricCategory::Nothing, horizon), None);
    }

    #[test]
    fn ledger_counts_fluff_by_outcome() {
        let work = |ticket| {
            EventKind::TicketWork(TicketWork {
                ticket:    TicketId(ticket),
                stage:     WorkStage::Programming,
                redundant: false,
                resumed:   false,
            })
        };
        let events = [
            Event::meeting(0, 0, 15, MeetingKind::Standup),
            Event::new(0, 15, 60, work(100)),
            Event::new(0, 200, 40, work(101)),
        ];
        let ledger = MinuteLedger::from_events(&events, |id| id == TicketId(100));
        assert_eq!(ledger.total(MetricCategory::Programming), 100);
        assert_eq!(ledger.total(MetricCategory::NonFluffProgramming), 60);
        assert_eq!(ledger.total(MetricCategory::FluffProgramming), 40);
        assert_eq!(ledger.minutes_at(MetricCategory::Programming, DayTime(75)), 60);
        assert_eq!(ledger.minutes_at(MetricCategory::Programming, DayTime(220)), 80);
        assert_eq!(ledger.total(MetricCategory::CodeReview), 0);
    }

    #[test]
    fn first_ticket_programming_is_non_fluff() {
        let mut sim = solo_sim();
        sim.run(&mut NoopObserver).unwrap();
        let horizon = solo_config().horizon();
        let at = |c| sim.minutes_at(PROGRAMMER, c, horizon).unwrap();
        assert!(at(MetricCategory::NonFluffProgramming) >= 60);
        assert_eq!(
            at(MetricCategory::FluffProgramming) + at(MetricCategory::NonFluffProgramming),
            at(MetricCategory::Programming)
        );
    }
}

// ── Sustainability projection ─────────────────────────────────────────────────

#[cfg(test)]
mod projector_tests {
    use super::*;

    #[test]
    fn nothing_done_is_insufficient_data() {
        let mut bench = Bench::new();
        bench.programmed();
        let report = bench.project();
        assert_eq!(report.projection, Projection::InsufficientData);
    }

    #[test]
    fn automated_tickets_owe_nothing() {
        let mut bench = Bench::new();
        bench.programmed();
        assert_eq!(bench.tester_pass(), Pool::NeedsAutomation);
        assert_eq!(bench.tester_pass(), Pool::Automated);
        let report = bench.project();
        assert_eq!(report.owed_minutes, 0);
        assert_eq!(report.growth_rate, 0.0);
        assert_eq!(report.projection, Projection::Sustainable);
    }

    #[test]
    fn idle_time_absorbs_owed_work() {
        let mut bench = Bench::new();
        bench.programmed();
        bench.tester_pass();
        bench.tester.backfill_until(bench.config.horizon()).unwrap();
        let report = bench.project();
        // Full check plus all automation, since development finished.
        assert_eq!(report.owed_minutes, 30 + 45);
        assert_eq!(report.unscheduled_minutes, 0);
        assert_eq!(report.projection, Projection::Sustainable);
    }

    #[test]
    fn no_idle_time_projects_a_deadlock() {
        let mut bench = Bench::new();
        bench.programmed();
        bench.tester_pass();
        let report = bench.project();
        assert_eq!(report.owed_minutes, 75);
        assert_eq!(report.unscheduled_minutes, 75);
        assert_eq!(report.growth_rate, 1.0);
        // One 30-minute check plus its context switch.
        assert!((40..=60).contains(&report.tester_pool_minutes));
        let expected = SustainabilityProjector::new(&bench.config)
            .sprints_until_deadlock(1.0, report.tester_pool_minutes);
        assert_eq!(report.projection, Projection::SprintsUntilDeadlock(expected));
    }

    #[test]
    fn unfinished_development_owes_a_share() {
        let mut bench = Bench::new();
        let gen_plan = WorkPlan {
            programming: vec![60, 20],
            code_review: vec![],
            checking:    vec![40, 30],
            automation:  vec![50],
        };
        bench.generator = FixedTicketGenerator::new(1, gen_plan);
        bench.programmed();
        // The first check fails and sends the ticket back for a fix that
        // never happens: 60 of 80 development minutes done.
        assert_eq!(bench.tester_pass(), Pool::PassBack);
        assert_eq!(bench.router.ticket(TicketId(100)).unwrap().pass_backs(), 1);
        let done = bench.router.spawn(&mut FixedTicketGenerator::new(5, hour_ticket()), PROGRAMMER).unwrap();
        bench.programmer.add_work(bench.router.ticket_mut(done).unwrap(), &mut bench.rng).unwrap();
        bench.programmer.release_ticket();
        bench.router.route_completion(done, Role::Programmer).unwrap();
        bench.tester_pass();

        let report = bench.project();
        // 0.75 × 30 check + 0.75 × 50 automation, plus 30 + 45 for the other.
        assert_eq!(report.owed_minutes, 23 + 38 + 75);
        assert_eq!(report.unscheduled_minutes, report.owed_minutes);
    }

    #[test]
    fn deadlock_count_halves_pool_each_sprint() {
        let config = SimConfig { check_refinement: 0.0, ..SimConfig::default() };
        let projector = SustainabilityProjector::new(&config);
        // Minimum viable check is a quarter of 8 hours: 120 minutes.
        assert_eq!(projector.sprints_until_deadlock(0.5, 960), 4);
        assert_eq!(projector.sprints_until_deadlock(0.5, 119), 0);
        assert_eq!(projector.sprints_until_deadlock(1.0, 960), 1);
    }

    #[test]
    fn refinement_slows_the_decline() {
        let fast = SimConfig { check_refinement: 0.0, ..SimConfig::default() };
        let slow = SimConfig { check_refinement: 0.5, ..SimConfig::default() };
        let n_fast = SustainabilityProjector::new(&fast).sprints_until_deadlock(0.5, 4800);
        let n_slow = SustainabilityProjector::new(&slow).sprints_until_deadlock(0.5, 4800);
        assert!(n_slow > n_fast);
    }

    #[test]
    fn near_total_refinement_saturates() {
        let config = SimConfig { check_refinement: 0.999_999_9, ..SimConfig::default() };
        let projector = SustainabilityProjector::new(&config);
        assert_eq!(projector.sprints_until_deadlock(0.001, 10_000), u32::MAX);
    }

    #[test]
    fn slow_decline_matches_sprint_by_sprint_shrinking() {
        let config = SimConfig { check_refinement: 0.0, ..SimConfig::default() };
        let projector = SustainabilityProjector::new(&config);
        for (rate, pool) in [(0.01, 960u32), (0.001, 4800), (0.3, 121), (0.25, 120)] {
            let mut left = pool as f64;
            let mut sprints = 0u32;
            while left >= 120.0 {
                left -= rate * left;
                sprints += 1;
            }
            let got = projector.sprints_until_deadlock(rate, pool);
            assert!(got.abs_diff(sprints) <= 1, "rate {rate} pool {pool}: {got} vs {sprints}");
        }
    }

    #[test]
    fn projection_display() {
        assert_eq!(Projection::Sustainable.to_string(), "sustainable");
        assert_eq!(Projection::InsufficientData.to_string(), "insufficient data");
        assert_eq!(Projection::SprintsUntilDeadlock(3).to_string(), "deadlock in 3 sprints");
    }
}
