//! Simulation observer trait for progress reporting.

use sprint_core::DayTime;

use crate::ProjectionReport;

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] around
/// each step.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SimObserver {
    /// Called before the step at `now` is processed.
    fn on_step_start(&mut self, _now: DayTime) {}

    /// Called after the step at `now`.  `next` is the following check-in, or
    /// `None` if this was the last step.
    fn on_step_end(&mut self, _now: DayTime, _next: Option<DayTime>) {}

    /// Called once after the run is closed and projected.
    fn on_sim_end(&mut self, _report: &ProjectionReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
