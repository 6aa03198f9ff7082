//! Run configuration.
//!
//! A `SimConfig` is validated once when the simulation is built and never
//! changes afterwards.  The defaults describe a ten-day sprint with two
//! regression days, five programmers and one tester.

use crate::{CoreError, CoreResult, DAY_MINUTES, DayTime};

/// Minute offset of the morning standup's end.  Lunch may not start before it.
const STANDUP_END: u32 = 15;

/// Minute offset at which sprint retros start.  Lunch must end by then.
const RETRO_START: u32 = 420;

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Working days in the sprint proper.
    pub sprint_days: u32,

    /// Days of regression testing.  The run starts this many days before the
    /// sprint, while testers finish the previous sprint's regression, and the
    /// sprint's own last `regression_days` days are regression for testers.
    pub regression_days: u32,

    /// Wall-clock hour of minute 0.  Only used for labels.
    pub day_start_hour: u32,

    /// Minute within the day at which the 60-minute lunch begins.
    pub lunch_offset: u32,

    pub programmer_count: u32,
    pub tester_count: u32,

    /// Upper bound on a ticket's initial programming effort, in hours.
    pub max_initial_programmer_work_hours: f64,

    /// Upper bound on a full manual check of a ticket, in hours.
    pub max_full_run_tester_work_hours: f64,

    /// Upper bound on automating a ticket's checks, in hours.
    pub max_qa_automation_hours: f64,

    /// Mean number of times a ticket bounces back from QA to programming.
    pub average_pass_back_count: f64,

    /// Fraction of regression-check time recovered each sprint by refining
    /// the suite, in `[0, 1)`.
    pub check_refinement: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sprint_days: 10,
            regression_days: 2,
            day_start_hour: 10,
            lunch_offset: (12 - 10) * 60,
            programmer_count: 5,
            tester_count: 1,
            max_initial_programmer_work_hours: 16.0,
            max_full_run_tester_work_hours: 8.0,
            max_qa_automation_hours: 8.0,
            average_pass_back_count: 1.0,
            check_refinement: 0.3,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Days covered by every worker's calendar.
    #[inline]
    pub fn total_days(&self) -> u32 {
        self.regression_days + self.sprint_days
    }

    /// End of the last simulated day (exclusive upper bound on the clock).
    #[inline]
    pub fn horizon(&self) -> DayTime {
        DayTime::from_parts(self.total_days(), 0)
    }

    /// Index of the sprint's first real day, which hosts sprint planning.
    #[inline]
    pub fn first_sprint_day(&self) -> u32 {
        self.regression_days
    }

    /// Total number of workers, programmers first.
    #[inline]
    pub fn worker_count(&self) -> u32 {
        self.programmer_count + self.tester_count
    }

    /// Check every field.  Returns the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sprint_days == 0 {
            return Err(CoreError::Config("sprint_days must be at least 1".into()));
        }
        if self.regression_days > self.sprint_days {
            return Err(CoreError::Config(format!(
                "regression_days ({}) cannot exceed sprint_days ({})",
                self.regression_days, self.sprint_days
            )));
        }
        if self.programmer_count == 0 || self.tester_count == 0 {
            return Err(CoreError::Config(
                "a team needs at least one programmer and one tester".into(),
            ));
        }
        if self.lunch_offset < STANDUP_END || self.lunch_offset + 60 > RETRO_START {
            return Err(CoreError::Config(format!(
                "lunch_offset {} must lie in [{STANDUP_END}, {}]",
                self.lunch_offset,
                RETRO_START - 60
            )));
        }
        if self.day_start_hour * 60 + DAY_MINUTES > 24 * 60 {
            return Err(CoreError::Config(format!(
                "a workday starting at hour {} runs past midnight",
                self.day_start_hour
            )));
        }
        for (name, hours) in [
            ("max_initial_programmer_work_hours", self.max_initial_programmer_work_hours),
            ("max_full_run_tester_work_hours", self.max_full_run_tester_work_hours),
            ("max_qa_automation_hours", self.max_qa_automation_hours),
        ] {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(CoreError::Config(format!("{name} must be positive, got {hours}")));
            }
        }
        if !self.average_pass_back_count.is_finite() || self.average_pass_back_count < 0.0 {
            return Err(CoreError::Config(format!(
                "average_pass_back_count must be non-negative, got {}",
                self.average_pass_back_count
            )));
        }
        if !(0.0..1.0).contains(&self.check_refinement) {
            return Err(CoreError::Config(format!(
                "check_refinement must lie in [0, 1), got {}",
                self.check_refinement
            )));
        }
        Ok(())
    }
}
