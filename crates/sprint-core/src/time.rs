//! Simulation time model.
//!
//! # Design
//!
//! Time is a single absolute minute counter, `DayTime`, measured from minute
//! 0 of the first simulated workday.  Every workday is exactly
//! [`DAY_MINUTES`] long, so:
//!
//!   day    = minutes / DAY_MINUTES
//!   minute = minutes % DAY_MINUTES
//!
//! Nights and weekends do not exist on this clock.  Keeping the canonical
//! unit an integer makes calendar arithmetic exact and comparisons O(1).

use std::fmt;

/// Length of one workday in minutes (8 hours).
pub const DAY_MINUTES: u32 = 480;

// ── DayTime ───────────────────────────────────────────────────────────────────

/// An absolute point on the simulation clock, in workday minutes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayTime(pub u32);

impl DayTime {
    pub const ZERO: DayTime = DayTime(0);

    /// Build from a day index and a minute within that day.
    #[inline]
    pub fn from_parts(day: u32, minute: u32) -> DayTime {
        DayTime(day * DAY_MINUTES + minute)
    }

    /// Zero-based day index.
    #[inline]
    pub fn day(self) -> u32 {
        self.0 / DAY_MINUTES
    }

    /// Minute within the day, in `[0, DAY_MINUTES)`.
    #[inline]
    pub fn minute(self) -> u32 {
        self.0 % DAY_MINUTES
    }

    /// Minutes elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: DayTime) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// Break into (day, hour, minute) on a wall clock whose workday starts at
    /// `day_start_hour`.  The day is one-based, as people count them.
    pub fn wall_clock(self, day_start_hour: u32) -> (u32, u32, u32) {
        let total = day_start_hour * 60 + self.minute();
        (self.day() + 1, total / 60, total % 60)
    }

    /// Human-readable label such as `Day 3 14:05`.
    pub fn label(self, day_start_hour: u32) -> String {
        let (d, h, m) = self.wall_clock(day_start_hour);
        format!("Day {d} {h}:{m:02}")
    }
}

impl std::ops::Add<u32> for DayTime {
    type Output = DayTime;
    #[inline]
    fn add(self, rhs: u32) -> DayTime {
        DayTime(self.0 + rhs)
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}+{:03}", self.day(), self.minute())
    }
}
