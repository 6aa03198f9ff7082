//! A single pass of work on one stage of a ticket.

/// One iteration of work: the initial implementation, one fix after a pass
/// back, one review, one manual check, and so on.
///
/// `time_remaining` only ever decreases, and only through [`progress`].
///
/// [`progress`]: WorkIteration::progress
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkIteration {
    time_remaining: u32,
    original_time:  u32,
    started:        bool,
}

impl WorkIteration {
    pub fn new(minutes: u32) -> Self {
        Self {
            time_remaining: minutes,
            original_time:  minutes,
            started:        false,
        }
    }

    /// Consume up to `minutes` of remaining work and return the amount
    /// actually consumed.
    pub fn progress(&mut self, minutes: u32) -> u32 {
        let used = minutes.min(self.time_remaining);
        self.time_remaining -= used;
        if used > 0 {
            self.started = true;
        }
        used
    }

    #[inline]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Length of the iteration as planned.
    #[inline]
    pub fn original_time(&self) -> u32 {
        self.original_time
    }

    /// Whether any minutes have been placed yet.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.time_remaining == 0
    }
}
