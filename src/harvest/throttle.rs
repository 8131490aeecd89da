//! Round-boundary stop heuristic
//!
//! Waves over real input lists take a while. When two consecutive waves
//! finish within a short interval of each other, the remaining lists are
//! most likely missing or exhausted, and the run is stopped.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// What the range driver should do after a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDecision {
    /// Proceed to the next index
    Continue,

    /// Stop the whole run
    Stop {
        /// Time between the previous wave's end and this one's
        since_previous: Duration,
    },
}

impl RoundDecision {
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop { .. })
    }
}

/// Remembers when the previous wave ended
#[derive(Debug, Clone)]
pub struct RoundThrottle {
    min_interval: Duration,
    previous_end: Option<DateTime<Utc>>,
}

impl RoundThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            previous_end: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// End time of the last wave that let the run continue
    pub fn previous_end(&self) -> Option<DateTime<Utc>> {
        self.previous_end
    }

    /// Records a wave that ended at `now` and decides whether to go on
    ///
    /// The first wave always continues. A later wave ending less than the
    /// minimum interval after the previous one stops the run; otherwise
    /// `now` replaces the stored end time. A clock that stepped backwards
    /// counts as a zero interval.
    pub fn observe(&mut self, now: DateTime<Utc>) -> RoundDecision {
        if let Some(previous) = self.previous_end {
            let since_previous = (now - previous).to_std().unwrap_or(Duration::ZERO);
            if since_previous < self.min_interval {
                return RoundDecision::Stop { since_previous };
            }
        }

        self.previous_end = Some(now);
        RoundDecision::Continue
    }
}
