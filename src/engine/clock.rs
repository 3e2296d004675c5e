//! Session clock.
//!
//! The panel is ticked by its host with whatever Δt the host measured, so
//! the clock accumulates caller-supplied steps instead of owning a fixed
//! timestep. Time is kept in integer nanoseconds so long drills do not
//! drift.

use serde::{Deserialize, Serialize};

use crate::engine::SimTime;

/// Elapsed session time and tick count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    current: SimTime,
    step_count: u64,
}

impl SimClock {
    /// A clock at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: SimTime::ZERO,
            step_count: 0,
        }
    }

    /// Elapsed session time.
    #[must_use]
    pub const fn current_time(&self) -> SimTime {
        self.current
    }

    /// Ticks taken so far.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advance by `dt_secs` and count one tick. Returns the new time.
    pub fn advance(&mut self, dt_secs: f64) -> SimTime {
        self.current = self.current + SimTime::from_secs(dt_secs);
        self.step_count += 1;
        self.current
    }

    /// Back to zero.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset(&mut self) {
        self.current = SimTime::ZERO;
        self.step_count = 0;
    }

    /// Time left until `target`, zero if already past.
    #[must_use]
    pub fn time_until(&self, target: SimTime) -> SimTime {
        target - self.current
    }

    /// Ticks of `dt_secs` needed to reach `target`, rounding up.
    #[must_use]
    pub fn steps_until(&self, target: SimTime, dt_secs: f64) -> u64 {
        let step = SimTime::from_secs(dt_secs).as_nanos();
        if step == 0 {
            return 0;
        }
        self.time_until(target).as_nanos().div_ceil(step)
    }
}
