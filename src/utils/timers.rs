//! # Countdown Timers
//!
//! Every timed mechanic in the engine (cooldowns, hazards, scripted events) is a
//! countdown decremented by elapsed tick time. There are no wall-clock timers.

use serde::{Deserialize, Serialize};

/// A countdown that runs from `duration` to zero.
///
/// # Examples
///
/// ```
/// use bastion::Countdown;
///
/// let mut timer = Countdown::new(1.0);
/// assert!(!timer.tick(0.5));
/// assert!(timer.tick(0.5));
/// assert!(!timer.is_running());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f64,
    duration: f64,
}

impl Countdown {
    /// Creates a countdown that starts full.
    pub fn new(duration: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            remaining: duration,
            duration,
        }
    }

    /// Creates a countdown that is already expired.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Restarts the countdown with a new duration, overwriting any running state.
    pub fn start(&mut self, duration: f64) {
        *self = Self::new(duration);
    }

    /// Advances by `dt`. Returns true only on the tick the countdown reaches zero.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            true
        } else {
            false
        }
    }

    /// Stops the countdown immediately.
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Seconds left.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Full duration of the current run.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether time is left on the countdown.
    pub fn is_running(&self) -> bool {
        self.remaining > 0.0
    }

    /// Fraction elapsed in `[0, 1]`; an idle countdown reports 1.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            1.0 - self.remaining / self.duration
        }
    }
}
