//! Countdown timers for cooldowns and expirations.

use serde::{Deserialize, Serialize};

/// A monotonic countdown clamped at zero.
///
/// Expiry is level-triggered: [`times_up`](Self::times_up) keeps returning
/// `true` until the timer is set again, so several systems can observe the
/// same expiry in one tick.
///
/// # Example
///
/// ```
/// use salvo_core::timer::Timer;
///
/// let mut cooldown = Timer::started(0.5);
/// cooldown.update(0.3);
/// assert!(!cooldown.times_up());
/// cooldown.update(0.3);
/// assert!(cooldown.times_up());
/// assert_eq!(cooldown.remaining(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f32,
}

impl Timer {
    /// A timer that has already run out.
    #[must_use]
    pub const fn expired() -> Self {
        Self { remaining: 0.0 }
    }

    /// A timer counting down from `seconds`.
    #[must_use]
    pub fn started(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Restart the countdown.
    pub fn set(&mut self, seconds: f32) {
        self.remaining = seconds.max(0.0);
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Whether the countdown has reached zero.
    #[must_use]
    pub fn times_up(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }
}
