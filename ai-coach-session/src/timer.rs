use serde::{Deserialize, Serialize};

/// Signal emitted when an armed countdown reaches zero.
///
/// Carries the arm cycle it belongs to so that a late delivery can be told
/// apart from an expiry of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    pub cycle: u64,
}

/// One-tick-per-second countdown.
///
/// The timer knows nothing about workout phases; it only counts down and
/// reports when it ran out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownTimer {
    remaining: u32,
    /// Length the current cycle was armed with
    armed: u32,
    active: bool,
    cycle: u64,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds left in the current cycle
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds the current cycle started from, 0 when cleared
    pub fn armed(&self) -> u32 {
        self.armed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of the current arm cycle (0 before the first arm)
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Start a new cycle counting down from `seconds`.
    ///
    /// Arming a timer that is already running with exactly `seconds` left is
    /// a no-op and keeps the current cycle.
    pub fn arm(&mut self, seconds: u32) {
        if self.active && self.remaining == seconds {
            return;
        }

        self.cycle += 1;
        self.remaining = seconds;
        self.armed = seconds;
        self.active = seconds > 0;
    }

    /// Stop counting without losing the remaining seconds
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Continue counting if anything is left
    pub fn resume(&mut self) {
        self.active = self.remaining > 0;
    }

    pub fn reset(&mut self, seconds: u32) {
        self.pause();
        self.arm(seconds);
    }

    /// Zero the timer without starting a new cycle
    pub fn clear(&mut self) {
        self.active = false;
        self.remaining = 0;
        self.armed = 0;
    }

    /// Advance by one second.
    ///
    /// Returns the expiry exactly once per cycle, on the tick that takes the
    /// count from 1 to 0. Inactive timers ignore ticks.
    pub fn tick(&mut self) -> Option<Expiry> {
        if !self.active {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.active = false;
        Some(Expiry { cycle: self.cycle })
    }

    /// Whether `expiry` belongs to the current cycle and the count is spent
    pub fn is_current(&self, expiry: Expiry) -> bool {
        expiry.cycle == self.cycle && !self.active && self.remaining == 0
    }
}
