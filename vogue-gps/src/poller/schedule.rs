//! Adaptive schedule window
//!
//! Counts down to the next forced fix request. Every wake subtracts the time
//! actually spent waiting, so early wake-ups (signals, signal-only records,
//! command checks) do not push the request further out.

use std::time::Duration;

/// Subtracted from the fix interval so the request lands before the host
/// expects the fix
pub const FIX_REQUEST_BIAS_MS: u32 = 1000;

/// Shortest full window
pub const MIN_WINDOW_MS: u32 = 2000;

/// Remaining time until the next forced fix request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    remaining: Duration,
}

impl ScheduleWindow {
    /// Full window for a fix interval: `max(interval - bias, floor)`
    pub fn full_window(interval_ms: u32) -> Duration {
        let ms = interval_ms
            .saturating_sub(FIX_REQUEST_BIAS_MS)
            .max(MIN_WINDOW_MS);
        Duration::from_millis(u64::from(ms))
    }

    pub fn new(interval_ms: u32) -> Self {
        Self {
            remaining: Self::full_window(interval_ms),
        }
    }

    /// Restart the countdown
    pub fn reset(&mut self, interval_ms: u32) {
        self.remaining = Self::full_window(interval_ms);
    }

    /// Subtract time spent waiting, saturating at zero
    pub fn consume(&mut self, elapsed: Duration) {
        self.remaining = self.remaining.saturating_sub(elapsed);
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}
