//! Countdown arithmetic for the 1 Hz ticker.
//!
//! Everything here is allocation-free arithmetic so the per-second cost
//! stays negligible; parsing and schedule resolution never happen on the
//! tick path.

use chrono::{DateTime, Utc};

/// Seconds until `target`, clamped at zero once reached.
#[inline]
pub fn remaining_seconds(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (target - now).num_seconds().max(0)
}

/// Formats a second count as zero-padded "HH:MM:SS".
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    pub remaining_seconds: i64,
    /// True on the single tick where the countdown first hits zero.
    pub reached: bool,
}

/// Tracks one target instant and detects its zero-crossing exactly once.
///
/// `reached` is edge-triggered: while the session has no replacement
/// target, subsequent ticks at zero stay silent instead of re-signalling.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<Utc>,
    reached: bool,
}

impl Countdown {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self { target, reached: false }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownTick {
        let remaining = remaining_seconds(self.target, now);
        let crossed = remaining == 0 && !self.reached;
        if crossed {
            self.reached = true;
        }
        CountdownTick { remaining_seconds: remaining, reached: crossed }
    }
}
