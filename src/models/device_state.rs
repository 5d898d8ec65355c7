use super::mode::Mode;
use chrono::{DateTime, Utc};

/// Volatile per-device state. Lives only in memory for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub mode: Mode,
    /// Start of the board in progress, if any.
    pub cycle_start: Option<DateTime<Utc>>,
    /// Last accepted job-done press (hardware debounce reference).
    pub last_press_time: Option<DateTime<Utc>>,
    /// Start of the break in progress, if any.
    pub pending_break_start: Option<DateTime<Utc>>,
}

impl DeviceState {
    /// Fresh state for a device seen for the first time: BREAK, nothing in progress.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board_active(&self) -> bool {
        self.cycle_start.is_some()
    }

    /// Whole seconds since the current board started.
    pub fn board_elapsed(&self, now: DateTime<Utc>) -> Option<i64> {
        self.cycle_start.map(|start| whole_seconds(now - start))
    }
}

/// Truncate a duration to whole seconds, never negative.
pub fn whole_seconds(d: chrono::Duration) -> i64 {
    d.num_seconds().max(0)
}
