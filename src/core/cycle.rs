//! Job-done presses → cycle times.
//!
//! Two debounce layers guard the measurement: a 1 s hardware window against
//! contact bounce, and a 10 s logical window against double presses. The
//! first accepted press in WORK starts a board; each later accepted press
//! closes it and immediately starts the next one at the same instant.

use crate::models::device_state::{DeviceState, whole_seconds};
use crate::models::records::CycleRecord;
use crate::models::shift::ShiftClock;
use chrono::{DateTime, Duration, Utc};

/// Presses closer than this to the previous accepted press are contact bounce.
pub const HARDWARE_DEBOUNCE_SECS: i64 = 1;

/// A board shorter than this is a double press, not a completed cycle.
pub const LOGICAL_DEBOUNCE_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotInWorkMode,
    HardwareDebounce,
    TooFast,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NotInWorkMode => "not in WORK mode",
            IgnoreReason::HardwareDebounce => "hardware debounce",
            IgnoreReason::TooFast => "too fast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    Started,
    CompletedAndStarted { cycle_time: i64 },
    Ignored {
        reason: IgnoreReason,
        elapsed: Option<i64>,
    },
}

impl PressOutcome {
    fn ignored(reason: IgnoreReason) -> Self {
        PressOutcome::Ignored {
            reason,
            elapsed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PressDecision {
    pub outcome: PressOutcome,
    pub next: DeviceState,
    pub cycle_record: Option<CycleRecord>,
}

impl PressDecision {
    fn unchanged(state: &DeviceState, outcome: PressOutcome) -> Self {
        Self {
            outcome,
            next: state.clone(),
            cycle_record: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleRecorder {
    shifts: ShiftClock,
}

impl CycleRecorder {
    pub fn new(shifts: ShiftClock) -> Self {
        Self { shifts }
    }

    pub fn press_job_done(&self, device_id: &str, state: &DeviceState, now: DateTime<Utc>) -> PressDecision {
        if !state.mode.is_work() {
            return PressDecision::unchanged(state, PressOutcome::ignored(IgnoreReason::NotInWorkMode));
        }

        if let Some(last) = state.last_press_time
            && now - last < Duration::seconds(HARDWARE_DEBOUNCE_SECS)
        {
            return PressDecision::unchanged(state, PressOutcome::ignored(IgnoreReason::HardwareDebounce));
        }

        let mut next = state.clone();
        next.cycle_start = Some(now);
        next.last_press_time = Some(now);

        let Some(start) = state.cycle_start else {
            return PressDecision {
                outcome: PressOutcome::Started,
                next,
                cycle_record: None,
            };
        };

        let elapsed = now - start;
        if elapsed < Duration::seconds(LOGICAL_DEBOUNCE_SECS) {
            return PressDecision::unchanged(
                state,
                PressOutcome::Ignored {
                    reason: IgnoreReason::TooFast,
                    elapsed: Some(whole_seconds(elapsed)),
                },
            );
        }

        let cycle_time = whole_seconds(elapsed);
        PressDecision {
            outcome: PressOutcome::CompletedAndStarted { cycle_time },
            next,
            cycle_record: Some(CycleRecord {
                device_id: device_id.to_string(),
                cycle_time_sec: cycle_time,
                shift: self.shifts.current_shift(now),
                timestamp: now,
            }),
        }
    }
}
