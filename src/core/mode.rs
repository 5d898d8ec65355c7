//! WORK/BREAK state machine.
//!
//! ```text
//!            BREAK ──────────────► WORK        always allowed; closes the
//!              ▲                     │          pending break (BreakRecord)
//!              │                     │
//!              └─────────────────────┘
//!      allowed when no board is running, or the board started ≤ 10 s ago
//!      (the accidental start is discarded); blocked otherwise
//! ```
//!
//! The engine is pure: it receives a state and returns the next one plus the
//! record to persist. The caller commits the new state only once the record
//! has been written.

use crate::models::device_state::{DeviceState, whole_seconds};
use crate::models::mode::Mode;
use crate::models::records::BreakRecord;
use crate::models::shift::ShiftClock;
use chrono::{DateTime, Duration, Utc};

/// A board running longer than this cannot be interrupted by a break.
pub const GUARD_WINDOW_SECS: i64 = 10;

pub const BLOCKED_REASON: &str = "board in progress";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// The device is now in `mode`. `board_cancelled` is set when an
    /// accidental board start was discarded on the way to BREAK.
    Allowed { mode: Mode, board_cancelled: bool },
    /// WORK→BREAK refused: a board has been running for `elapsed` seconds.
    Blocked { elapsed: i64 },
}

impl ModeOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, ModeOutcome::Blocked { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ModeDecision {
    pub outcome: ModeOutcome,
    pub next: DeviceState,
    pub break_record: Option<BreakRecord>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModeTransitionEngine {
    shifts: ShiftClock,
}

impl ModeTransitionEngine {
    pub fn new(shifts: ShiftClock) -> Self {
        Self { shifts }
    }

    pub fn request_mode(
        &self,
        device_id: &str,
        state: &DeviceState,
        requested: Mode,
        now: DateTime<Utc>,
    ) -> ModeDecision {
        if state.mode == requested {
            return ModeDecision {
                outcome: ModeOutcome::Allowed {
                    mode: requested,
                    board_cancelled: false,
                },
                next: state.clone(),
                break_record: None,
            };
        }

        match requested {
            Mode::Break => self.start_break(state, now),
            Mode::Work => self.resume_work(device_id, state, now),
        }
    }

    fn start_break(&self, state: &DeviceState, now: DateTime<Utc>) -> ModeDecision {
        let mut next = state.clone();

        let board_cancelled = match state.cycle_start {
            None => false,
            Some(start) => {
                let elapsed = now - start;
                if elapsed > Duration::seconds(GUARD_WINDOW_SECS) {
                    return ModeDecision {
                        outcome: ModeOutcome::Blocked {
                            elapsed: whole_seconds(elapsed),
                        },
                        next,
                        break_record: None,
                    };
                }
                // Started within the guard window: treat as an accidental press.
                next.cycle_start = None;
                true
            }
        };

        next.mode = Mode::Break;
        next.pending_break_start = Some(now);

        ModeDecision {
            outcome: ModeOutcome::Allowed {
                mode: Mode::Break,
                board_cancelled,
            },
            next,
            break_record: None,
        }
    }

    fn resume_work(&self, device_id: &str, state: &DeviceState, now: DateTime<Utc>) -> ModeDecision {
        let break_record = state.pending_break_start.map(|start| BreakRecord {
            device_id: device_id.to_string(),
            shift: self.shifts.current_shift(now),
            start_time: start,
            end_time: now,
            duration_sec: whole_seconds(now - start),
        });

        let next = DeviceState {
            mode: Mode::Work,
            cycle_start: None,
            pending_break_start: None,
            ..state.clone()
        };

        ModeDecision {
            outcome: ModeOutcome::Allowed {
                mode: Mode::Work,
                board_cancelled: false,
            },
            next,
            break_record,
        }
    }
}
