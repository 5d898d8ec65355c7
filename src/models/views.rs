//! Read-only views returned by the line service queries.

use super::mode::Mode;
use super::records::{BreakRecord, CycleRecord};
use super::shift::Shift;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeStatus {
    pub device_id: String,
    pub mode: Mode,
    pub board_active: bool,
    /// Whole seconds since the running board started.
    pub elapsed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub device_id: String,
    /// Epoch seconds of the last accepted press, `0` when there was none.
    pub event_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub device_id: String,
    pub department: Option<String>,
    pub current_shift: Shift,
    pub previous_shift: Shift,
    pub current_shift_records: Vec<CycleRecord>,
    pub previous_shift_records: Vec<CycleRecord>,
    pub target_time: Option<i64>,
    pub model: Option<String>,
    pub break_sessions: Vec<BreakRecord>,
}
