//! Immutable records persisted by the cycle recorder and the mode engine.

use super::shift::Shift;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub device_id: String,
    pub cycle_time_sec: i64,
    pub shift: Shift,
    pub timestamp: DateTime<Utc>,
}

/// One completed break. `shift` is the shift active when the break ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakRecord {
    pub device_id: String,
    pub shift: Shift,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_sec: i64,
}

/// Expected cycle duration for a department/model pair. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTime {
    pub department: String,
    pub model: String,
    pub target_time_sec: i64,
    pub updated_at: DateTime<Utc>,
}

/// Rows removed by a retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneStats {
    pub cycles_removed: usize,
    pub breaks_removed: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.cycles_removed + self.breaks_removed
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
