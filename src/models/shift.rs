//! Shift windows and the clock that maps wall-clock time onto them.
//!
//! The day is split into three fixed 8-hour windows:
//!
//! | Shift     | Local time        |
//! |-----------|-------------------|
//! | `SHIFT_1` | 06:00 – 13:59:59  |
//! | `SHIFT_2` | 14:00 – 21:59:59  |
//! | `SHIFT_3` | 22:00 – 05:59:59  |
//!
//! The windows follow each other cyclically (1 → 2 → 3 → 1).

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    #[serde(rename = "SHIFT_1")]
    Shift1,
    #[serde(rename = "SHIFT_2")]
    Shift2,
    #[serde(rename = "SHIFT_3")]
    Shift3,
}

/// Hour at which `SHIFT_1` starts and the daily wipe happens.
pub const DAY_START_HOUR: u32 = 6;

impl Shift {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shift::Shift1 => "SHIFT_1",
            Shift::Shift2 => "SHIFT_2",
            Shift::Shift3 => "SHIFT_3",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "SHIFT_1" => Some(Shift::Shift1),
            "SHIFT_2" => Some(Shift::Shift2),
            "SHIFT_3" => Some(Shift::Shift3),
            _ => None,
        }
    }

    /// Cyclic predecessor: 1 → 3, 2 → 1, 3 → 2.
    pub fn previous(&self) -> Shift {
        match self {
            Shift::Shift1 => Shift::Shift3,
            Shift::Shift2 => Shift::Shift1,
            Shift::Shift3 => Shift::Shift2,
        }
    }

    /// Pure mapping of a local wall-clock time onto its shift.
    pub fn for_time(t: NaiveTime) -> Shift {
        match t.hour() {
            6..=13 => Shift::Shift1,
            14..=21 => Shift::Shift2,
            _ => Shift::Shift3,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Timezone in which shift boundaries are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftZone {
    Local,
    Fixed(FixedOffset),
}

/// Maps UTC instants onto shifts using an explicit timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftClock {
    zone: ShiftZone,
}

impl Default for ShiftClock {
    fn default() -> Self {
        Self::local()
    }
}

impl ShiftClock {
    /// Evaluate shifts in the system timezone.
    pub fn local() -> Self {
        Self {
            zone: ShiftZone::Local,
        }
    }

    /// Evaluate shifts at a fixed UTC offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            zone: ShiftZone::Fixed(offset),
        }
    }

    /// Evaluate shifts in UTC.
    pub fn utc() -> Self {
        Self::fixed(Utc.fix())
    }

    /// Build from the optional `shift_utc_offset` config value ("+01:00", "-05:30", "Z").
    pub fn from_config(offset: Option<&str>) -> AppResult<Self> {
        match offset {
            None => Ok(Self::local()),
            Some(s) => parse_offset(s).map(Self::fixed),
        }
    }

    /// Date and wall-clock time of `now` in this clock's timezone.
    pub fn wall_clock(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match self.zone {
            ShiftZone::Local => now.with_timezone(&Local).naive_local(),
            ShiftZone::Fixed(offset) => now.with_timezone(&offset).naive_local(),
        }
    }

    pub fn wall_time(&self, now: DateTime<Utc>) -> NaiveTime {
        self.wall_clock(now).time()
    }

    pub fn current_shift(&self, now: DateTime<Utc>) -> Shift {
        Shift::for_time(self.wall_time(now))
    }

    /// The current shift and its predecessor: the retained window.
    pub fn window(&self, now: DateTime<Utc>) -> [Shift; 2] {
        let current = self.current_shift(now);
        [current, current.previous()]
    }

    /// True during the first minute of `SHIFT_1` (06:00:00 – 06:00:59).
    pub fn is_daily_reset_minute(&self, now: DateTime<Utc>) -> bool {
        let t = self.wall_time(now);
        t.hour() == DAY_START_HOUR && t.minute() == 0
    }
}

fn parse_offset(s: &str) -> AppResult<FixedOffset> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(AppError::InvalidOffset(s.to_string())),
    };

    let (h, m) = rest
        .split_once(':')
        .ok_or_else(|| AppError::InvalidOffset(s.to_string()))?;
    let hours: i32 = h.parse().map_err(|_| AppError::InvalidOffset(s.to_string()))?;
    let minutes: i32 = m.parse().map_err(|_| AppError::InvalidOffset(s.to_string()))?;
    if hours > 23 || minutes > 59 {
        return Err(AppError::InvalidOffset(s.to_string()));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| AppError::InvalidOffset(s.to_string()))
}
