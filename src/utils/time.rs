//! Time utilities: duration formatting and wall-clock rendering of stored timestamps.

use crate::models::shift::ShiftClock;
use chrono::{DateTime, Utc};

/// Render whole seconds as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_secs(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let s = secs.abs();
    let (h, m, s) = (s / 3600, (s % 3600) / 60, s % 60);
    if h > 0 {
        format!("{}{}:{:02}:{:02}", sign, h, m, s)
    } else {
        format!("{}{:02}:{:02}", sign, m, s)
    }
}

/// Stored UTC timestamp rendered in the timezone shifts are assigned in.
pub fn wall_hms(clock: &ShiftClock, ts: &DateTime<Utc>) -> String {
    clock.wall_clock(*ts).format("%Y-%m-%d %H:%M:%S").to_string()
}
