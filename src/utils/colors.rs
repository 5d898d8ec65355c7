/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Cycle time against target:
/// within target → green
/// over target → red
/// no target → reset
pub fn color_for_cycle(cycle_secs: i64, target_secs: Option<i64>) -> &'static str {
    match target_secs {
        Some(t) if cycle_secs <= t => GREEN,
        Some(_) => RED,
        None => RESET,
    }
}
