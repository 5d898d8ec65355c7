//! User-facing CLI messages. Diagnostics go through `tracing` instead.

use crate::utils::colors::{BLUE, BOLD, GREEN, RESET, YELLOW};
use std::fmt;

fn emit(color: &str, icon: &str, msg: impl fmt::Display) {
    println!("{color}{BOLD}{icon}{RESET} {msg}");
}

pub fn info<T: fmt::Display>(msg: T) {
    emit(BLUE, "ℹ️", msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    emit(GREEN, "✅", msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    emit(YELLOW, "⚠️", msg);
}

/// Section title underlined to its own width.
pub fn header<T: fmt::Display>(msg: T) {
    let title = msg.to_string();
    let rule = "═".repeat(title.chars().count().max(12));
    println!("{BLUE}{BOLD}{title}\n{rule}{RESET}\n");
}
