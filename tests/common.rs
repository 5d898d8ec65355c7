#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use rcycletime::db::store::SqliteStore;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Binary under test with HOME pointed at a private directory, so the
/// user's real `~/.rcycletime` is never read or written.
pub fn rct(home: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("rcycletime");
    cmd.env("HOME", home);
    cmd.env("USERPROFILE", home);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rcycletime.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// UTC instant on a fixed test day.
pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, h, m, s).unwrap()
}

pub fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::in_memory().expect("in-memory store"))
}
