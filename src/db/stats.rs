use crate::db::migrate::{applied_count, table_exists};
use crate::db::pool::DbPool;
use crate::db::queries::count_rows;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    if !table_exists(&pool.conn, "log")? {
        println!("{}• Schema:{} {}not initialized{}", CYAN, RESET, GREY, RESET);
        println!();
        return Ok(());
    }

    //
    // 2) ROW COUNTS
    //
    for (label, table) in [
        ("Cycle records", "cycle_times"),
        ("Break sessions", "break_sessions"),
        ("Targets", "target_config"),
    ] {
        let count = if table_exists(&pool.conn, table)? {
            count_rows(&pool.conn, table)?
        } else {
            0
        };
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, count, RESET);
    }

    let migrations = applied_count(&pool.conn)?;
    println!("{}• Migrations applied:{} {}", CYAN, RESET, migrations);

    //
    // 3) TIME RANGE OF CYCLE RECORDS
    //
    if !table_exists(&pool.conn, "cycle_times")? {
        println!();
        return Ok(());
    }

    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT timestamp FROM cycle_times ORDER BY timestamp ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT timestamp FROM cycle_times ORDER BY timestamp DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Cycle window:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    println!();
    Ok(())
}
