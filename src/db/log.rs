use crate::db::queries::ts_to_db;
use crate::errors::AppResult;
use chrono::Utc;
use rusqlite::{Connection, params};

/// Append an audit line to the `log` table, stamped in UTC like the records.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![ts_to_db(&Utc::now()), operation, target, message])?;

    Ok(())
}
