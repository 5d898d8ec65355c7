use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Bring the schema up to date. Returns the migration versions applied now,
/// empty when the database was already current.
pub fn init_db(conn: &Connection) -> AppResult<Vec<&'static str>> {
    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))
}
