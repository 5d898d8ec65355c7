use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check whether a migration version is already recorded in `log`.
fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Record a migration version as applied.
fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Check if a table exists.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the `cycle_times` table (one row per completed board).
fn create_cycle_times_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cycle_times (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            esp_id         TEXT NOT NULL,
            cycle_time_sec INTEGER NOT NULL,
            shift          TEXT NOT NULL CHECK(shift IN ('SHIFT_1','SHIFT_2','SHIFT_3')),
            timestamp      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cycle_times_esp_shift_ts
            ON cycle_times(esp_id, shift, timestamp);
        "#,
    )?;
    Ok(())
}

/// Create the `break_sessions` table (one row per completed break).
fn create_break_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS break_sessions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            esp_id       TEXT NOT NULL,
            shift        TEXT NOT NULL CHECK(shift IN ('SHIFT_1','SHIFT_2','SHIFT_3')),
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            duration_sec INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_break_sessions_esp_shift_start
            ON break_sessions(esp_id, shift, start_time);
        "#,
    )?;
    Ok(())
}

/// Create the `target_config` table (latest target per department/model).
fn create_target_config_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS target_config (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            department      TEXT NOT NULL,
            model           TEXT NOT NULL,
            target_time_sec INTEGER NOT NULL,
            updated_at      TEXT NOT NULL,
            UNIQUE(department, model)
        );

        CREATE INDEX IF NOT EXISTS idx_target_config_department_updated
            ON target_config(department, updated_at);
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    message: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_cycle_times",
        message: "Created cycle_times table",
        apply: create_cycle_times_table,
    },
    Migration {
        version: "20250301_0002_create_break_sessions",
        message: "Created break_sessions table",
        apply: create_break_sessions_table,
    },
    Migration {
        version: "20250312_0003_create_target_config",
        message: "Created target_config table",
        apply: create_target_config_table,
    },
];

/// Public entry point: run all pending migrations.
///
/// Called by db::init_db() and by the record store when it opens a database.
/// Returns the versions applied by this call; stdout is left to the commands.
pub fn run_pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Apply every migration not yet recorded
    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        (m.apply)(conn)?;
        mark_applied(conn, m.version, m.message)?;

        info!(version = m.version, "{}", m.message);
        applied.push(m.version);
    }

    Ok(applied)
}

/// Number of recorded migrations (used by `db --info`).
pub fn applied_count(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
        [],
        |row| row.get(0),
    )
}
