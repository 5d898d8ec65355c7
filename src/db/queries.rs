use crate::errors::{AppError, AppResult};
use crate::models::records::{BreakRecord, CycleRecord, TargetTime};
use crate::models::shift::Shift;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, ToSql, params};

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
/// ordering matches time ordering.
pub fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn ts_from_row(row: &Row, col: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(0, AppError::Persistence(format!("invalid timestamp: {raw}"))))
}

fn shift_from_row(row: &Row) -> Result<Shift> {
    let raw: String = row.get("shift")?;
    Shift::from_db_str(&raw)
        .ok_or_else(|| conversion_error(0, AppError::Persistence(format!("invalid shift: {raw}"))))
}

pub fn map_cycle_row(row: &Row) -> Result<CycleRecord> {
    Ok(CycleRecord {
        device_id: row.get("esp_id")?,
        cycle_time_sec: row.get("cycle_time_sec")?,
        shift: shift_from_row(row)?,
        timestamp: ts_from_row(row, "timestamp")?,
    })
}

pub fn map_break_row(row: &Row) -> Result<BreakRecord> {
    Ok(BreakRecord {
        device_id: row.get("esp_id")?,
        shift: shift_from_row(row)?,
        start_time: ts_from_row(row, "start_time")?,
        end_time: ts_from_row(row, "end_time")?,
        duration_sec: row.get("duration_sec")?,
    })
}

pub fn map_target_row(row: &Row) -> Result<TargetTime> {
    Ok(TargetTime {
        department: row.get("department")?,
        model: row.get("model")?,
        target_time_sec: row.get("target_time_sec")?,
        updated_at: ts_from_row(row, "updated_at")?,
    })
}

pub fn insert_cycle(conn: &Connection, rec: &CycleRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO cycle_times (esp_id, cycle_time_sec, shift, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            rec.device_id,
            rec.cycle_time_sec,
            rec.shift.to_db_str(),
            ts_to_db(&rec.timestamp),
        ],
    )?;
    Ok(())
}

pub fn insert_break(conn: &Connection, rec: &BreakRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO break_sessions (esp_id, shift, start_time, end_time, duration_sec)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            rec.device_id,
            rec.shift.to_db_str(),
            ts_to_db(&rec.start_time),
            ts_to_db(&rec.end_time),
            rec.duration_sec,
        ],
    )?;
    Ok(())
}

/// Delete every row of `table` whose shift is not in `keep`.
/// An empty `keep` set deletes everything.
pub fn delete_shifts_not_in(conn: &Connection, table: &str, keep: &[Shift]) -> AppResult<usize> {
    if keep.is_empty() {
        return delete_all_rows(conn, table);
    }

    // Build a placeholder list: ?, ?, ...
    let placeholders = vec!["?"; keep.len()].join(",");
    let sql = format!("DELETE FROM {table} WHERE shift NOT IN ({placeholders})");

    let values: Vec<&str> = keep.iter().map(|s| s.to_db_str()).collect();
    let params: Vec<&dyn ToSql> = values.iter().map(|s| s as &dyn ToSql).collect();

    let removed = conn.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(removed)
}

pub fn delete_all_rows(conn: &Connection, table: &str) -> AppResult<usize> {
    let removed = conn.execute(&format!("DELETE FROM {table}"), [])?;
    Ok(removed)
}

/// Cycle records of a device within the given shifts, oldest first.
pub fn load_cycles(conn: &Connection, device_id: &str, shifts: &[Shift]) -> AppResult<Vec<CycleRecord>> {
    if shifts.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; shifts.len()].join(",");
    let sql = format!(
        "SELECT esp_id, cycle_time_sec, shift, timestamp
         FROM cycle_times
         WHERE esp_id = ? AND shift IN ({placeholders})
         ORDER BY timestamp ASC, id ASC"
    );

    let shift_values: Vec<&str> = shifts.iter().map(|s| s.to_db_str()).collect();
    let mut params: Vec<&dyn ToSql> = vec![&device_id as &dyn ToSql];
    params.extend(shift_values.iter().map(|s| s as &dyn ToSql));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params), map_cycle_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Break records of a device within one shift, ordered by start time.
pub fn load_breaks(conn: &Connection, device_id: &str, shift: Shift) -> AppResult<Vec<BreakRecord>> {
    let mut stmt = conn.prepare(
        "SELECT esp_id, shift, start_time, end_time, duration_sec
         FROM break_sessions
         WHERE esp_id = ?1 AND shift = ?2
         ORDER BY start_time ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![device_id, shift.to_db_str()], map_break_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}

/// Insert or update the target of a department/model pair.
pub fn upsert_target(
    conn: &Connection,
    department: &str,
    model: &str,
    target_time_sec: i64,
    now: &DateTime<Utc>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO target_config (department, model, target_time_sec, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(department, model) DO UPDATE SET
             target_time_sec = excluded.target_time_sec,
             updated_at      = excluded.updated_at",
        params![department, model, target_time_sec, ts_to_db(now)],
    )?;
    Ok(())
}

/// Most recently updated target for a department, optionally narrowed to one model.
pub fn latest_target(
    conn: &Connection,
    department: &str,
    model: Option<&str>,
) -> AppResult<Option<TargetTime>> {
    let found = match model {
        Some(m) => conn
            .query_row(
                "SELECT department, model, target_time_sec, updated_at
                 FROM target_config
                 WHERE department = ?1 AND model = ?2
                 ORDER BY updated_at DESC
                 LIMIT 1",
                params![department, m],
                map_target_row,
            )
            .optional()?,
        None => conn
            .query_row(
                "SELECT department, model, target_time_sec, updated_at
                 FROM target_config
                 WHERE department = ?1
                 ORDER BY updated_at DESC
                 LIMIT 1",
                params![department],
                map_target_row,
            )
            .optional()?,
    };

    Ok(found)
}
