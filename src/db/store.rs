//! Record store: the persistence seam used by the core.
//!
//! The core never touches SQL directly. Everything it needs from durable
//! storage goes through [`RecordStore`], so tests can substitute a store that
//! fails on demand and the server can share one store between request
//! handlers and the retention task.

use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::records::{BreakRecord, CycleRecord, PruneStats, TargetTime};
use crate::models::shift::Shift;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

pub trait RecordStore: Send + Sync {
    fn append_cycle(&self, rec: &CycleRecord) -> AppResult<()>;

    fn append_break(&self, rec: &BreakRecord) -> AppResult<()>;

    /// Delete cycle and break records whose shift is not in `keep`.
    fn delete_outside_shifts(&self, keep: &[Shift]) -> AppResult<PruneStats>;

    /// Delete every cycle and break record.
    fn delete_all(&self) -> AppResult<PruneStats>;

    fn cycles_for_device(&self, device_id: &str, shifts: &[Shift]) -> AppResult<Vec<CycleRecord>>;

    fn breaks_for_device(&self, device_id: &str, shift: Shift) -> AppResult<Vec<BreakRecord>>;

    fn latest_target(&self, department: &str, model: Option<&str>) -> AppResult<Option<TargetTime>>;

    fn upsert_target(
        &self,
        department: &str,
        model: &str,
        target_time_sec: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Append an audit line. Best effort: callers ignore failures.
    fn audit(&self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

/// SQLite implementation backed by a single connection.
pub struct SqliteStore {
    pool: Mutex<DbPool>,
}

impl SqliteStore {
    /// Open the database at `path` and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        Self::from_pool(pool)
    }

    /// Fresh private in-memory database with the full schema.
    pub fn in_memory() -> AppResult<Self> {
        Self::from_pool(DbPool::in_memory()?)
    }

    pub fn from_pool(pool: DbPool) -> AppResult<Self> {
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
        })
    }

    fn lock(&self) -> MutexGuard<'_, DbPool> {
        // Recover the connection after a panic in another request.
        self.pool.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for SqliteStore {
    fn append_cycle(&self, rec: &CycleRecord) -> AppResult<()> {
        let pool = self.lock();
        queries::insert_cycle(&pool.conn, rec).map_err(AppError::into_persistence)
    }

    fn append_break(&self, rec: &BreakRecord) -> AppResult<()> {
        let pool = self.lock();
        queries::insert_break(&pool.conn, rec).map_err(AppError::into_persistence)
    }

    fn delete_outside_shifts(&self, keep: &[Shift]) -> AppResult<PruneStats> {
        let pool = self.lock();
        let cycles_removed = queries::delete_shifts_not_in(&pool.conn, "cycle_times", keep)
            .map_err(AppError::into_persistence)?;
        let breaks_removed = queries::delete_shifts_not_in(&pool.conn, "break_sessions", keep)
            .map_err(AppError::into_persistence)?;

        Ok(PruneStats {
            cycles_removed,
            breaks_removed,
        })
    }

    fn delete_all(&self) -> AppResult<PruneStats> {
        let pool = self.lock();
        let cycles_removed =
            queries::delete_all_rows(&pool.conn, "cycle_times").map_err(AppError::into_persistence)?;
        let breaks_removed = queries::delete_all_rows(&pool.conn, "break_sessions")
            .map_err(AppError::into_persistence)?;

        Ok(PruneStats {
            cycles_removed,
            breaks_removed,
        })
    }

    fn cycles_for_device(&self, device_id: &str, shifts: &[Shift]) -> AppResult<Vec<CycleRecord>> {
        let pool = self.lock();
        queries::load_cycles(&pool.conn, device_id, shifts).map_err(AppError::into_persistence)
    }

    fn breaks_for_device(&self, device_id: &str, shift: Shift) -> AppResult<Vec<BreakRecord>> {
        let pool = self.lock();
        queries::load_breaks(&pool.conn, device_id, shift).map_err(AppError::into_persistence)
    }

    fn latest_target(&self, department: &str, model: Option<&str>) -> AppResult<Option<TargetTime>> {
        let pool = self.lock();
        queries::latest_target(&pool.conn, department, model).map_err(AppError::into_persistence)
    }

    fn upsert_target(
        &self,
        department: &str,
        model: &str,
        target_time_sec: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let pool = self.lock();
        queries::upsert_target(&pool.conn, department, model, target_time_sec, &now)
            .map_err(AppError::into_persistence)
    }

    fn audit(&self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        let pool = self.lock();
        ttlog(&pool.conn, operation, target, message)
    }
}
