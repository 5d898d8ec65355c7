//! Rolling two-shift retention and the daily wipe.

use crate::db::store::RecordStore;
use crate::errors::AppResult;
use crate::models::records::PruneStats;
use crate::models::shift::ShiftClock;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn RecordStore>,
    shifts: ShiftClock,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn RecordStore>, shifts: ShiftClock) -> Self {
        Self { store, shifts }
    }

    /// Keep only records of the current and previous shift.
    pub fn sweep(&self, now: DateTime<Utc>) -> AppResult<PruneStats> {
        let window = self.shifts.window(now);
        let stats = self.store.delete_outside_shifts(&window)?;

        if !stats.is_empty() {
            info!(
                current = %window[0],
                previous = %window[1],
                cycles = stats.cycles_removed,
                breaks = stats.breaks_removed,
                "pruned records outside shift window"
            );
        }
        Ok(stats)
    }

    /// Wipe everything during the first minute of `SHIFT_1`. `None` outside it.
    pub fn daily_reset(&self, now: DateTime<Utc>) -> AppResult<Option<PruneStats>> {
        if !self.shifts.is_daily_reset_minute(now) {
            return Ok(None);
        }

        let stats = self.store.delete_all()?;
        info!(
            cycles = stats.cycles_removed,
            breaks = stats.breaks_removed,
            "daily reset done"
        );

        if let Err(e) = self.store.audit(
            "daily_reset",
            "records",
            &format!(
                "Removed {} cycle records and {} break sessions",
                stats.cycles_removed, stats.breaks_removed
            ),
        ) {
            debug!("failed to write daily reset audit line: {}", e);
        }

        Ok(Some(stats))
    }

    /// Sweep, then daily reset: the sequence run after every completed cycle
    /// and on each timer tick.
    pub fn run(&self, now: DateTime<Utc>) -> AppResult<PruneStats> {
        let mut stats = self.sweep(now)?;
        if let Some(reset) = self.daily_reset(now)? {
            stats.cycles_removed += reset.cycles_removed;
            stats.breaks_removed += reset.breaks_removed;
        }
        Ok(stats)
    }
}

/// Periodic retention driver for the server.
pub struct RetentionTask {
    sweeper: RetentionSweeper,
    interval: Duration,
}

impl RetentionTask {
    pub fn new(sweeper: RetentionSweeper, interval: Duration) -> Self {
        Self { sweeper, interval }
    }

    /// Run the retention pass once
    pub async fn run_once(&self) -> AppResult<PruneStats> {
        let sweeper = self.sweeper.clone();
        tokio::task::spawn_blocking(move || sweeper.run(Utc::now()))
            .await
            .map_err(|e| crate::errors::AppError::Other(format!("retention task panicked: {e}")))?
    }

    /// Run forever at the configured interval. Failures are logged and retried on the next tick.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match self.run_once().await {
                Ok(stats) if !stats.is_empty() => {
                    debug!("retention tick removed {} records", stats.total())
                }
                Ok(_) => {}
                Err(e) => error!("Retention task failed: {}", e),
            }
        }
    }
}
