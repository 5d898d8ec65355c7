//! Line service: the operations exposed to the transport layer.
//!
//! `LineService` owns the device state table, the record store and the device
//! directory. Every mutating operation locks the device, asks the pure engine
//! for a decision, writes the resulting record (if any) and only then commits
//! the new in-memory state. A failed write therefore leaves the device exactly
//! as it was.
//!
//! Each operation has an `_at` variant taking the current instant explicitly;
//! the plain variants use `Utc::now()`.

use crate::config::{Config, DeviceInfo};
use crate::core::cycle::{CycleRecorder, PressOutcome};
use crate::core::mode::{ModeOutcome, ModeTransitionEngine};
use crate::core::retention::RetentionSweeper;
use crate::core::state_store::{DeviceStateStore, lock_device};
use crate::db::store::RecordStore;
use crate::errors::{AppError, AppResult};
use crate::models::device_state::DeviceState;
use crate::models::mode::Mode;
use crate::models::shift::ShiftClock;
use crate::models::views::{GraphData, JobEvent, ModeStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct LineService {
    store: Arc<dyn RecordStore>,
    devices: DeviceStateStore,
    directory: BTreeMap<String, DeviceInfo>,
    shifts: ShiftClock,
    modes: ModeTransitionEngine,
    cycles: CycleRecorder,
    retention: RetentionSweeper,
}

/// Trimmed device id, or the "esp_id required" validation error.
pub fn require_device_id(device_id: Option<&str>) -> AppResult<&str> {
    match device_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AppError::esp_id_required()),
    }
}

/// Parse a wire mode, or the "invalid mode" validation error.
pub fn parse_mode(mode: Option<&str>) -> AppResult<Mode> {
    mode.and_then(Mode::from_wire).ok_or_else(AppError::invalid_mode)
}

impl LineService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        shifts: ShiftClock,
        directory: BTreeMap<String, DeviceInfo>,
    ) -> Self {
        Self {
            retention: RetentionSweeper::new(store.clone(), shifts),
            store,
            devices: DeviceStateStore::new(),
            directory,
            shifts,
            modes: ModeTransitionEngine::new(shifts),
            cycles: CycleRecorder::new(shifts),
        }
    }

    pub fn from_config(cfg: &Config, store: Arc<dyn RecordStore>) -> AppResult<Self> {
        let shifts = ShiftClock::from_config(cfg.shift_utc_offset.as_deref())?;
        Ok(Self::new(store, shifts, cfg.devices.clone()))
    }

    pub fn shifts(&self) -> &ShiftClock {
        &self.shifts
    }

    pub fn retention(&self) -> &RetentionSweeper {
        &self.retention
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Current state of a device, `None` if it never sent an event.
    pub fn device_state(&self, device_id: &str) -> Option<DeviceState> {
        self.devices.snapshot(device_id)
    }

    pub fn known_devices(&self) -> Vec<String> {
        self.devices.device_ids()
    }

    // ---------------------------
    // Mode
    // ---------------------------

    pub fn set_mode(&self, device_id: &str, mode: Mode) -> AppResult<ModeOutcome> {
        self.set_mode_at(device_id, mode, Utc::now())
    }

    pub fn set_mode_at(&self, device_id: &str, mode: Mode, now: DateTime<Utc>) -> AppResult<ModeOutcome> {
        let id = require_device_id(Some(device_id))?;
        let handle = self.devices.get_or_create(id);
        let mut state = lock_device(&handle);

        let decision = self.modes.request_mode(id, &state, mode, now);

        if let Some(rec) = &decision.break_record {
            self.store.append_break(rec)?;
            info!(
                device = id,
                shift = %rec.shift,
                duration = rec.duration_sec,
                "break ended"
            );
        }

        match &decision.outcome {
            ModeOutcome::Blocked { elapsed } => {
                info!(device = id, elapsed, "break blocked: board in progress");
            }
            ModeOutcome::Allowed { mode, board_cancelled } if state.mode != *mode => {
                if *board_cancelled {
                    info!(device = id, "board cancelled");
                }
                debug!(device = id, from = %state.mode, to = %mode, "mode changed");
            }
            ModeOutcome::Allowed { .. } => {}
        }

        *state = decision.next;
        Ok(decision.outcome)
    }

    // ---------------------------
    // Job button
    // ---------------------------

    pub fn job_done(&self, device_id: &str) -> AppResult<PressOutcome> {
        self.job_done_at(device_id, Utc::now())
    }

    pub fn job_done_at(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<PressOutcome> {
        let id = require_device_id(Some(device_id))?;
        let handle = self.devices.get_or_create(id);

        let outcome = {
            let mut state = lock_device(&handle);
            let decision = self.cycles.press_job_done(id, &state, now);

            if let Some(rec) = &decision.cycle_record {
                self.store.append_cycle(rec)?;
                info!(
                    device = id,
                    shift = %rec.shift,
                    cycle_time = rec.cycle_time_sec,
                    "board completed"
                );
            }

            *state = decision.next;
            decision.outcome
        };

        if matches!(outcome, PressOutcome::CompletedAndStarted { .. })
            && let Err(e) = self.retention.run(now)
        {
            // The periodic task retries; the press itself succeeded.
            warn!(device = id, "retention after completed board failed: {}", e);
        }

        Ok(outcome)
    }

    // ---------------------------
    // Queries
    // ---------------------------

    pub fn mode_status(&self, device_id: &str) -> AppResult<ModeStatus> {
        self.mode_status_at(device_id, Utc::now())
    }

    pub fn mode_status_at(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<ModeStatus> {
        let id = require_device_id(Some(device_id))?;
        let state = self
            .devices
            .snapshot(id)
            .ok_or_else(|| AppError::UnknownDevice(id.to_string()))?;

        Ok(ModeStatus {
            device_id: id.to_string(),
            mode: state.mode,
            board_active: state.board_active(),
            elapsed: state.board_elapsed(now),
        })
    }

    pub fn last_job_event(&self, device_id: &str) -> AppResult<JobEvent> {
        let id = require_device_id(Some(device_id))?;
        let state = self
            .devices
            .snapshot(id)
            .ok_or_else(|| AppError::UnknownDevice(id.to_string()))?;

        let event_time = state
            .last_press_time
            .map(|t| t.timestamp_millis() as f64 / 1000.0)
            .unwrap_or(0.0);

        Ok(JobEvent {
            device_id: id.to_string(),
            event_time,
        })
    }

    pub fn graph_data(&self, device_id: &str) -> AppResult<GraphData> {
        self.graph_data_at(device_id, Utc::now())
    }

    /// Records of the two-shift window straight from the store, so the view
    /// survives restarts. Devices need not be known in memory.
    pub fn graph_data_at(&self, device_id: &str, now: DateTime<Utc>) -> AppResult<GraphData> {
        let id = require_device_id(Some(device_id))?;
        let [current, previous] = self.shifts.window(now);

        let (current_shift_records, previous_shift_records): (Vec<_>, Vec<_>) = self
            .store
            .cycles_for_device(id, &[current, previous])?
            .into_iter()
            .partition(|rec| rec.shift == current);

        let break_sessions = self.store.breaks_for_device(id, current)?;
        debug!(device = id, count = break_sessions.len(), shift = %current, "break sessions loaded");

        let info = self.directory.get(id);
        let target = match info {
            Some(info) => {
                match self.store.latest_target(&info.department, Some(&info.model))? {
                    Some(t) => Some(t),
                    None => self.store.latest_target(&info.department, None)?,
                }
            }
            None => None,
        };

        Ok(GraphData {
            device_id: id.to_string(),
            department: info.map(|i| i.department.clone()),
            current_shift: current,
            previous_shift: previous,
            current_shift_records,
            previous_shift_records,
            target_time: target.as_ref().map(|t| t.target_time_sec),
            model: target.map(|t| t.model),
            break_sessions,
        })
    }

    // ---------------------------
    // Targets
    // ---------------------------

    pub fn set_target(&self, department: &str, model: &str, target_time_sec: Option<i64>) -> AppResult<()> {
        self.set_target_at(department, model, target_time_sec, Utc::now())
    }

    pub fn set_target_at(
        &self,
        department: &str,
        model: &str,
        target_time_sec: Option<i64>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let department = department.trim();
        let model = model.trim();
        let seconds = match target_time_sec {
            Some(s) if s > 0 && !department.is_empty() && !model.is_empty() => s,
            _ => return Err(AppError::Validation("invalid data".to_string())),
        };

        self.store.upsert_target(department, model, seconds, now)?;
        info!(department, model, seconds, "target updated");

        if let Err(e) = self.store.audit(
            "target",
            &format!("{department}/{model}"),
            &format!("Target time set to {seconds}s"),
        ) {
            warn!("failed to write internal log: {}", e);
        }

        Ok(())
    }
}
