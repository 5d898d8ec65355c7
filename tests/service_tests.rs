use chrono::{DateTime, Utc};
use rcycletime::config::{Config, DeviceInfo};
use rcycletime::core::cycle::{IgnoreReason, PressOutcome};
use rcycletime::core::mode::ModeOutcome;
use rcycletime::core::service::LineService;
use rcycletime::db::store::RecordStore;
use rcycletime::errors::{AppError, AppResult};
use rcycletime::models::mode::Mode;
use rcycletime::models::records::{BreakRecord, CycleRecord, PruneStats, TargetTime};
use rcycletime::models::shift::{Shift, ShiftClock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

mod common;
use common::{at, memory_store};

fn directory() -> BTreeMap<String, DeviceInfo> {
    Config::with_database(":memory:").devices
}

fn service() -> LineService {
    LineService::new(memory_store(), ShiftClock::utc(), directory())
}

fn service_with(store: Arc<dyn RecordStore>) -> LineService {
    LineService::new(store, ShiftClock::utc(), directory())
}

/// Wraps a real store and fails every append while `failing` is set.
struct FlakyStore {
    inner: Arc<dyn RecordStore>,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: memory_store(),
            failing: AtomicBool::new(false),
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("disk full".into()));
        }
        Ok(())
    }
}

impl RecordStore for FlakyStore {
    fn append_cycle(&self, rec: &CycleRecord) -> AppResult<()> {
        self.check()?;
        self.inner.append_cycle(rec)
    }

    fn append_break(&self, rec: &BreakRecord) -> AppResult<()> {
        self.check()?;
        self.inner.append_break(rec)
    }

    fn delete_outside_shifts(&self, keep: &[Shift]) -> AppResult<PruneStats> {
        self.inner.delete_outside_shifts(keep)
    }

    fn delete_all(&self) -> AppResult<PruneStats> {
        self.inner.delete_all()
    }

    fn cycles_for_device(&self, device_id: &str, shifts: &[Shift]) -> AppResult<Vec<CycleRecord>> {
        self.inner.cycles_for_device(device_id, shifts)
    }

    fn breaks_for_device(&self, device_id: &str, shift: Shift) -> AppResult<Vec<BreakRecord>> {
        self.inner.breaks_for_device(device_id, shift)
    }

    fn latest_target(&self, department: &str, model: Option<&str>) -> AppResult<Option<TargetTime>> {
        self.inner.latest_target(department, model)
    }

    fn upsert_target(
        &self,
        department: &str,
        model: &str,
        target_time_sec: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.inner.upsert_target(department, model, target_time_sec, now)
    }
}

/// WORK, then a started board at `start`.
fn start_board(svc: &LineService, id: &str, start: DateTime<Utc>) {
    svc.set_mode_at(id, Mode::Work, start).unwrap();
    assert_eq!(svc.job_done_at(id, start).unwrap(), PressOutcome::Started);
}

#[test]
fn test_missing_device_id_is_rejected() {
    let svc = service();
    let err = svc.set_mode_at("  ", Mode::Work, at(9, 0, 0)).unwrap_err();
    assert_eq!(err.client_message(), "esp_id required");
    assert!(err.is_client_error());
    assert!(svc.known_devices().is_empty());
}

#[test]
fn test_unknown_device_queries() {
    let svc = service();
    assert!(matches!(
        svc.mode_status_at("ESP09", at(9, 0, 0)),
        Err(AppError::UnknownDevice(_))
    ));
    assert!(matches!(svc.last_job_event("ESP09"), Err(AppError::UnknownDevice(_))));
}

#[test]
fn test_first_event_creates_device_in_break() {
    let svc = service();
    let out = svc.job_done_at("ESP01", at(9, 0, 0)).unwrap();
    assert_eq!(
        out,
        PressOutcome::Ignored {
            reason: IgnoreReason::NotInWorkMode,
            elapsed: None
        }
    );

    let status = svc.mode_status_at("ESP01", at(9, 0, 0)).unwrap();
    assert_eq!(status.mode, Mode::Break);
    assert!(!status.board_active);
    assert_eq!(status.elapsed, None);

    let event = svc.last_job_event("ESP01").unwrap();
    assert_eq!(event.event_time, 0.0);
}

#[test]
fn test_full_cycle_is_persisted_and_reported() {
    let svc = service();
    start_board(&svc, "ESP01", at(9, 0, 0));

    let out = svc.job_done_at("ESP01", at(9, 1, 5)).unwrap();
    assert_eq!(out, PressOutcome::CompletedAndStarted { cycle_time: 65 });

    let status = svc.mode_status_at("ESP01", at(9, 1, 20)).unwrap();
    assert!(status.board_active);
    assert_eq!(status.elapsed, Some(15));

    let event = svc.last_job_event("ESP01").unwrap();
    assert_eq!(event.event_time, at(9, 1, 5).timestamp() as f64);

    let graph = svc.graph_data_at("ESP01", at(9, 2, 0)).unwrap();
    assert_eq!(graph.current_shift, Shift::Shift1);
    assert_eq!(graph.previous_shift, Shift::Shift3);
    assert_eq!(graph.current_shift_records.len(), 1);
    assert_eq!(graph.current_shift_records[0].cycle_time_sec, 65);
    assert!(graph.previous_shift_records.is_empty());
    assert_eq!(graph.department.as_deref(), Some("Assembly"));
}

#[test]
fn test_blocked_break_keeps_board_running() {
    let svc = service();
    start_board(&svc, "ESP01", at(9, 0, 0));

    let out = svc.set_mode_at("ESP01", Mode::Break, at(9, 0, 30)).unwrap();
    assert_eq!(out, ModeOutcome::Blocked { elapsed: 30 });

    let state = svc.device_state("ESP01").unwrap();
    assert_eq!(state.mode, Mode::Work);
    assert_eq!(state.cycle_start, Some(at(9, 0, 0)));
    assert!(state.pending_break_start.is_none());
}

#[test]
fn test_break_session_recorded_for_current_shift() {
    let svc = service();
    svc.set_mode_at("ESP02", Mode::Work, at(15, 0, 0)).unwrap();
    svc.set_mode_at("ESP02", Mode::Break, at(15, 10, 0)).unwrap();
    svc.set_mode_at("ESP02", Mode::Work, at(15, 25, 0)).unwrap();

    let graph = svc.graph_data_at("ESP02", at(15, 30, 0)).unwrap();
    assert_eq!(graph.break_sessions.len(), 1);
    assert_eq!(graph.break_sessions[0].duration_sec, 900);
    assert_eq!(graph.break_sessions[0].shift, Shift::Shift2);
}

#[test]
fn test_failed_cycle_write_leaves_state_unchanged() {
    let store = Arc::new(FlakyStore::new());
    let svc = service_with(store.clone());
    start_board(&svc, "ESP01", at(9, 0, 0));
    let before = svc.device_state("ESP01").unwrap();

    store.failing.store(true, Ordering::SeqCst);
    let err = svc.job_done_at("ESP01", at(9, 1, 0)).unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert!(!err.is_client_error());
    assert_eq!(svc.device_state("ESP01").unwrap(), before);

    // the board is still measured from its original start
    store.failing.store(false, Ordering::SeqCst);
    let out = svc.job_done_at("ESP01", at(9, 1, 30)).unwrap();
    assert_eq!(out, PressOutcome::CompletedAndStarted { cycle_time: 90 });
}

#[test]
fn test_failed_break_write_keeps_device_in_break() {
    let store = Arc::new(FlakyStore::new());
    let svc = service_with(store.clone());
    svc.set_mode_at("ESP01", Mode::Work, at(9, 0, 0)).unwrap();
    svc.set_mode_at("ESP01", Mode::Break, at(9, 5, 0)).unwrap();

    store.failing.store(true, Ordering::SeqCst);
    assert!(svc.set_mode_at("ESP01", Mode::Work, at(9, 20, 0)).is_err());

    let state = svc.device_state("ESP01").unwrap();
    assert_eq!(state.mode, Mode::Break);
    assert_eq!(state.pending_break_start, Some(at(9, 5, 0)));
}

#[test]
fn test_completion_prunes_stale_shifts() {
    let store = memory_store();
    store
        .append_cycle(&CycleRecord {
            device_id: "ESP01".into(),
            cycle_time_sec: 40,
            shift: Shift::Shift2,
            timestamp: at(15, 0, 0),
        })
        .unwrap();

    // SHIFT_1 keeps SHIFT_1 and SHIFT_3 only
    let svc = service_with(store.clone());
    start_board(&svc, "ESP01", at(9, 0, 0));
    svc.job_done_at("ESP01", at(9, 0, 50)).unwrap();

    let left = store
        .cycles_for_device("ESP01", &[Shift::Shift1, Shift::Shift2, Shift::Shift3])
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].shift, Shift::Shift1);
}

#[test]
fn test_retention_sweep_and_daily_reset() {
    let store = memory_store();
    let all = [Shift::Shift1, Shift::Shift2, Shift::Shift3];
    for (shift, hour) in [(Shift::Shift1, 7), (Shift::Shift2, 15), (Shift::Shift3, 23)] {
        store
            .append_cycle(&CycleRecord {
                device_id: "ESP03".into(),
                cycle_time_sec: 30,
                shift,
                timestamp: at(hour, 0, 0),
            })
            .unwrap();
        store
            .append_break(&BreakRecord {
                device_id: "ESP03".into(),
                shift,
                start_time: at(hour, 10, 0),
                end_time: at(hour, 20, 0),
                duration_sec: 600,
            })
            .unwrap();
    }

    let svc = service_with(store.clone());
    let retention = svc.retention();

    // SHIFT_2 keeps SHIFT_2 and SHIFT_1
    let stats = retention.sweep(at(15, 0, 0)).unwrap();
    assert_eq!(stats.cycles_removed, 1);
    assert_eq!(stats.breaks_removed, 1);
    assert!(store.breaks_for_device("ESP03", Shift::Shift3).unwrap().is_empty());
    assert_eq!(store.breaks_for_device("ESP03", Shift::Shift1).unwrap().len(), 1);
    assert_eq!(store.breaks_for_device("ESP03", Shift::Shift2).unwrap().len(), 1);
    assert!(retention.daily_reset(at(15, 0, 0)).unwrap().is_none());

    let reset = retention.daily_reset(at(6, 0, 30)).unwrap().expect("reset ran");
    assert_eq!(reset.cycles_removed, 2);
    assert_eq!(reset.breaks_removed, 2);
    assert!(store.cycles_for_device("ESP03", &all).unwrap().is_empty());
    for shift in all {
        assert!(store.breaks_for_device("ESP03", shift).unwrap().is_empty());
    }
}

#[test]
fn test_device_ids_are_trimmed() {
    let svc = service();
    svc.set_mode_at(" ESP01 ", Mode::Work, at(9, 0, 0)).unwrap();

    assert_eq!(svc.known_devices(), vec!["ESP01".to_string()]);
    assert_eq!(svc.mode_status_at("ESP01", at(9, 0, 1)).unwrap().mode, Mode::Work);
}

#[test]
fn test_set_target_validation_and_lookup() {
    let svc = service();
    assert!(matches!(
        svc.set_target_at("Assembly", "Model_A", Some(0), at(9, 0, 0)),
        Err(AppError::Validation(_))
    ));
    assert!(svc.set_target_at("", "Model_A", Some(60), at(9, 0, 0)).is_err());
    assert!(svc.set_target_at("Assembly", "Model_A", None, at(9, 0, 0)).is_err());

    svc.set_target_at("Assembly", "Model_A", Some(60), at(9, 0, 0)).unwrap();
    svc.set_target_at("Assembly", "Model_A", Some(55), at(9, 10, 0)).unwrap();

    let graph = svc.graph_data_at("ESP01", at(9, 15, 0)).unwrap();
    assert_eq!(graph.target_time, Some(55));
    assert_eq!(graph.model.as_deref(), Some("Model_A"));
}

#[test]
fn test_target_falls_back_to_department() {
    let svc = service();
    // ESP03 is Packing / Model_B
    svc.set_target_at("Packing", "Model_Z", Some(80), at(9, 0, 0)).unwrap();

    let graph = svc.graph_data_at("ESP03", at(9, 1, 0)).unwrap();
    assert_eq!(graph.target_time, Some(80));
    assert_eq!(graph.model.as_deref(), Some("Model_Z"));
}

#[test]
fn test_devices_are_independent() {
    let svc = service();
    start_board(&svc, "ESP01", at(9, 0, 0));
    svc.set_mode_at("ESP02", Mode::Work, at(9, 0, 0)).unwrap();

    // ESP02 has no board, so its break is allowed while ESP01 is busy
    assert!(!svc.set_mode_at("ESP02", Mode::Break, at(9, 1, 0)).unwrap().is_blocked());
    assert!(svc.set_mode_at("ESP01", Mode::Break, at(9, 1, 0)).unwrap().is_blocked());
}
