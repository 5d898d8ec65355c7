//! Process-wide table of per-device state.
//!
//! One [`DeviceState`] per device id, created lazily on first use and kept for
//! the lifetime of the process. Each entry has its own mutex: every operation
//! on a device locks that entry for its whole duration, so a mode change and a
//! job press for the same device never interleave, while different devices
//! proceed in parallel. The outer lock is held only to look up or insert.

use crate::models::device_state::DeviceState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub type DeviceHandle = Arc<Mutex<DeviceState>>;

#[derive(Debug, Default)]
pub struct DeviceStateStore {
    devices: RwLock<HashMap<String, DeviceHandle>>,
}

impl DeviceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `device_id`, creating a default (BREAK, idle) state the first time.
    pub fn get_or_create(&self, device_id: &str) -> DeviceHandle {
        if let Some(handle) = self.get(device_id) {
            return handle;
        }

        let mut devices = self.devices.write().unwrap_or_else(|e| e.into_inner());
        devices
            .entry(device_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(DeviceState::new())))
            .clone()
    }

    /// Handle for a device already seen. Never creates state.
    pub fn get(&self, device_id: &str) -> Option<DeviceHandle> {
        let devices = self.devices.read().unwrap_or_else(|e| e.into_inner());
        devices.get(device_id).cloned()
    }

    /// Copy of the current state of a known device.
    pub fn snapshot(&self, device_id: &str) -> Option<DeviceState> {
        self.get(device_id).map(|h| lock_device(&h).clone())
    }

    /// Known device ids, sorted.
    pub fn device_ids(&self) -> Vec<String> {
        let devices = self.devices.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = devices.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Lock one device entry. A poisoned entry still holds a consistent state:
/// state is only written after the durable write it depends on succeeded.
pub fn lock_device(handle: &DeviceHandle) -> MutexGuard<'_, DeviceState> {
    handle.lock().unwrap_or_else(|e| e.into_inner())
}
