pub mod config;
pub mod cycle;
pub mod log;
pub mod mode;
pub mod retention;
pub mod service;
pub mod state_store;

pub use cycle::{CycleRecorder, IgnoreReason, PressOutcome};
pub use mode::{ModeOutcome, ModeTransitionEngine};
pub use retention::{RetentionSweeper, RetentionTask};
pub use service::LineService;
pub use state_store::DeviceStateStore;
