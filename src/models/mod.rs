pub mod device_state;
pub mod mode;
pub mod records;
pub mod shift;
pub mod views;

pub use device_state::DeviceState;
pub use mode::Mode;
pub use records::{BreakRecord, CycleRecord, PruneStats, TargetTime};
pub use shift::{Shift, ShiftClock};
pub use views::{GraphData, JobEvent, ModeStatus};
