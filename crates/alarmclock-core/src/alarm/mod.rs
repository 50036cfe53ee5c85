mod model;
mod scheduler;
mod store;

pub use model::{to_12h, to_24h, Alarm, AlarmId, Meridiem, NewAlarm, RepeatDays};
pub use scheduler::{AlarmScheduler, NextAlarm, RingOptions, SchedulerState, FIRE_WINDOW_SECS};
pub use store::AlarmStore;
