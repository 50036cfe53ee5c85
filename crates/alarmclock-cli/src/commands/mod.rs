pub mod alarm;
pub mod run;
pub mod session;
pub mod settings;
pub mod tones;
pub mod world;

use std::sync::Arc;

use alarmclock_core::{ManualClock, SystemClock, TimeSource};
use chrono::NaiveDateTime;

/// Parse `--at` values: "2024-03-04 07:30:00" or "2024-03-04T07:30:00".
pub fn parse_local_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| format!("expected YYYY-MM-DD HH:MM:SS, got '{s}'"))
}

/// A fixed clock when `at` is given, the system clock otherwise.
pub fn time_source(at: Option<NaiveDateTime>) -> Arc<dyn TimeSource> {
    match at {
        Some(local) => Arc::new(ManualClock::new(local)),
        None => Arc::new(SystemClock),
    }
}
