use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;
use crate::countdown::CountdownState;

/// Every state change in the system produces an Event.
/// The presentation layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AlarmFired {
        alarm_id: AlarmId,
        label: String,
        at: NaiveDateTime,
    },
    AlarmSnoozed {
        alarm_id: AlarmId,
        /// The one-shot alarm created for the snooze.
        snooze_id: AlarmId,
        until: NaiveDateTime,
        at: NaiveDateTime,
    },
    AlarmDismissed {
        alarm_id: AlarmId,
        at: NaiveDateTime,
    },
    StopwatchStarted {
        elapsed_ms: u64,
    },
    StopwatchStopped {
        elapsed_ms: u64,
    },
    LapRecorded {
        number: usize,
        lap_ms: u64,
        total_ms: u64,
    },
    StopwatchReset,
    TimerStarted {
        total_secs: u64,
    },
    TimerPaused {
        remaining_secs: u64,
    },
    TimerResumed {
        remaining_secs: u64,
    },
    TimerCompleted {
        total_secs: u64,
    },
    TimerReset,
    TimerSnapshot {
        state: CountdownState,
        remaining_secs: u64,
        total_secs: u64,
    },
}
