//! Outbound notifications.
//!
//! The presentation layer implements [`NotificationSink`]; the scheduler,
//! ringer and countdown engine call into it. Implementations must be cheap to
//! call from a background thread.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alarm::Alarm;
use crate::tone::{Tone, Volume};

/// The user's answer to an alarm prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmResponse {
    Snooze,
    Dismiss,
}

pub trait NotificationSink: Send + Sync {
    /// Render one repetition of `tone`.
    fn play_tone(&self, tone: Tone, volume: Volume);

    /// Show the sounding alarm. Return the user's choice if it is known
    /// right away, or `None` when it arrives later through snooze/dismiss.
    fn show_alarm_prompt(&self, alarm: &Alarm) -> Option<AlarmResponse>;

    /// The sounding alarm was snoozed or dismissed.
    fn stop_alarm(&self);

    fn on_timer_complete(&self);
}

pub type SharedSink = Arc<dyn NotificationSink>;

/// Sink that only logs. Used by the headless host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    /// Answer every prompt with this response.
    pub auto_response: Option<AlarmResponse>,
}

impl NotificationSink for TracingSink {
    fn play_tone(&self, tone: Tone, volume: Volume) {
        info!(%tone, volume = volume.get(), beeps = tone.pattern().len(), "tone");
    }

    fn show_alarm_prompt(&self, alarm: &Alarm) -> Option<AlarmResponse> {
        info!(time = %alarm.time_label(), label = %alarm.label, "ALARM!");
        self.auto_response
    }

    fn stop_alarm(&self) {
        info!("alarm stopped");
    }

    fn on_timer_complete(&self) {
        info!("Your timer has finished!");
    }
}
