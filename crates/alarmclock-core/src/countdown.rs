//! Countdown timer engine.
//!
//! The engine counts whole seconds. It does not own a thread: a
//! [`CountdownTicker`] posts one [`CountdownMsg::Second`] per second over a
//! channel and the owner applies each message with
//! [`CountdownTimerEngine::tick`]. Only the owner ever mutates the engine.
//! A [`CountdownPacer`] keeps a ticker alive only while the engine runs, so
//! pause and reset stop the messages and resume starts a fresh ticker.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Finished -> (start) -> Running
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::NotificationSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimerEngine {
    state: CountdownState,
    remaining_secs: u64,
    total_secs: u64,
}

impl Default for CountdownTimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Total seconds from hours (0..=23), minutes (0..=59) and seconds (0..=59).
pub fn duration_from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<u64, ValidationError> {
    if hours > 23 {
        return Err(ValidationError::invalid("hours", "must be between 0 and 23"));
    }
    if minutes > 59 {
        return Err(ValidationError::invalid("minutes", "must be between 0 and 59"));
    }
    if seconds > 59 {
        return Err(ValidationError::invalid("seconds", "must be between 0 and 59"));
    }
    Ok(u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds))
}

/// `HH:MM:SS`
pub fn format_hms(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

impl CountdownTimerEngine {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            remaining_secs: 0,
            total_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Seconds already counted down.
    pub fn progress_secs(&self) -> u64 {
        self.total_secs.saturating_sub(self.remaining_secs)
    }

    pub fn display(&self) -> String {
        format_hms(self.remaining_secs)
    }

    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down from `total_secs`. Does nothing while running.
    ///
    /// # Errors
    /// Returns [`ValidationError::NonPositiveDuration`] when `total_secs` is
    /// zero; the engine is left untouched.
    pub fn start(&mut self, total_secs: u64) -> Result<Option<Event>, ValidationError> {
        if self.is_running() {
            return Ok(None);
        }
        if total_secs == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        self.total_secs = total_secs;
        self.remaining_secs = total_secs;
        self.state = CountdownState::Running;
        debug!(total_secs, "countdown started");
        Ok(Some(Event::TimerStarted { total_secs }))
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        self.state = CountdownState::Paused;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != CountdownState::Paused {
            return None;
        }
        self.state = CountdownState::Running;
        Some(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = CountdownState::Idle;
        self.remaining_secs = 0;
        Some(Event::TimerReset)
    }

    /// Apply one elapsed second. Returns `Some(Event::TimerCompleted)` and
    /// notifies `sink` when the countdown reaches zero.
    pub fn tick(&mut self, sink: &dyn NotificationSink) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.state = CountdownState::Finished;
        info!(total_secs = self.total_secs, "countdown finished");
        sink.on_timer_complete();
        Some(Event::TimerCompleted {
            total_secs: self.total_secs,
        })
    }

    /// Apply a message from a [`CountdownTicker`].
    pub fn apply(&mut self, msg: CountdownMsg, sink: &dyn NotificationSink) -> Option<Event> {
        match msg {
            CountdownMsg::Second => self.tick(sink),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownMsg {
    Second,
}

/// Background task that posts a [`CountdownMsg::Second`] every period.
///
/// Must be created inside a tokio runtime. Aborted on drop.
#[derive(Debug)]
pub struct CountdownTicker {
    rx: mpsc::Receiver<CountdownMsg>,
    task: JoinHandle<()>,
}

impl CountdownTicker {
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(CountdownMsg::Second).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn every_second() -> Self {
        Self::spawn(Duration::from_secs(1))
    }

    pub async fn recv(&mut self) -> Option<CountdownMsg> {
        self.rx.recv().await
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Holds a [`CountdownTicker`] exactly while the countdown is running.
///
/// Call [`CountdownPacer::follow`] after every command or message applied to
/// the engine.
#[derive(Debug)]
pub struct CountdownPacer {
    period: Duration,
    ticker: Option<CountdownTicker>,
}

impl Default for CountdownPacer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl CountdownPacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start a ticker when `state` is running, stop it otherwise.
    ///
    /// Starting a ticker needs a tokio runtime.
    pub fn follow(&mut self, state: CountdownState) {
        let running = state == CountdownState::Running;
        if running && self.ticker.is_none() {
            debug!(period = ?self.period, "countdown ticker started");
            self.ticker = Some(CountdownTicker::spawn(self.period));
        } else if !running {
            if let Some(ticker) = self.ticker.take() {
                debug!(?state, "countdown ticker stopped");
                ticker.stop();
            }
        }
    }

    /// Next ticker message. Never resolves while no ticker runs.
    pub async fn recv(&mut self) -> Option<CountdownMsg> {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.recv().await,
            None => std::future::pending().await,
        }
    }
}
