//! The alarm clock as a whole.
//!
//! [`AlarmClock`] owns every piece of state and is driven by its host: call
//! [`AlarmClock::tick`] once per second, feed countdown messages to
//! [`AlarmClock::apply_countdown`], and forward user commands. The host reads
//! results from the returned events and [`TickReport`]s; it never touches the
//! state directly.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alarm::{Alarm, AlarmId, AlarmScheduler, AlarmStore, NewAlarm, NextAlarm, SchedulerState};
use crate::countdown::{CountdownMsg, CountdownTimerEngine};
use crate::error::{ConfigError, Result, ValidationError};
use crate::events::Event;
use crate::face::ClockFace;
use crate::notify::{AlarmResponse, SharedSink};
use crate::settings::Settings;
use crate::stopwatch::{Lap, StopwatchEngine};
use crate::time_source::TimeSource;
use crate::world_clock::{WorldClockEntry, WorldClockReading, WorldClockRegistry};

/// Everything a display needs after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub now: NaiveDateTime,
    pub face: ClockFace,
    pub next_alarm: String,
    pub alarm_state: SchedulerState,
    pub events: Vec<Event>,
    pub stopwatch: String,
    pub timer: String,
    pub world: Vec<WorldClockReading>,
}

pub struct AlarmClock {
    time: Arc<dyn TimeSource>,
    sink: SharedSink,
    settings: Settings,
    alarms: AlarmStore,
    scheduler: AlarmScheduler,
    stopwatch: StopwatchEngine,
    countdown: CountdownTimerEngine,
    world: WorldClockRegistry,
}

impl std::fmt::Debug for AlarmClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmClock")
            .field("settings", &self.settings)
            .field("alarms", &self.alarms)
            .field("scheduler", &self.scheduler)
            .field("stopwatch", &self.stopwatch)
            .field("countdown", &self.countdown)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

impl AlarmClock {
    /// Clock with default settings and the default world clock zones.
    pub fn new(time: Arc<dyn TimeSource>, sink: SharedSink) -> Self {
        Self::with_settings(time, sink, Settings::default())
    }

    pub fn with_settings(time: Arc<dyn TimeSource>, sink: SharedSink, settings: Settings) -> Self {
        Self {
            time,
            sink,
            settings,
            alarms: AlarmStore::new(),
            scheduler: AlarmScheduler::new(),
            stopwatch: StopwatchEngine::new(),
            countdown: CountdownTimerEngine::new(),
            world: WorldClockRegistry::with_defaults(),
        }
    }

    /// Replace the world clock list.
    pub fn with_world_clock(mut self, world: WorldClockRegistry) -> Self {
        self.world = world;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> NaiveDateTime {
        self.time.now()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn alarms(&self) -> &[Alarm] {
        self.alarms.list()
    }

    pub fn alarm_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn sounding_alarm(&self) -> Option<&Alarm> {
        self.scheduler.current_alarm()
    }

    pub fn next_alarm(&self) -> Option<NextAlarm> {
        self.scheduler.next_alarm(self.time.now(), &self.alarms)
    }

    pub fn stopwatch(&self) -> &StopwatchEngine {
        &self.stopwatch
    }

    pub fn stopwatch_display(&self) -> String {
        self.stopwatch.display_at(self.time.epoch_ms())
    }

    pub fn laps(&self) -> &[Lap] {
        self.stopwatch.laps()
    }

    pub fn countdown(&self) -> &CountdownTimerEngine {
        &self.countdown
    }

    pub fn world_clock(&self) -> &[WorldClockEntry] {
        self.world.entries()
    }

    // ── Periodic pass ────────────────────────────────────────────────

    /// One pass of the once-per-second loop.
    pub fn tick(&mut self) -> TickReport {
        let now = self.time.now();
        let events: Vec<Event> = self
            .scheduler
            .tick(
                now,
                &mut self.alarms,
                self.settings.ring_options(),
                self.settings.snooze_minutes,
                &self.sink,
            )
            .into_iter()
            .collect();

        TickReport {
            now,
            face: ClockFace::at(now),
            next_alarm: self.scheduler.next_alarm_line(now, &self.alarms),
            alarm_state: self.scheduler.state(),
            events,
            stopwatch: self.stopwatch_display(),
            timer: self.countdown.display(),
            world: self.world.refresh(self.time.as_ref()),
        }
    }

    /// Apply a message from the countdown ticker.
    pub fn apply_countdown(&mut self, msg: CountdownMsg) -> Option<Event> {
        self.countdown.apply(msg, self.sink.as_ref())
    }

    // ── Alarms ───────────────────────────────────────────────────────

    pub fn add_alarm(&mut self, alarm: NewAlarm) -> Result<AlarmId, ValidationError> {
        self.alarms.add(alarm)
    }

    pub fn remove_alarm(&mut self, id: AlarmId) -> Result<Alarm> {
        self.alarms.remove(id)
    }

    pub fn toggle_alarm(&mut self, id: AlarmId) -> Result<bool> {
        self.alarms.toggle_active(id)
    }

    /// Snooze the sounding alarm for the configured number of minutes.
    pub fn snooze(&mut self) -> Result<Option<Event>> {
        let now = self.time.now();
        self.scheduler
            .snooze(now, self.settings.snooze_minutes, &mut self.alarms, &self.sink)
    }

    pub fn dismiss(&mut self) -> Option<Event> {
        self.scheduler.dismiss(self.time.now(), &self.sink)
    }

    /// Apply the user's answer to the alarm prompt.
    pub fn respond(&mut self, response: AlarmResponse) -> Result<Option<Event>> {
        match response {
            AlarmResponse::Snooze => self.snooze(),
            AlarmResponse::Dismiss => Ok(self.dismiss()),
        }
    }

    // ── Stopwatch ────────────────────────────────────────────────────

    pub fn stopwatch_start(&mut self) -> Option<Event> {
        self.stopwatch.start_at(self.time.epoch_ms())
    }

    pub fn stopwatch_stop(&mut self) -> Option<Event> {
        self.stopwatch.stop_at(self.time.epoch_ms())
    }

    pub fn stopwatch_toggle(&mut self) -> Option<Event> {
        self.stopwatch.toggle_at(self.time.epoch_ms())
    }

    pub fn stopwatch_lap(&mut self) -> Option<Event> {
        self.stopwatch.lap_at(self.time.epoch_ms())
    }

    pub fn stopwatch_reset(&mut self) -> Option<Event> {
        self.stopwatch.reset()
    }

    // ── Countdown ────────────────────────────────────────────────────

    pub fn countdown_start(&mut self, total_secs: u64) -> Result<Option<Event>, ValidationError> {
        self.countdown.start(total_secs)
    }

    pub fn countdown_pause(&mut self) -> Option<Event> {
        self.countdown.pause()
    }

    pub fn countdown_resume(&mut self) -> Option<Event> {
        self.countdown.resume()
    }

    pub fn countdown_reset(&mut self) -> Option<Event> {
        self.countdown.reset()
    }

    // ── World clock and settings ─────────────────────────────────────

    pub fn add_zone(&mut self, timezone_id: &str) -> Result<&WorldClockEntry, ValidationError> {
        self.world.add(timezone_id)
    }

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.settings.set(key, value)
    }
}
