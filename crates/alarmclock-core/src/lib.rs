//! # Alarm Clock Core Library
//!
//! Timekeeping logic behind a desktop alarm clock: alarms, a stopwatch, a
//! countdown timer and a world clock. Rendering and audio stay outside; the
//! library reports what to show through events and a [`NotificationSink`].
//!
//! ## Architecture
//!
//! - **Engines**: wall-clock state machines that require the caller to invoke
//!   `tick()` periodically ([`AlarmScheduler`], [`StopwatchEngine`],
//!   [`CountdownTimerEngine`])
//! - **Workers**: the [`Ringer`] tone loop and the [`CountdownTicker`], paced
//!   by a [`CountdownPacer`]; neither touches engine state
//! - **Time**: every engine reads time from a [`TimeSource`], so tests run on a
//!   [`ManualClock`]
//!
//! ## Key Components
//!
//! - [`AlarmClock`]: owns all state, runs one pass per tick
//! - [`AlarmStore`]: the alarm list
//! - [`WorldClockRegistry`]: tracked timezones
//! - [`Settings`]: volume, snooze length, alarm duration, theme

pub mod alarm;
pub mod clock;
pub mod countdown;
pub mod error;
pub mod events;
pub mod face;
pub mod notify;
pub mod ringer;
pub mod settings;
pub mod stopwatch;
pub mod time_source;
pub mod tone;
pub mod world_clock;

pub use alarm::{Alarm, AlarmId, AlarmScheduler, AlarmStore, Meridiem, NewAlarm, NextAlarm, RepeatDays, SchedulerState};
pub use clock::{AlarmClock, TickReport};
pub use countdown::{CountdownMsg, CountdownPacer, CountdownState, CountdownTicker, CountdownTimerEngine};
pub use error::{ConfigError, CoreError, TimezoneError, ValidationError};
pub use events::Event;
pub use face::{ClockFace, HandAngles};
pub use notify::{AlarmResponse, NotificationSink, SharedSink, TracingSink};
pub use ringer::{Ringer, RingerConfig};
pub use settings::{Settings, Theme};
pub use stopwatch::{Lap, StopwatchEngine};
pub use time_source::{ManualClock, SystemClock, TimeSource};
pub use tone::{Beep, Tone, Volume};
pub use world_clock::{WorldClockEntry, WorldClockReading, WorldClockRegistry};
