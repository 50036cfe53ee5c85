//! Alarm scheduler.
//!
//! Evaluates the alarm list once per tick. The caller owns the
//! [`AlarmStore`] and passes it in; the scheduler only remembers whether an
//! alarm is currently sounding.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Sounding -> (dismiss | snooze) -> Idle
//! ```
//!
//! While an alarm sounds no other alarm is evaluated, so two alarms due at
//! the same instant do not both fire; the first in list order wins.

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{Alarm, AlarmId, NewAlarm};
use super::store::AlarmStore;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::notify::{AlarmResponse, SharedSink};
use crate::ringer::{Ringer, RingerConfig};
use crate::tone::Volume;

/// Seconds after the armed minute during which an alarm may still fire.
pub const FIRE_WINDOW_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Sounding,
}

/// The soonest upcoming alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAlarm {
    pub id: AlarmId,
    pub at: NaiveDateTime,
    pub label: String,
}

impl NextAlarm {
    /// "07:30 AM - Wake up"
    pub fn display(&self) -> String {
        format!("{} - {}", self.at.format("%I:%M %p"), self.label)
    }
}

/// Sound settings applied when an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingOptions {
    pub volume: Volume,
    pub ringer: RingerConfig,
}

impl Default for RingOptions {
    fn default() -> Self {
        Self {
            volume: Volume::default(),
            ringer: RingerConfig::default(),
        }
    }
}

#[derive(Debug)]
struct Sounding {
    alarm: Alarm,
    ringer: Option<Ringer>,
}

#[derive(Debug, Default)]
pub struct AlarmScheduler {
    sounding: Option<Sounding>,
}

impl AlarmScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        if self.sounding.is_some() {
            SchedulerState::Sounding
        } else {
            SchedulerState::Idle
        }
    }

    /// The alarm currently sounding, as it was when it fired.
    pub fn current_alarm(&self) -> Option<&Alarm> {
        self.sounding.as_ref().map(|s| &s.alarm)
    }

    /// Soonest fire instant at or after `now` over all active alarms.
    pub fn next_alarm(&self, now: NaiveDateTime, store: &AlarmStore) -> Option<NextAlarm> {
        store
            .active()
            .filter_map(|alarm| {
                next_occurrence(alarm, now).map(|at| NextAlarm {
                    id: alarm.id,
                    at,
                    label: alarm.label.clone(),
                })
            })
            .min_by_key(|next| next.at)
    }

    /// Text for the "Next Alarm" line of the clock face.
    pub fn next_alarm_line(&self, now: NaiveDateTime, store: &AlarmStore) -> String {
        if store.is_empty() {
            return "No alarms set".into();
        }
        match self.next_alarm(now, store) {
            Some(next) => next.display(),
            None => "No active alarms".into(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call once per second. Returns `Some(Event::AlarmFired)` when an alarm
    /// starts sounding.
    ///
    /// If the sink answers the prompt right away the answer is applied before
    /// returning, so the scheduler may already be idle again.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        store: &mut AlarmStore,
        options: RingOptions,
        snooze_minutes: u32,
        sink: &SharedSink,
    ) -> Option<Event> {
        if self.sounding.is_some() {
            return None;
        }

        let today = now.date();
        let due = store
            .list()
            .iter()
            .find(|alarm| is_due(alarm, now))
            .map(|alarm| alarm.id)?;

        let alarm = {
            let alarm = store.get_mut(due).ok()?;
            alarm.last_fired = Some(today);
            if !alarm.is_repeating() {
                alarm.active = false;
            }
            alarm.clone()
        };

        info!(id = %alarm.id, time = %alarm.time_label(), label = %alarm.label, "alarm fired");
        let ringer = Ringer::spawn(alarm.tone, options.volume, options.ringer, sink.clone());
        let event = Event::AlarmFired {
            alarm_id: alarm.id,
            label: alarm.label.clone(),
            at: now,
        };
        let response = sink.show_alarm_prompt(&alarm);
        self.sounding = Some(Sounding {
            alarm,
            ringer: Some(ringer),
        });

        match response {
            Some(AlarmResponse::Dismiss) => {
                self.dismiss(now, sink);
            }
            Some(AlarmResponse::Snooze) => {
                // Settings guarantee a positive snooze length.
                if let Err(e) = self.snooze(now, snooze_minutes, store, sink) {
                    debug!("immediate snooze rejected: {e}");
                    self.dismiss(now, sink);
                }
            }
            None => {}
        }
        Some(event)
    }

    /// Silence the sounding alarm.
    pub fn dismiss(&mut self, now: NaiveDateTime, sink: &SharedSink) -> Option<Event> {
        let sounding = self.silence(sink)?;
        info!(id = %sounding.id, "alarm dismissed");
        Some(Event::AlarmDismissed {
            alarm_id: sounding.id,
            at: now,
        })
    }

    /// Silence the sounding alarm and schedule a one-shot "Snooze" alarm
    /// `minutes` from `now`.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `minutes` is zero; the alarm keeps
    /// sounding in that case.
    pub fn snooze(
        &mut self,
        now: NaiveDateTime,
        minutes: u32,
        store: &mut AlarmStore,
        sink: &SharedSink,
    ) -> Result<Option<Event>> {
        if self.sounding.is_none() {
            return Ok(None);
        }
        if minutes == 0 {
            return Err(
                ValidationError::invalid("snooze_minutes", "must be at least 1 minute").into(),
            );
        }

        let snooze_at = now + Duration::minutes(i64::from(minutes));
        let snooze_id = store.add(NewAlarm::snooze(snooze_at))?;
        let Some(sounding) = self.silence(sink) else {
            return Ok(None);
        };
        info!(id = %sounding.id, %snooze_at, "alarm snoozed");
        Ok(Some(Event::AlarmSnoozed {
            alarm_id: sounding.id,
            snooze_id,
            until: snooze_at,
            at: now,
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn silence(&mut self, sink: &SharedSink) -> Option<Alarm> {
        let mut sounding = self.sounding.take()?;
        if let Some(ringer) = sounding.ringer.take() {
            ringer.cancel();
        }
        sink.stop_alarm();
        Some(sounding.alarm)
    }
}

/// Whether `alarm` should start sounding at `now`.
fn is_due(alarm: &Alarm, now: NaiveDateTime) -> bool {
    let today = now.date();
    if !alarm.active || alarm.fired_on(today) || !alarm.armed_on(today) {
        return false;
    }
    let since = (now - alarm.on(today)).num_seconds();
    (0..FIRE_WINDOW_SECS).contains(&since)
}

/// First instant at or after `now` at which `alarm` is armed.
fn next_occurrence(alarm: &Alarm, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    if !alarm.is_repeating() {
        let at = alarm.on(today);
        return Some(if at < now { at + Duration::days(1) } else { at });
    }
    (0..=7)
        .map(|offset| today + Duration::days(offset))
        .filter(|date| alarm.repeat.contains(date.weekday()) && !alarm.fired_on(*date))
        .map(|date| alarm.on(date))
        .find(|at| *at >= now)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::alarm::{Meridiem, RepeatDays};
    use crate::notify::test_support::{Note, RecordingSink};
    use chrono::{NaiveDate, Timelike, Weekday};

    // 2024-03-04 is a Monday.
    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn quiet() -> RingOptions {
        RingOptions {
            volume: Volume::default(),
            ringer: RingerConfig {
                gap: std::time::Duration::from_millis(5),
                max_duration: std::time::Duration::from_millis(50),
            },
        }
    }

    fn setup() -> (AlarmScheduler, AlarmStore, Arc<RecordingSink>, SharedSink) {
        let sink = Arc::new(RecordingSink::default());
        let shared: SharedSink = sink.clone();
        (AlarmScheduler::new(), AlarmStore::new(), sink, shared)
    }

    #[test]
    fn one_shot_fires_within_window_and_disarms() {
        let (mut sched, mut store, sink, shared) = setup();
        let id = store.add(NewAlarm::at(7, 30, Meridiem::AM).label("Wake")).unwrap();

        assert!(sched.tick(at(7, 29, 59), &mut store, quiet(), 5, &shared).is_none());
        let fired = sched.tick(at(7, 30, 3), &mut store, quiet(), 5, &shared);
        assert!(matches!(fired, Some(Event::AlarmFired { alarm_id, .. }) if alarm_id == id));
        assert_eq!(sched.state(), SchedulerState::Sounding);
        assert!(!store.get(id).unwrap().active);
        assert_eq!(sink.count(&Note::Prompt("Wake".into())), 1);

        assert!(sched.dismiss(at(7, 30, 10), &shared).is_some());
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert!(sink.notes().contains(&Note::Stop));
    }

    #[test]
    fn one_shot_outside_window_does_not_fire() {
        let (mut sched, mut store, _sink, shared) = setup();
        store.add(NewAlarm::at(7, 30, Meridiem::AM)).unwrap();
        assert!(sched.tick(at(7, 30, 5), &mut store, quiet(), 5, &shared).is_none());
    }

    #[test]
    fn repeating_alarm_fires_once_per_day() {
        let (mut sched, mut store, _sink, shared) = setup();
        let id = store
            .add(NewAlarm::at(6, 0, Meridiem::AM).repeat(RepeatDays::from_days([Weekday::Mon])))
            .unwrap();

        assert!(sched.tick(at(6, 0, 0), &mut store, quiet(), 5, &shared).is_some());
        sched.dismiss(at(6, 0, 1), &shared);
        for s in 1..5 {
            assert!(sched.tick(at(6, 0, s), &mut store, quiet(), 5, &shared).is_none());
        }
        let alarm = store.get(id).unwrap();
        assert!(alarm.active);
        assert_eq!(alarm.last_fired, Some(at(0, 0, 0).date()));

        // Tuesday is not armed; next Monday is.
        let tuesday = at(6, 0, 0) + Duration::days(1);
        assert!(sched.tick(tuesday, &mut store, quiet(), 5, &shared).is_none());
        let next_monday = at(6, 0, 0) + Duration::days(7);
        assert!(sched.tick(next_monday, &mut store, quiet(), 5, &shared).is_some());
    }

    #[test]
    fn sounding_blocks_other_alarms() {
        let (mut sched, mut store, sink, shared) = setup();
        store.add(NewAlarm::at(8, 0, Meridiem::AM).label("first")).unwrap();
        store.add(NewAlarm::at(8, 0, Meridiem::AM).label("second")).unwrap();

        assert!(sched.tick(at(8, 0, 0), &mut store, quiet(), 5, &shared).is_some());
        assert!(sched.tick(at(8, 0, 1), &mut store, quiet(), 5, &shared).is_none());
        assert_eq!(sched.current_alarm().unwrap().label, "first");
        assert_eq!(sink.count(&Note::Prompt("second".into())), 0);
    }

    #[test]
    fn snooze_adds_one_shot_alarm() {
        let (mut sched, mut store, _sink, shared) = setup();
        store.add(NewAlarm::at(9, 15, Meridiem::PM)).unwrap();
        sched.tick(at(21, 15, 2), &mut store, quiet(), 5, &shared);

        let now = at(21, 15, 20);
        let event = sched.snooze(now, 5, &mut store, &shared).unwrap();
        assert!(matches!(event, Some(Event::AlarmSnoozed { .. })));
        assert_eq!(sched.state(), SchedulerState::Idle);

        let snooze = store.list().last().unwrap();
        assert_eq!(snooze.label, "Snooze");
        assert!(snooze.active && !snooze.is_repeating());
        let next = sched.next_alarm(now, &store).unwrap();
        assert_eq!(next.id, snooze.id);
        assert_eq!(next.at, at(21, 20, 0));
        assert_eq!(next.at.with_second(0), (now + Duration::minutes(5)).with_second(0));
    }

    #[test]
    fn snooze_while_idle_is_noop() {
        let (mut sched, mut store, _sink, shared) = setup();
        assert!(sched.snooze(at(1, 0, 0), 5, &mut store, &shared).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn zero_minute_snooze_is_rejected() {
        let (mut sched, mut store, _sink, shared) = setup();
        store.add(NewAlarm::at(9, 0, Meridiem::AM)).unwrap();
        sched.tick(at(9, 0, 0), &mut store, quiet(), 5, &shared);
        assert!(sched.snooze(at(9, 0, 1), 0, &mut store, &shared).is_err());
        assert_eq!(sched.state(), SchedulerState::Sounding);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn immediate_prompt_answer_is_applied() {
        let sink = Arc::new(RecordingSink::answering(AlarmResponse::Snooze));
        let shared: SharedSink = sink.clone();
        let mut sched = AlarmScheduler::new();
        let mut store = AlarmStore::new();
        store.add(NewAlarm::at(6, 45, Meridiem::AM)).unwrap();

        assert!(sched.tick(at(6, 45, 0), &mut store, quiet(), 10, &shared).is_some());
        assert_eq!(sched.state(), SchedulerState::Idle);
        let snooze = store.list().last().unwrap();
        assert_eq!((snooze.hour, snooze.minute), (6, 55));
    }

    #[test]
    fn immediate_dismiss_answer_silences_without_snooze() {
        let sink = Arc::new(RecordingSink::answering(AlarmResponse::Dismiss));
        let shared: SharedSink = sink.clone();
        let mut sched = AlarmScheduler::new();
        let mut store = AlarmStore::new();
        store.add(NewAlarm::at(6, 45, Meridiem::AM).label("Gym")).unwrap();

        let fired = sched.tick(at(6, 45, 1), &mut store, quiet(), 10, &shared);
        assert!(matches!(fired, Some(Event::AlarmFired { .. })));
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert!(sched.current_alarm().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(sink.count(&Note::Prompt("Gym".into())), 1);
        assert!(sink.notes().contains(&Note::Stop));
    }

    #[test]
    fn snooze_crosses_midnight() {
        let (mut sched, mut store, _sink, shared) = setup();
        store.add(NewAlarm::at(11, 58, Meridiem::PM)).unwrap();
        sched.tick(at(23, 58, 0), &mut store, quiet(), 5, &shared);

        let now = at(23, 58, 30);
        let event = sched.snooze(now, 5, &mut store, &shared).unwrap();
        let tomorrow = at(0, 3, 0) + Duration::days(1);
        assert!(matches!(event, Some(Event::AlarmSnoozed { until, .. }) if until == tomorrow + Duration::seconds(30)));

        let snooze = store.list().last().unwrap().clone();
        assert_eq!((snooze.hour, snooze.minute, snooze.meridiem), (12, 3, Meridiem::AM));
        assert_eq!(sched.next_alarm(now, &store).unwrap().at, tomorrow);

        assert!(sched.tick(tomorrow - Duration::seconds(1), &mut store, quiet(), 5, &shared).is_none());
        let fired = sched.tick(tomorrow + Duration::seconds(1), &mut store, quiet(), 5, &shared);
        assert!(matches!(fired, Some(Event::AlarmFired { alarm_id, .. }) if alarm_id == snooze.id));
    }

    #[test]
    fn fired_repeating_alarm_is_not_next_again_today() {
        let (mut sched, mut store, _sink, shared) = setup();
        store
            .add(NewAlarm::at(7, 0, Meridiem::AM).repeat(RepeatDays::EVERY_DAY))
            .unwrap();
        assert!(sched.tick(at(7, 0, 0), &mut store, quiet(), 5, &shared).is_some());
        sched.dismiss(at(7, 0, 0), &shared);

        let next = sched.next_alarm(at(7, 0, 0), &store).unwrap();
        assert_eq!(next.at, at(7, 0, 0) + Duration::days(1));
    }

    #[test]
    fn next_alarm_picks_soonest() {
        let (sched, mut store, _sink, _shared) = setup();
        store.add(NewAlarm::at(9, 30, Meridiem::AM).label("later")).unwrap();
        store.add(NewAlarm::at(9, 0, Meridiem::AM).label("sooner")).unwrap();

        let next = sched.next_alarm(at(8, 0, 0), &store).unwrap();
        assert_eq!(next.label, "sooner");
        assert_eq!(next.at, at(9, 0, 0));
        assert_eq!(next.display(), "09:00 AM - sooner");
    }

    #[test]
    fn next_alarm_rolls_past_alarms_to_tomorrow() {
        let (sched, mut store, _sink, _shared) = setup();
        store.add(NewAlarm::at(7, 0, Meridiem::AM)).unwrap();
        let next = sched.next_alarm(at(8, 0, 0), &store).unwrap();
        assert_eq!(next.at, at(7, 0, 0) + Duration::days(1));
    }

    #[test]
    fn next_alarm_finds_next_repeat_day() {
        let (sched, mut store, _sink, _shared) = setup();
        store
            .add(NewAlarm::at(7, 0, Meridiem::AM).repeat(RepeatDays::from_days([Weekday::Thu])))
            .unwrap();
        let next = sched.next_alarm(at(8, 0, 0), &store).unwrap();
        assert_eq!(next.at, at(7, 0, 0) + Duration::days(3));
    }

    #[test]
    fn next_alarm_line_variants() {
        let (sched, mut store, _sink, _shared) = setup();
        assert_eq!(sched.next_alarm_line(at(8, 0, 0), &store), "No alarms set");
        let id = store.add(NewAlarm::default()).unwrap();
        store.toggle_active(id).unwrap();
        assert_eq!(sched.next_alarm_line(at(8, 0, 0), &store), "No active alarms");
    }
}
