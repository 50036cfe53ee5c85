use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::tone::Tone;

/// Stable handle to an alarm in an [`super::AlarmStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(Uuid);

impl AlarmId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AlarmId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ValidationError::invalid("alarm id", format!("not an alarm id: '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Meridiem {
    #[default]
    AM,
    PM,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::AM => f.write_str("AM"),
            Meridiem::PM => f.write_str("PM"),
        }
    }
}

impl FromStr for Meridiem {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Meridiem::AM),
            "PM" => Ok(Meridiem::PM),
            _ => Err(ValidationError::invalid("meridiem", format!("expected AM or PM, got '{s}'"))),
        }
    }
}

/// Convert a 12-hour clock reading to 0..=23.
pub fn to_24h(hour: u32, meridiem: Meridiem) -> u32 {
    match (meridiem, hour) {
        (Meridiem::AM, 12) => 0,
        (Meridiem::AM, h) => h,
        (Meridiem::PM, 12) => 12,
        (Meridiem::PM, h) => h + 12,
    }
}

/// Convert 0..=23 to a 12-hour reading.
pub fn to_12h(hour24: u32) -> (u32, Meridiem) {
    let meridiem = if hour24 < 12 { Meridiem::AM } else { Meridiem::PM };
    let hour = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    (hour, meridiem)
}

/// Set of weekdays an alarm repeats on. Empty means one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatDays(u8);

impl RepeatDays {
    pub const NONE: RepeatDays = RepeatDays(0);
    pub const WEEKDAYS: RepeatDays = RepeatDays(0b001_1111);
    pub const EVERY_DAY: RepeatDays = RepeatDays(0b111_1111);

    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::NONE, |set, d| set.with(d))
    }

    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | (1 << day.num_days_from_monday()))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        (0..7u8)
            .filter(move |i| self.0 & (1 << *i) != 0)
            .filter_map(|i| Weekday::try_from(i).ok())
    }
}

impl fmt::Display for RepeatDays {
    /// "Mon, Wed" or "Once".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Once");
        }
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}

impl FromStr for RepeatDays {
    type Err = ValidationError;

    /// Comma separated weekday names ("Mon,Tue"), "weekdays" or "daily";
    /// empty or "once" is one-shot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("once") {
            return Ok(Self::NONE);
        }
        if s.eq_ignore_ascii_case("daily") {
            return Ok(Self::EVERY_DAY);
        }
        if s.eq_ignore_ascii_case("weekdays") {
            return Ok(Self::WEEKDAYS);
        }
        s.split(',')
            .map(|part| {
                part.trim().parse::<Weekday>().map_err(|_| {
                    ValidationError::invalid("repeat", format!("unknown weekday '{}'", part.trim()))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_days)
    }
}

/// User input for a new alarm, validated by [`super::AlarmStore::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlarm {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
    pub label: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub repeat: RepeatDays,
}

impl Default for NewAlarm {
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
            meridiem: Meridiem::AM,
            label: "Alarm".into(),
            tone: Tone::ClassicAlarm,
            repeat: RepeatDays::NONE,
        }
    }
}

impl NewAlarm {
    pub fn at(hour: u32, minute: u32, meridiem: Meridiem) -> Self {
        Self {
            hour,
            minute,
            meridiem,
            ..Self::default()
        }
    }

    /// One-shot "Snooze" alarm at `at`, truncated to the minute.
    pub fn snooze(at: NaiveDateTime) -> Self {
        let (hour, meridiem) = to_12h(at.hour());
        Self {
            hour,
            minute: at.minute(),
            meridiem,
            label: "Snooze".into(),
            tone: Tone::ClassicAlarm,
            repeat: RepeatDays::NONE,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn repeat(mut self, repeat: RepeatDays) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=12).contains(&self.hour) {
            return Err(ValidationError::HourOutOfRange(self.hour));
        }
        if self.minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(self.minute));
        }
        Ok(())
    }
}

impl FromStr for NewAlarm {
    type Err = ValidationError;

    /// Parses "7:30 AM", "07:30PM" or "12:00am".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| ValidationError::invalid("time", format!("missing AM/PM in '{s}'")))?;
        let (clock, meridiem) = s.split_at(split);
        let meridiem: Meridiem = meridiem.parse()?;
        let (hour, minute) = clock
            .trim()
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid("time", format!("expected HH:MM in '{s}'")))?;
        let parse = |v: &str| {
            v.trim().parse::<u32>().map_err(|_| {
                ValidationError::invalid("time", "Please enter valid numbers for time")
            })
        };
        let alarm = NewAlarm::at(parse(hour)?, parse(minute)?, meridiem);
        alarm.validate()?;
        Ok(alarm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
    pub label: String,
    pub tone: Tone,
    pub repeat: RepeatDays,
    pub active: bool,
    /// Date of the most recent firing; guards against firing twice a day.
    #[serde(default)]
    pub last_fired: Option<NaiveDate>,
}

impl Alarm {
    pub(crate) fn from_new(new: NewAlarm) -> Self {
        Self {
            id: AlarmId::new(),
            hour: new.hour,
            minute: new.minute,
            meridiem: new.meridiem,
            label: new.label,
            tone: new.tone,
            repeat: new.repeat,
            active: true,
            last_fired: None,
        }
    }

    pub fn is_repeating(&self) -> bool {
        !self.repeat.is_empty()
    }

    pub fn hour24(&self) -> u32 {
        to_24h(self.hour, self.meridiem)
    }

    pub fn time_of_day(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour24(), self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// This alarm's time on `date`.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time_of_day())
    }

    pub fn fired_on(&self, date: NaiveDate) -> bool {
        self.last_fired == Some(date)
    }

    /// Whether the alarm is armed for `date`'s weekday.
    pub fn armed_on(&self, date: NaiveDate) -> bool {
        !self.is_repeating() || self.repeat.contains(date.weekday())
    }

    /// "07:30 AM"
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_hour_conversion() {
        assert_eq!(to_24h(12, Meridiem::AM), 0);
        assert_eq!(to_24h(1, Meridiem::AM), 1);
        assert_eq!(to_24h(12, Meridiem::PM), 12);
        assert_eq!(to_24h(11, Meridiem::PM), 23);
        assert_eq!(to_12h(0), (12, Meridiem::AM));
        assert_eq!(to_12h(12), (12, Meridiem::PM));
        assert_eq!(to_12h(23), (11, Meridiem::PM));
    }

    #[test]
    fn repeat_days_parse_and_display() {
        let days: RepeatDays = "Mon, wed,Sun".parse().unwrap();
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Wed));
        assert!(!days.contains(Weekday::Tue));
        assert_eq!(days.to_string(), "Mon, Wed, Sun");
        assert_eq!(RepeatDays::NONE.to_string(), "Once");
        assert!("Funday".parse::<RepeatDays>().is_err());
        assert_eq!(RepeatDays::WEEKDAYS.iter().count(), 5);
    }

    #[test]
    fn repeat_days_shorthands() {
        let daily: RepeatDays = "Daily".parse().unwrap();
        assert_eq!(daily, RepeatDays::EVERY_DAY);
        assert_eq!(daily.iter().count(), 7);
        assert_eq!("weekdays".parse::<RepeatDays>(), Ok(RepeatDays::WEEKDAYS));
        assert!(!RepeatDays::WEEKDAYS.contains(Weekday::Sat));
    }

    #[test]
    fn alarm_id_round_trips_through_text() {
        let id = AlarmId::new();
        assert_eq!(id.to_string().parse::<AlarmId>(), Ok(id));
        assert!("not-a-uuid".parse::<AlarmId>().is_err());
    }

    #[test]
    fn parses_alarm_times() {
        let a: NewAlarm = "7:30 am".parse().unwrap();
        assert_eq!((a.hour, a.minute, a.meridiem), (7, 30, Meridiem::AM));
        let b: NewAlarm = "12:05PM".parse().unwrap();
        assert_eq!((b.hour, b.minute, b.meridiem), (12, 5, Meridiem::PM));
        assert_eq!(
            "13:00 PM".parse::<NewAlarm>(),
            Err(ValidationError::HourOutOfRange(13))
        );
        assert!("7:30".parse::<NewAlarm>().is_err());
        assert!("seven:30 AM".parse::<NewAlarm>().is_err());
    }

    #[test]
    fn snooze_draft_truncates_to_minute() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(23, 58, 42)
            .unwrap();
        let draft = NewAlarm::snooze(at);
        assert_eq!((draft.hour, draft.minute, draft.meridiem), (11, 58, Meridiem::PM));
        assert_eq!(draft.label, "Snooze");
        assert!(draft.repeat.is_empty());
    }
}
