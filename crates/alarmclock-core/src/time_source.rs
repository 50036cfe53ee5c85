//! Wall-clock access.
//!
//! Engines never read the system clock directly; they are handed a
//! [`TimeSource`] so the same code runs against the real clock and against a
//! [`ManualClock`] in tests and simulations.

use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;

use crate::error::TimezoneError;

pub trait TimeSource: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Milliseconds since the Unix epoch, used for elapsed-time bookkeeping.
    fn epoch_ms(&self) -> u64;

    /// Current time in the named IANA zone.
    ///
    /// # Errors
    /// Returns [`TimezoneError::UnknownTimezone`] when `zone` is not a known
    /// identifier.
    fn now_in(&self, zone: &str) -> Result<DateTime<Tz>, TimezoneError>;
}

/// Parse an IANA timezone identifier.
pub fn parse_zone(zone: &str) -> Result<Tz, TimezoneError> {
    Tz::from_str(zone).map_err(|_| TimezoneError::UnknownTimezone(zone.to_string()))
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn epoch_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn now_in(&self, zone: &str) -> Result<DateTime<Tz>, TimezoneError> {
        let tz = parse_zone(zone)?;
        Ok(Utc::now().with_timezone(&tz))
    }
}

/// A settable clock.
///
/// Holds a UTC instant and a fixed local offset; `now()` reports the instant
/// shifted by that offset.
#[derive(Debug)]
pub struct ManualClock {
    instant: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock whose local time equals UTC, starting at `local`.
    pub fn new(local: NaiveDateTime) -> Self {
        Self::with_offset(local, Utc.fix())
    }

    /// Clock starting at `local` in a zone `offset` away from UTC.
    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
        Self {
            instant: Mutex::new(utc.and_utc()),
            offset,
        }
    }

    pub fn set_local(&self, local: NaiveDateTime) {
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        *self.lock() = utc.and_utc();
    }

    pub fn advance(&self, by: Duration) {
        let mut instant = self.lock();
        *instant += by;
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid instant.
        self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.lock().with_timezone(&self.offset).naive_local()
    }

    fn epoch_ms(&self) -> u64 {
        self.lock().timestamp_millis().max(0) as u64
    }

    fn now_in(&self, zone: &str) -> Result<DateTime<Tz>, TimezoneError> {
        let tz = parse_zone(zone)?;
        Ok(self.lock().with_timezone(&tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(at(8, 0, 0));
        let before = clock.epoch_ms();
        clock.advance_ms(1500);
        assert_eq!(clock.epoch_ms() - before, 1500);
        assert_eq!(clock.now(), at(8, 0, 1) + Duration::milliseconds(500));
    }

    #[test]
    fn manual_clock_reports_zone_time() {
        let clock = ManualClock::new(at(12, 0, 0));
        let tokyo = clock.now_in("Asia/Tokyo").unwrap();
        assert_eq!(tokyo.hour(), 21);
    }

    #[test]
    fn offset_shifts_local_time_only() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let clock = ManualClock::with_offset(at(12, 0, 0), offset);
        assert_eq!(clock.now(), at(12, 0, 0));
        assert_eq!(clock.now_in("UTC").unwrap().hour(), 11);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let clock = ManualClock::new(at(12, 0, 0));
        assert_eq!(
            clock.now_in("Invalid/Zone"),
            Err(TimezoneError::UnknownTimezone("Invalid/Zone".into()))
        );
        assert!(SystemClock.now_in("Nowhere/Land").is_err());
    }
}
