//! Digital and analog clock face values.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Hand angles in degrees, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandAngles {
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockFace {
    /// `%I:%M:%S %p`
    pub time: String,
    /// `%A, %B %d, %Y`
    pub date: String,
    pub hands: HandAngles,
}

impl ClockFace {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            time: now.format("%I:%M:%S %p").to_string(),
            date: now.format("%A, %B %d, %Y").to_string(),
            hands: HandAngles::at(now),
        }
    }
}

impl HandAngles {
    pub fn at(now: NaiveDateTime) -> Self {
        let minute = f64::from(now.minute());
        Self {
            hour: f64::from(now.hour() % 12) * 30.0 + minute * 0.5,
            minute: minute * 6.0,
            second: f64::from(now.second()) * 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_digital_face() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        let face = ClockFace::at(now);
        assert_eq!(face.time, "03:04:05 PM");
        assert_eq!(face.date, "Thursday, July 04, 2024");
    }

    #[test]
    fn hand_angles() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(15, 30, 15)
            .unwrap();
        let hands = HandAngles::at(now);
        assert_eq!(hands.hour, 105.0);
        assert_eq!(hands.minute, 180.0);
        assert_eq!(hands.second, 90.0);
    }
}
