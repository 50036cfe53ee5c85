//! World clock.
//!
//! A list of tracked IANA zones. Each refresh formats the current time in
//! every zone; a failed lookup only affects its own entry.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::time_source::{parse_zone, TimeSource};

pub const DEFAULT_ZONES: [&str; 4] = [
    "America/New_York",
    "Europe/London",
    "Asia/Tokyo",
    "Australia/Sydney",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClockEntry {
    pub timezone_id: String,
    /// Last path segment of the id with underscores as spaces.
    pub display_name: String,
}

impl WorldClockEntry {
    fn new(timezone_id: &str) -> Self {
        let display_name = timezone_id
            .rsplit('/')
            .next()
            .unwrap_or(timezone_id)
            .replace('_', " ");
        Self {
            timezone_id: timezone_id.to_string(),
            display_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorldClockReading {
    Available {
        display_name: String,
        timezone_id: String,
        /// `%I:%M:%S %p`
        time: String,
        /// `%A, %B %d, %Y`
        date: String,
    },
    Unavailable {
        display_name: String,
        timezone_id: String,
    },
}

impl WorldClockReading {
    pub fn is_available(&self) -> bool {
        matches!(self, WorldClockReading::Available { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorldClockRegistry {
    entries: Vec<WorldClockEntry>,
}

impl WorldClockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with [`DEFAULT_ZONES`].
    pub fn with_defaults() -> Self {
        Self {
            entries: DEFAULT_ZONES.iter().map(|z| WorldClockEntry::new(z)).collect(),
        }
    }

    /// Track another zone.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownTimezone`] for ids that are not in
    /// the timezone database.
    pub fn add(&mut self, timezone_id: &str) -> Result<&WorldClockEntry, ValidationError> {
        let timezone_id = timezone_id.trim();
        parse_zone(timezone_id)
            .map_err(|_| ValidationError::UnknownTimezone(timezone_id.to_string()))?;
        self.entries.push(WorldClockEntry::new(timezone_id));
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[WorldClockEntry] {
        &self.entries
    }

    /// Current reading for every entry, in insertion order. Never fails.
    pub fn refresh(&self, time: &dyn TimeSource) -> Vec<WorldClockReading> {
        self.entries
            .iter()
            .map(|entry| match time.now_in(&entry.timezone_id) {
                Ok(now) => WorldClockReading::Available {
                    display_name: entry.display_name.clone(),
                    timezone_id: entry.timezone_id.clone(),
                    time: now.format("%I:%M:%S %p").to_string(),
                    date: now.format("%A, %B %d, %Y").to_string(),
                },
                Err(e) => {
                    warn!(zone = %entry.timezone_id, "world clock lookup failed: {e}");
                    WorldClockReading::Unavailable {
                        display_name: entry.display_name.clone(),
                        timezone_id: entry.timezone_id.clone(),
                    }
                }
            })
            .collect()
    }
}

/// Every zone identifier the registry accepts.
pub fn known_zones() -> impl Iterator<Item = &'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name())
}
