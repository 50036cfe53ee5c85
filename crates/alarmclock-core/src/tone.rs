//! Alarm tone catalog.
//!
//! Tones are a closed set. Each one is described as a pattern of beeps that
//! an audio backend renders; the core never produces sound itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    #[default]
    ClassicAlarm,
    BeepPattern,
    Chime,
    Melody,
    Siren,
}

/// One beep of a tone pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beep {
    pub freq_hz: u32,
    pub duration_ms: u64,
    /// Silence after the beep.
    pub pause_ms: u64,
}

impl Beep {
    const fn new(freq_hz: u32, duration_ms: u64, pause_ms: u64) -> Self {
        Self {
            freq_hz,
            duration_ms,
            pause_ms,
        }
    }
}

/// Playback volume, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Volume(u8);

impl Volume {
    pub const MAX: Volume = Volume(100);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::invalid(
                "volume",
                format!("must be between 0 and 100 (got {value})"),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume(50)
    }
}

impl TryFrom<u8> for Volume {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Volume::new(value)
    }
}

impl From<Volume> for u8 {
    fn from(v: Volume) -> Self {
        v.0
    }
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::ClassicAlarm,
        Tone::BeepPattern,
        Tone::Chime,
        Tone::Melody,
        Tone::Siren,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Tone::ClassicAlarm => "Classic Alarm",
            Tone::BeepPattern => "Beep Pattern",
            Tone::Chime => "Chime",
            Tone::Melody => "Melody",
            Tone::Siren => "Siren",
        }
    }

    /// The beeps that make up one repetition of this tone.
    pub fn pattern(self) -> Vec<Beep> {
        match self {
            Tone::ClassicAlarm => vec![Beep::new(800, 500, 0)],
            Tone::BeepPattern => [600, 800, 1000]
                .into_iter()
                .map(|f| Beep::new(f, 200, 100))
                .collect(),
            Tone::Chime => vec![Beep::new(880, 300, 200); 3],
            Tone::Melody => {
                const NOTES: [(u32, u64); 7] = [
                    (659, 300),
                    (587, 300),
                    (523, 300),
                    (587, 300),
                    (659, 300),
                    (659, 300),
                    (659, 600),
                ];
                NOTES.iter().map(|&(f, d)| Beep::new(f, d, 50)).collect()
            }
            Tone::Siren => {
                let up = (800..1200).step_by(20);
                let down = (820..=1200).rev().step_by(20);
                up.chain(down).map(|f| Beep::new(f, 50, 0)).collect()
            }
        }
    }

    /// Total length of one repetition in milliseconds.
    pub fn pattern_ms(self) -> u64 {
        self.pattern()
            .iter()
            .map(|b| b.duration_ms + b.pause_ms)
            .sum()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    /// Accepts the display name ("Classic Alarm") or the kebab-case id
    /// ("classic-alarm"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', " ");
        Tone::ALL
            .into_iter()
            .find(|t| t.display_name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| ValidationError::invalid("tone", format!("unknown tone '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_ids() {
        assert_eq!("Classic Alarm".parse::<Tone>().unwrap(), Tone::ClassicAlarm);
        assert_eq!("beep-pattern".parse::<Tone>().unwrap(), Tone::BeepPattern);
        assert_eq!("SIREN".parse::<Tone>().unwrap(), Tone::Siren);
        assert!("Foghorn".parse::<Tone>().is_err());
    }

    #[test]
    fn siren_sweeps_up_then_down() {
        let pattern = Tone::Siren.pattern();
        assert_eq!(pattern.len(), 40);
        assert_eq!(pattern[0].freq_hz, 800);
        assert_eq!(pattern[19].freq_hz, 1180);
        assert_eq!(pattern[20].freq_hz, 1200);
        assert_eq!(pattern[39].freq_hz, 820);
    }

    #[test]
    fn melody_length() {
        assert_eq!(Tone::Melody.pattern().len(), 7);
        assert_eq!(Tone::Melody.pattern_ms(), 6 * 350 + 650);
    }

    #[test]
    fn volume_bounds() {
        assert!(Volume::new(100).is_ok());
        assert!(Volume::new(101).is_err());
        assert_eq!(Volume::default().get(), 50);
    }
}
