//! Stopwatch engine.
//!
//! Like the countdown timer this is a wall-clock state machine with no
//! internal thread. Every command has an `_at(now_ms)` form taking the
//! current epoch milliseconds so it can be driven by any
//! [`crate::TimeSource`].
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Stopped (accumulated time kept) -> reset -> Stopped (zero)
//! ```

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    /// 1-based.
    pub number: usize,
    pub lap_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopwatchEngine {
    running: bool,
    /// Epoch ms the current run is measured from, already shifted back by
    /// the time accumulated before it.
    start_epoch_ms: Option<u64>,
    /// Elapsed time as of the last stop.
    accumulated_ms: u64,
    laps: Vec<Lap>,
}

impl StopwatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn elapsed_ms_at(&self, now_ms: u64) -> u64 {
        match (self.running, self.start_epoch_ms) {
            (true, Some(start)) => now_ms.saturating_sub(start),
            _ => self.accumulated_ms,
        }
    }

    /// `HH:MM:SS.cc`
    pub fn display_at(&self, now_ms: u64) -> String {
        format_centis(self.elapsed_ms_at(now_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.start_epoch_ms = Some(now_ms.saturating_sub(self.accumulated_ms));
        Some(Event::StopwatchStarted {
            elapsed_ms: self.accumulated_ms,
        })
    }

    pub fn stop_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.accumulated_ms = self.elapsed_ms_at(now_ms);
        self.running = false;
        Some(Event::StopwatchStopped {
            elapsed_ms: self.accumulated_ms,
        })
    }

    /// Start when stopped, stop when running.
    pub fn toggle_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.running {
            self.stop_at(now_ms)
        } else {
            self.start_at(now_ms)
        }
    }

    /// Record a lap. Does nothing while stopped.
    pub fn lap_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        let total_ms = self.elapsed_ms_at(now_ms);
        let previous = self.laps.last().map(|l| l.total_ms).unwrap_or(0);
        let lap = Lap {
            number: self.laps.len() + 1,
            lap_ms: total_ms.saturating_sub(previous),
            total_ms,
        };
        self.laps.push(lap);
        Some(Event::LapRecorded {
            number: lap.number,
            lap_ms: lap.lap_ms,
            total_ms: lap.total_ms,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.start_epoch_ms = None;
        self.accumulated_ms = 0;
        self.laps.clear();
        Some(Event::StopwatchReset)
    }
}

/// Format milliseconds as `HH:MM:SS.cc`, truncating to centiseconds.
pub fn format_centis(ms: u64) -> String {
    let centis = (ms % 1000) / 10;
    let secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        centis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn elapsed_tracks_wall_clock() {
        let mut sw = StopwatchEngine::new();
        assert!(sw.start_at(T0).is_some());
        let elapsed = sw.elapsed_ms_at(T0 + 1000);
        assert!((990..=1010).contains(&elapsed));
        assert_eq!(sw.display_at(T0 + 1000), "00:00:01.00");
    }

    #[test]
    fn stop_then_start_resumes() {
        let mut sw = StopwatchEngine::new();
        sw.start_at(T0);
        sw.stop_at(T0 + 1500);
        assert!(!sw.is_running());
        // Time passing while stopped does not count.
        assert_eq!(sw.elapsed_ms_at(T0 + 60_000), 1500);

        sw.start_at(T0 + 60_000);
        assert_eq!(sw.elapsed_ms_at(T0 + 60_250), 1750);
    }

    #[test]
    fn laps_sum_to_total() {
        let mut sw = StopwatchEngine::new();
        sw.start_at(T0);
        sw.lap_at(T0 + 1200);
        sw.lap_at(T0 + 3000);

        let laps = sw.laps();
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].lap_ms, 1200);
        assert_eq!(laps[1].lap_ms, 1800);
        assert_eq!(laps[0].lap_ms + laps[1].lap_ms, laps[1].total_ms);
        assert_eq!(laps[1].number, 2);
    }

    #[test]
    fn lap_while_stopped_is_noop() {
        let mut sw = StopwatchEngine::new();
        assert!(sw.lap_at(T0).is_none());
        sw.start_at(T0);
        sw.stop_at(T0 + 10);
        assert!(sw.lap_at(T0 + 20).is_none());
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut sw = StopwatchEngine::new();
        sw.start_at(T0);
        sw.lap_at(T0 + 500);
        sw.reset();
        assert!(!sw.is_running());
        assert!(sw.laps().is_empty());
        assert_eq!(sw.elapsed_ms_at(T0 + 9999), 0);
    }

    #[test]
    fn toggle_alternates() {
        let mut sw = StopwatchEngine::new();
        assert!(matches!(sw.toggle_at(T0), Some(Event::StopwatchStarted { .. })));
        assert!(matches!(
            sw.toggle_at(T0 + 40),
            Some(Event::StopwatchStopped { elapsed_ms: 40 })
        ));
    }

    #[test]
    fn formats_centiseconds() {
        assert_eq!(format_centis(0), "00:00:00.00");
        assert_eq!(format_centis(3_723_456), "01:02:03.45");
        assert_eq!(format_centis(999), "00:00:00.99");
    }
}
