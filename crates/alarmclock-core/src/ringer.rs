//! Background tone loop for a sounding alarm.
//!
//! The worker plays the tone, sleeps, and repeats until it is cancelled or
//! the configured duration runs out. Cancellation is cooperative: a flag is
//! checked on every iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::notify::SharedSink;
use crate::tone::{Tone, Volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingerConfig {
    /// Pause between repetitions.
    pub gap: Duration,
    /// Give up after this long even if nobody answers.
    pub max_duration: Duration,
}

impl RingerConfig {
    pub fn for_duration(max_duration: Duration) -> Self {
        Self {
            max_duration,
            ..Self::default()
        }
    }
}

impl Default for RingerConfig {
    fn default() -> Self {
        Self {
            gap: Duration::from_millis(500),
            max_duration: Duration::from_secs(60),
        }
    }
}

/// Handle to a running tone loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct Ringer {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<u32>>,
}

impl Ringer {
    pub fn spawn(tone: Tone, volume: Volume, config: RingerConfig, sink: SharedSink) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        debug!(%tone, ?config, "ringer started");

        let handle = thread::Builder::new()
            .name("alarm-ringer".into())
            .spawn(move || {
                let started = Instant::now();
                let mut plays = 0;
                while !flag.load(Ordering::Acquire) && started.elapsed() < config.max_duration {
                    sink.play_tone(tone, volume);
                    plays += 1;
                    thread::sleep(config.gap);
                }
                plays
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("failed to spawn ringer thread: {e}");
                None
            }
        };
        Self { cancel, handle }
    }

    /// Ask the loop to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel and wait for the loop to exit. Returns how many times the tone
    /// was played.
    pub fn stop(mut self) -> u32 {
        self.cancel();
        let plays = self
            .handle
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or(0);
        debug!(plays, "ringer stopped");
        plays
    }
}

impl Drop for Ringer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::{Note, RecordingSink};

    fn fast(max: Duration) -> RingerConfig {
        RingerConfig {
            gap: Duration::from_millis(5),
            max_duration: max,
        }
    }

    #[test]
    fn stop_cancels_loop() {
        let sink = Arc::new(RecordingSink::default());
        let ringer = Ringer::spawn(
            Tone::Chime,
            Volume::default(),
            fast(Duration::from_secs(30)),
            sink.clone(),
        );
        thread::sleep(Duration::from_millis(30));
        let plays = ringer.stop();
        assert!(plays >= 1);

        let after_stop = sink.notes().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.notes().len(), after_stop);
        assert_eq!(sink.count(&Note::Tone(Tone::Chime)) as u32, plays);
    }

    #[test]
    fn dropping_handle_cancels_loop() {
        let sink = Arc::new(RecordingSink::default());
        let ringer = Ringer::spawn(
            Tone::BeepPattern,
            Volume::default(),
            fast(Duration::from_secs(30)),
            sink.clone(),
        );
        let flag = Arc::clone(&ringer.cancel);
        thread::sleep(Duration::from_millis(20));
        drop(ringer);
        assert!(flag.load(Ordering::Acquire));

        // Let an in-flight iteration finish.
        thread::sleep(Duration::from_millis(20));
        let after_drop = sink.notes().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.notes().len(), after_drop);
    }

    #[test]
    fn gives_up_after_max_duration() {
        let sink = Arc::new(RecordingSink::default());
        let ringer = Ringer::spawn(
            Tone::Siren,
            Volume::MAX,
            fast(Duration::from_millis(20)),
            sink.clone(),
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        while !ringer.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(ringer.is_finished());
        assert!(ringer.stop() >= 1);
    }
}
