use clap::Args;
use chrono::NaiveDateTime;

use alarmclock_core::{AlarmClock, NewAlarm, RepeatDays, SharedSink, Tone, TracingSink, WorldClockRegistry};

/// Alarms to set up for a session.
#[derive(Args, Debug, Clone)]
pub struct AlarmArgs {
    /// Alarm time such as "7:30 AM" (repeatable)
    #[arg(long = "alarm", value_name = "HH:MM AM|PM")]
    pub alarms: Vec<String>,
    /// Label for the alarms
    #[arg(long, default_value = "Alarm")]
    pub label: String,
    /// Tone for the alarms ("Classic Alarm", "chime", ...)
    #[arg(long, default_value = "classic-alarm")]
    pub tone: String,
    /// Repeat days: "Mon,Wed,Fri", "weekdays" or "daily" (default: once)
    #[arg(long, default_value = "once")]
    pub repeat: String,
}

impl AlarmArgs {
    pub fn drafts(&self) -> Result<Vec<NewAlarm>, Box<dyn std::error::Error>> {
        let tone: Tone = self.tone.parse()?;
        let repeat: RepeatDays = self.repeat.parse()?;
        self.alarms
            .iter()
            .map(|time| -> Result<NewAlarm, Box<dyn std::error::Error>> {
                let draft: NewAlarm = time.parse()?;
                Ok(draft.label(self.label.clone()).tone(tone).repeat(repeat))
            })
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct NextArgs {
    #[command(flatten)]
    pub alarms: AlarmArgs,
    /// Evaluate at this local time instead of now ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_parser = super::parse_local_time)]
    pub at: Option<NaiveDateTime>,
}

pub fn next(args: NextArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sink: SharedSink = std::sync::Arc::new(TracingSink::default());
    let mut clock = AlarmClock::new(super::time_source(args.at), sink)
        .with_world_clock(WorldClockRegistry::new());
    for draft in args.alarms.drafts()? {
        clock.add_alarm(draft)?;
    }

    match clock.next_alarm() {
        Some(next) => println!("{}", serde_json::to_string_pretty(&next)?),
        None => println!("{}", clock.tick().next_alarm),
    }
    Ok(())
}
