//! Commands read from stdin while `alarmclock run` is active.

use std::str::FromStr;

use alarmclock_core::{AlarmClock, AlarmId, AlarmResponse, CoreError, Event};

pub const HELP: &str = "commands: snooze | dismiss | pause | resume | reset | \
stopwatch | lap | clear | status | remove <id> | toggle <id> | help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Answer the sounding alarm.
    Respond(AlarmResponse),
    /// Countdown controls.
    Pause,
    Resume,
    Reset,
    /// Start or stop the stopwatch.
    Stopwatch,
    Lap,
    /// Reset the stopwatch.
    Clear,
    Status,
    Remove(AlarmId),
    Toggle(AlarmId),
    Help,
}

/// What a command produced, in the order it should be printed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Event(Event),
    Line(String),
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let id = |arg: Option<&str>| -> Result<AlarmId, String> {
            arg.ok_or_else(|| format!("'{name}' needs an alarm id"))?
                .parse::<AlarmId>()
                .map_err(|e| e.to_string())
        };
        let command = match name.as_str() {
            "snooze" => SessionCommand::Respond(AlarmResponse::Snooze),
            "dismiss" => SessionCommand::Respond(AlarmResponse::Dismiss),
            "pause" => SessionCommand::Pause,
            "resume" => SessionCommand::Resume,
            "reset" => SessionCommand::Reset,
            "stopwatch" => SessionCommand::Stopwatch,
            "lap" => SessionCommand::Lap,
            "clear" => SessionCommand::Clear,
            "status" => SessionCommand::Status,
            "remove" => SessionCommand::Remove(id(words.next())?),
            "toggle" => SessionCommand::Toggle(id(words.next())?),
            "help" | "?" => SessionCommand::Help,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(command)
    }
}

impl SessionCommand {
    pub fn apply(self, clock: &mut AlarmClock) -> Result<Vec<Reply>, CoreError> {
        let event = match self {
            SessionCommand::Respond(response) => {
                let event = clock.respond(response)?;
                if event.is_none() {
                    return Ok(vec![Reply::Line("no alarm is sounding".into())]);
                }
                event
            }
            SessionCommand::Pause => clock.countdown_pause(),
            SessionCommand::Resume => clock.countdown_resume(),
            SessionCommand::Reset => clock.countdown_reset(),
            SessionCommand::Stopwatch => clock.stopwatch_toggle(),
            SessionCommand::Lap => clock.stopwatch_lap(),
            SessionCommand::Clear => clock.stopwatch_reset(),
            SessionCommand::Status => return Ok(status(clock)),
            SessionCommand::Remove(id) => {
                let alarm = clock.remove_alarm(id)?;
                return Ok(vec![Reply::Line(format!(
                    "removed {} {}",
                    alarm.time_label(),
                    alarm.label
                ))]);
            }
            SessionCommand::Toggle(id) => {
                let active = clock.toggle_alarm(id)?;
                let state = if active { "on" } else { "off" };
                return Ok(vec![Reply::Line(format!("alarm {id} {state}"))]);
            }
            SessionCommand::Help => return Ok(vec![Reply::Line(HELP.into())]),
        };
        Ok(event.map(Reply::Event).into_iter().collect())
    }
}

fn status(clock: &AlarmClock) -> Vec<Reply> {
    let sounding = match clock.sounding_alarm() {
        Some(alarm) => format!("sounding: {} - {}", alarm.time_label(), alarm.label),
        None => "sounding: none".into(),
    };
    let mut replies = vec![
        Reply::Event(clock.countdown().snapshot()),
        Reply::Line(sounding),
        Reply::Line(format!("stopwatch: {}", clock.stopwatch_display())),
    ];
    replies.extend(
        clock
            .alarms()
            .iter()
            .map(|a| Reply::Line(format!("alarm {} {} {} active={}", a.id, a.time_label(), a.label, a.active))),
    );
    replies
}
