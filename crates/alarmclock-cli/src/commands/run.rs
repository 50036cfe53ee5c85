use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use alarmclock_core::countdown::duration_from_hms;
use alarmclock_core::{
    AlarmClock, AlarmResponse, CountdownPacer, Event, SharedSink, SystemClock, TickReport,
    TracingSink,
};

use super::alarm::AlarmArgs;
use super::session::{Reply, SessionCommand, HELP};

const FAST_TICK: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AutoAnswer {
    Snooze,
    Dismiss,
}

impl From<AutoAnswer> for AlarmResponse {
    fn from(a: AutoAnswer) -> Self {
        match a {
            AutoAnswer::Snooze => AlarmResponse::Snooze,
            AutoAnswer::Dismiss => AlarmResponse::Dismiss,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub alarms: AlarmArgs,
    /// Start a countdown: seconds ("90") or "HH:MM:SS"
    #[arg(long, value_parser = parse_countdown)]
    pub timer: Option<u64>,
    /// Start the stopwatch and show it on stderr
    #[arg(long)]
    pub stopwatch: bool,
    /// World clock zone (repeatable; default: New York, London, Tokyo, Sydney)
    #[arg(long = "zone", value_name = "ZONE")]
    pub zones: Vec<String>,
    /// Settings file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Answer every alarm prompt automatically
    #[arg(long, value_enum)]
    pub auto: Option<AutoAnswer>,
    /// Stop after this many seconds
    #[arg(long = "for", value_name = "SECS")]
    pub run_for: Option<u64>,
    /// Print each tick as a JSON line
    #[arg(long)]
    pub json: bool,
}

fn parse_countdown(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    let parts: Vec<u32> = s
        .split(':')
        .map(|p| p.parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| "Please enter valid numbers for time".to_string())?;
    match parts.as_slice() {
        [h, m, sec] => duration_from_hms(*h, *m, *sec).map_err(|e| e.to_string()),
        [m, sec] => duration_from_hms(0, *m, *sec).map_err(|e| e.to_string()),
        _ => Err(format!("expected seconds or HH:MM:SS, got '{s}'")),
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run_loop(args));
    // A blocking stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn run_loop(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::settings::load(args.config.as_deref())?;
    let sink: SharedSink = Arc::new(TracingSink {
        auto_response: args.auto.map(Into::into),
    });
    let world = super::world::registry(&args.zones)?;
    let mut clock = AlarmClock::with_settings(Arc::new(SystemClock), sink, settings)
        .with_world_clock(world);

    for draft in args.alarms.drafts()? {
        let id = clock.add_alarm(draft)?;
        info!(%id, "alarm set");
    }
    if args.stopwatch {
        clock.stopwatch_start();
    }
    let mut pacer = CountdownPacer::default();
    if let Some(secs) = args.timer {
        clock.countdown_start(secs)?;
        pacer.follow(clock.countdown().state());
    }

    let deadline = args
        .run_for
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let mut second = tokio::time::interval(Duration::from_secs(1));
    let mut fast = tokio::time::interval(FAST_TICK);
    fast.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut stopwatch_shown = false;
    info!("{HELP}");

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            _ = second.tick() => {
                let report = clock.tick();
                print_report(&report, args.json)?;
                if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                    break;
                }
            }
            _ = fast.tick(), if clock.stopwatch().is_running() => {
                stopwatch_shown = true;
                eprint!("\rstopwatch {}", clock.stopwatch_display());
            }
            Some(msg) = pacer.recv() => {
                if let Some(event) = clock.apply_countdown(msg) {
                    print_event(&event)?;
                }
                pacer.follow(clock.countdown().state());
            }
            line = input.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => {
                        handle_command(&line, &mut clock)?;
                        pacer.follow(clock.countdown().state());
                    }
                    Ok(None) => input_open = false,
                    Err(e) => {
                        warn!("stdin closed: {e}");
                        input_open = false;
                    }
                }
            }
        }
    }

    if stopwatch_shown {
        eprintln!();
    }
    Ok(())
}

/// Apply one stdin command. Bad input is reported and the session goes on.
fn handle_command(line: &str, clock: &mut AlarmClock) -> Result<(), Box<dyn std::error::Error>> {
    let command = match line.parse::<SessionCommand>() {
        Ok(command) => command,
        Err(e) => {
            warn!("{e}");
            return Ok(());
        }
    };
    match command.apply(clock) {
        Ok(replies) => {
            for reply in replies {
                match reply {
                    Reply::Event(event) => print_event(&event)?,
                    Reply::Line(text) => println!("{text}"),
                }
            }
        }
        Err(e) => warn!("{e}"),
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn print_report(report: &TickReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    println!(
        "{}  {}  next: {}  timer: {}",
        report.face.time, report.face.date, report.next_alarm, report.timer
    );
    for event in &report.events {
        print_event(event)?;
    }
    Ok(())
}
