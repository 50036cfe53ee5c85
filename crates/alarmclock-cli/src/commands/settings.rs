use std::path::{Path, PathBuf};

use clap::Subcommand;
use alarmclock_core::Settings;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    Show {
        /// Settings file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print one setting
    Get {
        /// Setting key (e.g. "volume", "snooze_minutes")
        key: String,
        /// Settings file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Settings from `path`, or the defaults.
pub fn load(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show { config } => {
            let settings = load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Get { key, config } => {
            let settings = load(config.as_deref())?;
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
    }
    Ok(())
}
