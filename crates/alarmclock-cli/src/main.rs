use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "alarmclock", version, about = "Headless alarm clock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the clock loop: alarms, countdown timer, stopwatch, world clock
    Run(commands::run::RunArgs),
    /// Show the next alarm to fire
    Next(commands::alarm::NextArgs),
    /// Show the current time in tracked timezones
    World(commands::world::WorldArgs),
    /// List known timezone identifiers
    Zones {
        /// Only list ids containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// List alarm tones
    Tones,
    /// Inspect settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Next(args) => commands::alarm::next(args),
        Commands::World(args) => commands::world::run(args),
        Commands::Zones { filter } => commands::world::zones(filter.as_deref()),
        Commands::Tones => commands::tones::run(),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "alarmclock", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
