use clap::Args;
use chrono::NaiveDateTime;

use alarmclock_core::world_clock::known_zones;
use alarmclock_core::WorldClockRegistry;

#[derive(Args, Debug)]
pub struct WorldArgs {
    /// Timezone to show (repeatable; default: New York, London, Tokyo, Sydney)
    #[arg(long = "zone", value_name = "ZONE")]
    pub zones: Vec<String>,
    /// Report for this UTC time instead of now ("YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_parser = super::parse_local_time)]
    pub at: Option<NaiveDateTime>,
}

/// Registry for `zones`, or the defaults when empty.
pub fn registry(zones: &[String]) -> Result<WorldClockRegistry, Box<dyn std::error::Error>> {
    if zones.is_empty() {
        return Ok(WorldClockRegistry::with_defaults());
    }
    let mut registry = WorldClockRegistry::new();
    for zone in zones {
        registry.add(zone)?;
    }
    Ok(registry)
}

pub fn run(args: WorldArgs) -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry(&args.zones)?;
    let time = super::time_source(args.at);
    let readings = registry.refresh(time.as_ref());
    println!("{}", serde_json::to_string_pretty(&readings)?);
    Ok(())
}

pub fn zones(filter: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = filter.map(str::to_ascii_lowercase);
    for zone in known_zones() {
        if filter
            .as_deref()
            .map_or(true, |f| zone.to_ascii_lowercase().contains(f))
        {
            println!("{zone}");
        }
    }
    Ok(())
}
