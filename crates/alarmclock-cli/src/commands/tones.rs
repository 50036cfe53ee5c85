use alarmclock_core::Tone;
use serde::Serialize;

#[derive(Serialize)]
struct ToneInfo {
    id: Tone,
    name: &'static str,
    beeps: usize,
    pattern_ms: u64,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let tones: Vec<ToneInfo> = Tone::ALL
        .into_iter()
        .map(|tone| ToneInfo {
            id: tone,
            name: tone.display_name(),
            beeps: tone.pattern().len(),
            pattern_ms: tone.pattern_ms(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&tones)?);
    Ok(())
}
