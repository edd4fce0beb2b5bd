// Ramify Music Generator: CLI entry point.
//
// Composes the demonstration arrangement and writes it to a Standard MIDI
// File, optionally dumping the composition as JSON as well.
//
// Usage:
//   cargo run -p ramify_music -- [output.mid] [--config FILE] [--bars N]
//     [--tempo BPM] [--seed N] [--scale STEPS|major|arabic|harmonic_minor]
//     [--swap-inverted] [--json FILE]
//
// Flags override values from the config file. Set RUST_LOG=debug for
// per-motive statistics.

use ramify_music::arrangement::compose;
use ramify_music::config::GeneratorConfig;
use ramify_music::error::Result;
use ramify_music::generator::RangePolicy;
use ramify_music::midi::write_midi;
use ramify_music::scale::{ARABIC, HARMONIC_MINOR, MAJOR};
use ramify_prng::SeededRng;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_flag::<PathBuf>(args, "--config") {
        Some(path) => GeneratorConfig::load(&path)?,
        None => GeneratorConfig::default(),
    };
    apply_flags(&mut config, args);

    let seed = config.seed.unwrap_or_else(clock_seed);
    if config.seed.is_none() {
        log::info!("no seed given, using {seed}");
    }

    println!("=== Ramify Music Generator ===");
    println!("Output: {}", config.output.display());
    println!("Bars: {}", config.bars);
    println!("Tempo: {} BPM", config.tempo_bpm);
    println!("Scale steps: {}", config.scale_steps);
    println!("Seed: {seed}");
    println!();

    println!("[1/2] Composing...");
    let mut rng = SeededRng::new(seed);
    let composition = compose(&config, &mut rng)?;
    print!("{}", composition.summary());
    let seconds = composition.length().to_f64() * 60.0 / config.tempo_bpm.max(1) as f64;
    println!("  Length: {} beats ({seconds:.0}s)", composition.length());

    println!("[2/2] Writing MIDI to {}...", config.output.display());
    write_midi(&composition, &config.output)?;
    if let Some(json_path) = &config.export_json {
        std::fs::write(json_path, composition.to_json()?)?;
        println!("  Composition JSON written to {}", json_path.display());
    }

    println!();
    println!("Play with: timidity {} (or any MIDI player)", config.output.display());
    Ok(())
}

fn apply_flags(config: &mut GeneratorConfig, args: &[String]) {
    if let Some(output) = args.get(1).filter(|s| !s.starts_with("--")) {
        config.output = PathBuf::from(output);
    }
    if let Some(bars) = parse_flag(args, "--bars") {
        config.bars = bars;
    }
    if let Some(tempo) = parse_flag(args, "--tempo") {
        config.tempo_bpm = tempo;
    }
    if let Some(seed) = parse_flag(args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(scale) = parse_flag::<String>(args, "--scale") {
        config.scale_steps = scale_preset(&scale).to_string();
    }
    if args.iter().any(|a| a == "--swap-inverted") {
        config.range_policy = RangePolicy::SwapInverted;
    }
    if let Some(json) = parse_flag(args, "--json") {
        config.export_json = Some(json);
    }
}

/// Named presets map to their step strings; anything else is taken as steps.
fn scale_preset(name: &str) -> &str {
    match name.to_lowercase().as_str() {
        "major" => MAJOR,
        "arabic" => ARABIC,
        "harmonic_minor" | "minor" => HARMONIC_MINOR,
        _ => name,
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    let value = args
        .iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))?;
    let parsed = value.parse().ok();
    if parsed.is_none() {
        log::warn!("ignoring {flag} {value:?}: not a valid value");
    }
    parsed
}
