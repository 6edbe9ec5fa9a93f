//! Skirmish - headless battle runner
//!
//! Loads a map directory and an optional state file, then runs paced
//! simulation cycles and prints the committed events.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use skirmish::core::error::Result;
use skirmish::core::{GameConfig, RuntimeConfig, SimulationContext};
use skirmish::simulation::{CycleReport, Simulation, SimulationClock, TileMap, MAP_FILE_NAME};
use skirmish::state::{StateDumper, StateLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Run a skirmish battle headless
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a tile-based skirmish and print what happens each cycle")]
struct Args {
    /// Map directory (must contain map.txt)
    map_dir_path: PathBuf,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// State file to load subjects from
    #[arg(long)]
    state: Option<PathBuf>,

    /// Directory where placement mode saves the state on exit
    #[arg(long, default_value = ".")]
    state_save_dir: PathBuf,

    /// Troop placement mode: perception and combat are suspended
    #[arg(long)]
    placement: bool,

    /// Number of cycles to run
    #[arg(long, default_value_t = 20)]
    cycles: u64,

    /// Run cycles back to back instead of at the configured rate
    #[arg(long)]
    fast: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("skirmish={}", config.global.logging_level))
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = RuntimeConfig {
        placement_mode: args.placement,
        state_save_dir: args.state_save_dir.clone(),
        map_dir_path: args.map_dir_path.clone(),
    };

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let map = TileMap::load_dir(&runtime.map_dir_path)?;
    let map_name = runtime.map_dir_path.join(MAP_FILE_NAME).display().to_string();
    let mut simulation = Simulation::new(map_name, map, Some(seed));

    if let Some(path) = &args.state {
        let state = StateLoader::new().load_file(path)?;
        if state.map_name != simulation.map_name {
            tracing::warn!(
                "State {} was saved for map {}, running on {}",
                path.display(),
                state.map_name,
                simulation.map_name
            );
        }
        state.install(&mut simulation)?;
    }

    tracing::info!(
        "Starting {} cycles on {} with {} subjects (seed {}, placement {})",
        args.cycles,
        simulation.map_name,
        simulation.subjects.len(),
        seed,
        runtime.placement_mode
    );

    let period = Duration::from_secs_f64(config.core.cycle_duration);
    let clock = SimulationClock::start();

    for _ in 0..args.cycles {
        let started = Instant::now();
        let ctx = SimulationContext::new(&config, &runtime, clock.now());
        let report = simulation.run_cycle(&ctx);
        print_report(&report, args.format)?;

        if !args.fast {
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    if runtime.placement_mode {
        StateDumper::new().save_to_dir(&simulation, &runtime.state_save_dir)?;
    }

    tracing::info!(
        "Finished after {} cycles, {} subjects alive",
        simulation.cycle(),
        simulation.subjects.alive_count()
    );
    Ok(())
}

fn print_report(report: &CycleReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => {
            if report.log.is_empty() && report.failures.is_empty() {
                return Ok(());
            }
            println!(
                "=== cycle {} ({:.2}s, {} alive) ===",
                report.cycle, report.at, report.alive
            );
            for event in report.log.iter() {
                println!("  {:?}", event);
            }
            for failure in &report.failures {
                println!(
                    "  ! {} {:?}/{:?}: {}",
                    failure.subject, failure.behaviour, failure.phase, failure.error
                );
            }
        }
    }
    Ok(())
}
