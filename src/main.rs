//! Firefly viewer: runs one emitter in a window.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use firefly::{EmitterConfig, FrameClock, ParticleEngine};

#[derive(Parser)]
#[command(name = "firefly", version, about = "Drifting, fading particle emitter")]
struct Cli {
    /// Emitter configuration (JSON). Defaults to the firefly preset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulation speed relative to wall-clock time
    #[arg(short, long, default_value_t = 0.5)]
    time_scale: f32,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Longest frame, in seconds, fed to the simulation
    #[arg(long, default_value_t = firefly::time::DEFAULT_MAX_DELTA)]
    max_delta: f32,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("firefly=info".parse()?))
        .init();

    let config = match &cli.config {
        Some(path) => EmitterConfig::load(path)
            .with_context(|| format!("loading emitter config {}", path.display()))?,
        None => EmitterConfig::fireflies(),
    };

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut engine = match cli.seed {
        Some(seed) => ParticleEngine::with_seed(seed),
        None => ParticleEngine::new(),
    };
    engine.set_values(config)?;
    info!(
        pool_size = engine.pool_size(),
        time_scale = cli.time_scale,
        "Firefly starting"
    );

    let clock = FrameClock::new()
        .with_time_scale(cli.time_scale)
        .with_max_delta(cli.max_delta);
    firefly::viewer::run(engine, clock)?;

    info!("Firefly shutdown complete");
    Ok(())
}
