#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless runner that plays a Tile Defence session at a fixed tick rate
//! and prints what happened.

mod session;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::Parser;

use crate::settings::{Settings, TowerPlacement};

#[derive(Parser, Debug)]
#[command(
    name = "tile-defence",
    about = "Plays a Tile Defence session without a window"
)]
struct Cli {
    /// Settings file (TOML). Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to play.
    #[arg(long, default_value_t = 120.0)]
    duration: f32,
    /// Fixed ticks per simulated second.
    #[arg(long, default_value_t = 30)]
    tick_rate: u32,
    /// Overrides the seed from the settings file.
    #[arg(long)]
    seed: Option<u64>,
    /// Extra tower as COLUMN,ROW,KIND. May be repeated.
    #[arg(long = "tower", value_name = "COLUMN,ROW,KIND")]
    towers: Vec<TowerPlacement>,
}

/// Entry point for the headless Tile Defence runner.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();
    if !(cli.duration.is_finite() && cli.duration > 0.0) {
        bail!("duration must be a positive number of seconds");
    }
    if cli.tick_rate == 0 {
        bail!("tick rate must be at least one tick per second");
    }

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.game.seed = seed;
    }
    settings.towers.extend(cli.towers);

    let step = Duration::from_secs_f64(1.0 / f64::from(cli.tick_rate));
    let ticks = (f64::from(cli.duration) * f64::from(cli.tick_rate)).ceil() as u64;
    log::info!(
        "playing {:.1}s at {} ticks per second with seed {}",
        cli.duration,
        cli.tick_rate,
        settings.game.seed
    );

    let summary = session::run(settings, step, ticks)?;
    println!("{summary}");
    Ok(())
}
