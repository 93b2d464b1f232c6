//! Traces a triangle or a Koch snowflake with the simulated turtle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use koch_turtle::{ControlConfig, PathKind, Pose, Runner, SimTurtle};

/// Spawn point of the simulated turtle, the centre of an 11 x 11 arena.
const SPAWN: f64 = 5.544445;

#[derive(Parser)]
#[command(name = "koch_turtle")]
#[command(version)]
#[command(about = "Proportional turtle control along a Koch snowflake")]
struct Cli {
    /// Trace a plain triangle instead of the snowflake
    #[arg(long)]
    triangle: bool,

    /// TOML file with gains, thresholds and an optional tick budget
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging (every pose and primitive)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => ControlConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ControlConfig::default(),
    };

    let kind = if cli.triangle {
        PathKind::Triangle
    } else {
        PathKind::Snowflake
    };

    let sim = SimTurtle::new(Pose::new(SPAWN, SPAWN, 0.0));
    let mut runner = Runner::new(sim, config)?;
    let end = runner.run(kind)?;

    let sim = runner.into_driver().into_link();
    tracing::info!(
        commands = sim.sent().len(),
        pumps = sim.pumps(),
        "final pose ({:.2}, {:.2}, {:.4}°)",
        end.x,
        end.y,
        end.theta.to_degrees()
    );
    Ok(())
}
