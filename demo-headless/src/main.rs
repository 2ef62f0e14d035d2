//! Headless wildfire run
//!
//! Loads a grid from cell rows (or builds a uniform one with a central
//! ignition), runs it to the horizon and reports each snapshot. Ctrl+C stops
//! the run at the next step boundary; the final snapshot is still reported.
//!
//! Usage:
//!   wildfire-headless --rows 128 --cols 128 --horizon 300 --wind-speed 4
//!   wildfire-headless --input terrain.csv --rows 200 --cols 300 --config run.json --json

use std::fs::File;
use std::future::Future;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use wildfire_ca_core::{
    CancellationFlag, CellParams, CellState, GridDims, GridLoader, GridStore, Scheduler,
    SimulationConfig, SimulationView,
};

/// Wildfire cellular automaton, headless driver
#[derive(Parser, Debug)]
#[command(name = "wildfire-headless")]
#[command(about = "Run a probabilistic wildfire spread simulation", long_about = None)]
struct Args {
    /// Cell rows file (`row,col,P,S,F,D,gamma,B,N` per line)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Grid rows
    #[arg(long, default_value_t = 64)]
    rows: usize,

    /// Grid columns
    #[arg(long, default_value_t = 64)]
    cols: usize,

    /// JSON run configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of steps
    #[arg(long)]
    horizon: Option<u64>,

    /// Snapshot every N steps
    #[arg(short = 's', long)]
    snapshot_every: Option<u64>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u32>,

    /// Cell side length in meters
    #[arg(long)]
    cell_size: Option<f32>,

    /// Time step
    #[arg(long)]
    tau: Option<f32>,

    /// Extinguish threshold
    #[arg(long)]
    theta: Option<f32>,

    /// Base spread rate
    #[arg(long)]
    k0: Option<f32>,

    /// Wind influence
    #[arg(long)]
    k1: Option<f32>,

    /// Slope influence
    #[arg(long)]
    k2: Option<f32>,

    /// Compute generations on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Wind speed of the uniform grid
    #[arg(long, default_value_t = 2.0)]
    wind_speed: f32,

    /// Wind direction of the uniform grid in degrees (0 = +col, 90 = +row)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f32,

    /// Flammability of the uniform grid
    #[arg(long, default_value_t = 0.8)]
    flammability: f32,

    /// Print snapshots and the summary as JSON lines
    #[arg(long)]
    json: bool,
}

impl Args {
    fn run_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };

        if let Some(v) = self.horizon {
            config.horizon = v;
        }
        if let Some(v) = self.snapshot_every {
            config.snapshot_every = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.cell_size {
            config.cell_size = v;
        }
        if let Some(v) = self.tau {
            config.tau = v;
        }
        if let Some(v) = self.theta {
            config.theta = v;
        }
        if let Some(v) = self.k0 {
            config.k0 = v;
        }
        if let Some(v) = self.k1 {
            config.k1 = v;
        }
        if let Some(v) = self.k2 {
            config.k2 = v;
        }
        config.parallel |= self.parallel;
        Ok(config)
    }

    fn grid(&self) -> Result<GridStore> {
        let dims = GridDims::new(self.rows, self.cols);
        if let Some(path) = &self.input {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let grid = GridLoader::read_from(dims, BufReader::new(file))
                .with_context(|| format!("loading {}", path.display()))?;
            info!("Loaded {}x{} grid from {}", dims.rows, dims.cols, path.display());
            return Ok(grid);
        }

        let params = CellParams {
            flammability: self.flammability,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction.to_radians(),
            ..CellParams::default()
        };
        let mut grid = GridStore::uniform(dims, params, CellState::unburnt(1.0))?;
        grid.ignite(dims.rows / 2, dims.cols / 2)?;
        info!("Built uniform {}x{} grid, ignited at the center", dims.rows, dims.cols);
        Ok(grid)
    }
}

fn report(view: &SimulationView<'_>, json: bool) -> bool {
    let stats = view.stats();
    if json {
        match serde_json::to_string(&stats) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to encode snapshot: {}", e),
        }
    } else {
        println!(
            "step {:>6}: {:>7} burning, {:>7} spent, fuel {:>12.2}",
            stats.step, stats.burning_cells, stats.spent_cells, stats.total_fuel
        );
    }
    true
}

/// Request a stop once `interrupt` resolves. A failure to listen leaves the
/// run uninterruptible rather than cancelling it.
async fn stop_on_interrupt<F>(interrupt: F, cancel: CancellationFlag)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = interrupt.await {
        warn!("Failed to listen for Ctrl+C, the run cannot be interrupted: {}", e);
        return;
    }
    info!("Interrupt received, stopping after the current step");
    cancel.request_stop();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.run_config()?;
    let grid = args.grid()?;
    let mut scheduler = Scheduler::new(grid, config).context("invalid run configuration")?;

    let cancel = CancellationFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(stop_on_interrupt(signal::ctrl_c(), on_signal));

    let json = args.json;
    let summary = tokio::task::spawn_blocking(move || {
        scheduler.run(&mut |view: &SimulationView<'_>| report(view, json), &cancel)
    })
    .await
    .context("simulation thread panicked")?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "\n{} steps, {} snapshots, {}",
            summary.steps_completed, summary.dumps, summary.stop_reason
        );
    }
    Ok(())
}
