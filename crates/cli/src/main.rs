//! Queue Simulator CLI - terminal front-end for the simulation engine
//!
//! Renders throttled snapshots and forwards the start/stop and
//! reconfigure intents typed on stdin.

mod command;
mod logging;
mod render;
mod session;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use command::Command;
use queuesim_core::application::worker::constants::{
    DEFAULT_WORKER_COUNT, FRAME_PROGRESS_INTERVAL_MS,
};
use queuesim_core::domain::config::{
    DEFAULT_DISPATCH_INTERVAL_MS, DEFAULT_JOB_CREATION_INTERVAL_MS, DEFAULT_MAX_PROCESSING_TIME_MS,
    DEFAULT_MIN_PROCESSING_TIME_MS,
};
use queuesim_core::SimulationConfig;
use render::Renderer;
use session::Session;
use std::time::Duration;
use tokio::time::{interval, sleep};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "queuesim")]
#[command(about = "Worker pool / FIFO queue simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of workers in the pool
    #[arg(short, long, env = "QUEUESIM_WORKERS", default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Lower bound of a job's simulated duration (ms)
    #[arg(
        long,
        env = "QUEUESIM_MIN_PROCESSING_MS",
        default_value_t = DEFAULT_MIN_PROCESSING_TIME_MS
    )]
    min_processing_ms: u64,

    /// Upper bound of a job's simulated duration (ms)
    #[arg(
        long,
        env = "QUEUESIM_MAX_PROCESSING_MS",
        default_value_t = DEFAULT_MAX_PROCESSING_TIME_MS
    )]
    max_processing_ms: u64,

    /// Period of job generation (ms)
    #[arg(
        short,
        long,
        env = "QUEUESIM_INTERVAL_MS",
        default_value_t = DEFAULT_JOB_CREATION_INTERVAL_MS
    )]
    interval_ms: u64,

    /// Period of the idle-worker dispatch sweep (ms)
    #[arg(long, env = "QUEUESIM_DISPATCH_MS", default_value_t = DEFAULT_DISPATCH_INTERVAL_MS)]
    dispatch_ms: u64,

    /// Seed for reproducible job durations
    #[arg(long, env = "QUEUESIM_SEED")]
    seed: Option<u64>,

    /// Dashboard refresh period (ms)
    #[arg(long, env = "QUEUESIM_REFRESH_MS", default_value_t = 500)]
    refresh_ms: u64,

    /// Stop automatically after this many seconds
    #[arg(long, env = "QUEUESIM_DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Emit snapshots as JSON lines instead of tables
    #[arg(long)]
    json: bool,

    /// Wait for `s` instead of starting immediately
    #[arg(long)]
    paused: bool,
}

impl Cli {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::new(self.min_processing_ms, self.max_processing_ms, self.interval_ms)
            .with_dispatch_interval_ms(self.dispatch_ms)
            .with_progress_interval_ms(FRAME_PROGRESS_INTERVAL_MS)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    info!("Queue Simulator v{} starting...", queuesim_core::VERSION);

    let mut session = Session::new(cli.workers, cli.simulation_config(), cli.seed)?;
    let renderer = Renderer::new(cli.json);

    if !cli.paused {
        session.manager().start();
    }
    if !cli.json {
        println!("{}", command::HELP.dimmed());
    }
    renderer.render(&session.manager().snapshot())?;

    let mut input = command::spawn_stdin_reader();
    let mut input_open = true;
    let mut refresh = interval(Duration::from_millis(cli.refresh_ms.max(1)));
    let mut latest = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        match cli.duration_secs {
            Some(secs) => sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupt received, stopping...");
                break;
            }
            _ = &mut deadline => {
                info!("Duration elapsed, stopping...");
                break;
            }
            Some(snapshot) = session.next_snapshot() => {
                latest = Some(snapshot);
            }
            _ = refresh.tick() => {
                if let Some(snapshot) = latest.take() {
                    renderer.render(&snapshot)?;
                }
            }
            line = input.recv(), if input_open => {
                let Some(line) = line else {
                    input_open = false;
                    continue;
                };
                match command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Toggle)) => session.toggle(),
                    Ok(Some(Command::Help)) => println!("{}", command::HELP),
                    Ok(Some(Command::Reconfigure {
                        min_processing_ms,
                        max_processing_ms,
                        job_creation_interval_ms,
                    })) => {
                        let config = SimulationConfig {
                            min_processing_time_ms: min_processing_ms,
                            max_processing_time_ms: max_processing_ms,
                            job_creation_interval_ms,
                            ..session.manager().config().clone()
                        };
                        match session.reconfigure(config) {
                            Ok(()) => renderer.render(&session.manager().snapshot())?,
                            Err(e) => warn!(error = %format!("{:#}", e), "Reconfigure rejected"),
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{} {}", "✗".red(), e),
                }
            }
        }
    }

    let last = session.shutdown();
    renderer.render_summary(&last)?;
    info!("Shutdown complete.");

    Ok(())
}
