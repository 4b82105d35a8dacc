use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use robosim_sensors::{SensorPort, TouchSensor};
use robosim_simulator::{Arena, SimulationConfig};
use tokio::time::{interval, MissedTickBehavior};

mod drive;

use drive::BumperDriver;

#[derive(Debug, Parser)]
#[command(name = "robosim-cli")]
pub(crate) struct Args {
    /// Arena JSON file. Uses the built-in demo arena if not given.
    #[clap(long)]
    arena: Option<PathBuf>,

    /// Stop after this many ticks. Runs until ctrl-c otherwise.
    #[clap(long)]
    ticks: Option<u64>,

    /// Distance driven per tick.
    #[clap(long, default_value = "4.0")]
    speed: f64,

    /// Run ticks back to back instead of in real time.
    #[clap(long, default_value = "false")]
    fast: bool,

    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.parse::<log::LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid log level: {}", args.log_level);
            std::process::exit(1);
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let arena = match &args.arena {
        Some(path) => Arena::load(path)?,
        None => Arena::demo().context("Failed to load demo arena")?,
    };
    let config = SimulationConfig::default();
    let tick_interval = Duration::from_secs_f64(config.tick_interval);
    let mut sim = arena.into_simulation(config);

    let mut driver = BumperDriver::new(args.speed);
    for port in [SensorPort::S1, SensorPort::S2, SensorPort::S3] {
        let sensor = Arc::new(TouchSensor::new(port));
        sim.add_part(sensor.clone())?;
        driver.watch(&sensor)?;
    }

    let mut frames = interval(if args.fast {
        Duration::from_micros(1)
    } else {
        tick_interval
    });
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if args.ticks.is_some_and(|ticks| sim.tick_count() >= ticks) {
            break;
        }
        tokio::select! {
            _ = frames.tick() => {
                driver.drive(sim.robot());
                sim.step();
            }
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for ctrl-c")?;
                log::info!("Interrupted");
                break;
            }
        }
    }

    log::info!(
        "Shutting down after {} ticks ({:.1}s simulated)",
        sim.tick_count(),
        sim.sim_time()
    );
    sim.shutdown();
    Ok(())
}
