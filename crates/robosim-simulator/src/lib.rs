use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use robosim_core::{CollisionSettings, Obstacle, ObstacleField, ObstacleId};
use robosim_sensors::{Part, SensorContext};
use serde::{Deserialize, Serialize};
use utils::IntervalTrigger;

mod arena;
mod robot;
mod utils;

pub use arena::*;
pub use robot::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Contact test settings shared by every sensor
    pub collision: CollisionSettings,
    /// Simulated time per tick in seconds
    pub tick_interval: f64,
    /// Pause inside sensor polling queries in milliseconds
    pub poll_delay_ms: u64,
    /// Interval between status log lines in simulated seconds
    pub status_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            collision: CollisionSettings::default(),
            tick_interval: 1.0 / 30.0,
            poll_delay_ms: 1,
            status_interval: 5.0,
        }
    }
}

/// The simulation context: the arena's obstacles, the robot and its parts.
///
/// The owner drives it by calling [`Simulation::step`] once per frame from a single
/// thread. Dropping the simulation cleans up every part.
pub struct Simulation {
    config: SimulationConfig,
    field: Arc<ObstacleField>,
    robot: Arc<Robot>,
    parts: Vec<Arc<dyn Part>>,
    tick_count: u64,
    status_trigger: IntervalTrigger,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let field = Arc::new(ObstacleField::with_settings(config.collision));
        let status_trigger = IntervalTrigger::new(config.status_interval);
        Self {
            config,
            field,
            robot: Arc::new(Robot::default()),
            parts: Vec::new(),
            tick_count: 0,
            status_trigger,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &Arc<ObstacleField> {
        &self.field
    }

    pub fn robot(&self) -> &Arc<Robot> {
        &self.robot
    }

    /// Places an obstacle in the arena. Takes effect from the next tick.
    pub fn add_obstacle(&self, obstacle: Obstacle) -> ObstacleId {
        self.field.register(obstacle)
    }

    /// Mounts a part on the robot and ticks it from now on.
    ///
    /// A part that fails to attach is not registered.
    pub fn add_part<P: Part + 'static>(&mut self, part: Arc<P>) -> Result<()> {
        let ctx = SensorContext::new(self.field.clone(), self.robot.clone())
            .with_poll_delay(Duration::from_millis(self.config.poll_delay_ms));
        part.attach(ctx)
            .with_context(|| format!("Failed to add {}", part.name()))?;
        log::debug!("Added {}", part.name());
        self.parts.push(part);
        Ok(())
    }

    /// Advances the simulation by one tick.
    ///
    /// Every part acts once, in the order it was added. A failing part is logged and
    /// does not keep the others from acting.
    pub fn step(&mut self) {
        for part in &self.parts {
            if let Err(err) = part.act() {
                log::error!("{} failed: {}", part.name(), err);
            }
        }
        self.tick_count += 1;

        let time = self.sim_time();
        if self.status_trigger.trigger(time) {
            let pose = self.robot.pose();
            log::info!(
                "t = {:.1}s, tick {}: robot at ({:.1}, {:.1}) heading {}, {} obstacles",
                time,
                self.tick_count,
                pose.position.x,
                pose.position.y,
                pose.heading,
                self.field.len()
            );
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time elapsed, in seconds.
    pub fn sim_time(&self) -> f64 {
        self.tick_count as f64 * self.config.tick_interval
    }

    /// Cleans up and unregisters all parts.
    pub fn shutdown(&mut self) {
        for part in self.parts.drain(..) {
            part.cleanup();
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}
