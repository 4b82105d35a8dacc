use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use robosim_core::Angle;
use robosim_sensors::TouchSensor;
use robosim_simulator::Robot;

/// Ticks spent reversing after a bump.
const BACKUP_TICKS: u32 = 10;
const TURN_DEG: f64 = 75.0;

/// Drives straight until a bumper is hit, then backs up and turns away.
///
/// Bumps arrive through touch listeners on the notifier threads and are picked up on
/// the next call to [`BumperDriver::drive`].
pub struct BumperDriver {
    bumped: Arc<AtomicBool>,
    speed: f64,
    backing_up: u32,
}

impl BumperDriver {
    pub fn new(speed: f64) -> Self {
        Self {
            bumped: Arc::new(AtomicBool::new(false)),
            speed,
            backing_up: 0,
        }
    }

    /// Listens to `sensor` for bumps.
    pub fn watch(&self, sensor: &TouchSensor) -> Result<()> {
        let bumped = self.bumped.clone();
        sensor
            .attach_callbacks(
                move |port| {
                    log::info!("Bumper {} pressed", port);
                    bumped.store(true, Ordering::Release);
                },
                |port| log::info!("Bumper {} released", port),
            )
            .with_context(|| format!("Failed to listen to bumper {}", sensor.port()))
    }

    /// Moves the robot for one tick.
    pub fn drive(&mut self, robot: &Robot) {
        if self.bumped.swap(false, Ordering::Acquire) && self.backing_up == 0 {
            self.backing_up = BACKUP_TICKS;
        }

        if self.backing_up > 0 {
            robot.advance(-self.speed);
            self.backing_up -= 1;
            if self.backing_up == 0 {
                robot.rotate(Angle::from_degrees(TURN_DEG));
            }
        } else {
            robot.advance(self.speed);
        }
    }
}
