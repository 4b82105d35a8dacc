use robosim_core::GeometryError;
use thiserror::Error;

use crate::SensorPort;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Sensor on port {0} is not part of the robot. Call add_part() to assemble it.")]
    NotAttached(SensorPort),
    #[error("Sensor on port {0} is already part of a robot")]
    AlreadyAttached(SensorPort),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Listener of sensor {port} panicked: {message}")]
    ListenerPanic { port: SensorPort, message: String },
    #[error("Failed to start notifier thread: {0}")]
    NotifierSpawn(#[from] std::io::Error),
}
