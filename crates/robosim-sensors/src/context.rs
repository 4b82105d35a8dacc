use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use robosim_core::{ObstacleField, Pose};

use crate::SensorError;

/// Default pause inside polling queries, so that tight polling loops in user code
/// leave room for the simulation thread.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(1);

/// Supplies the robot's pose. Implemented by the motion side of the simulator.
pub trait PoseSource: Send + Sync {
    fn current_pose(&self) -> Pose;
}

impl PoseSource for RwLock<Pose> {
    fn current_pose(&self) -> Pose {
        *self.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a part needs from the simulation it has been added to.
#[derive(Clone)]
pub struct SensorContext {
    field: Arc<ObstacleField>,
    pose: Arc<dyn PoseSource>,
    poll_delay: Duration,
}

impl SensorContext {
    pub fn new(field: Arc<ObstacleField>, pose: Arc<dyn PoseSource>) -> Self {
        Self {
            field,
            pose,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn current_pose(&self) -> Pose {
        self.pose.current_pose()
    }

    pub fn poll_delay(&self) -> Duration {
        self.poll_delay
    }
}

impl fmt::Debug for SensorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorContext")
            .field("obstacles", &self.field.len())
            .field("poll_delay", &self.poll_delay)
            .finish()
    }
}

/// A part that can be plugged into the robot.
///
/// The simulation calls [`Part::attach`] once when the part is added, then
/// [`Part::act`] once per tick on the simulation thread, and [`Part::cleanup`] on
/// teardown. `act` must not block.
pub trait Part: Send + Sync {
    /// Short human readable name, used in logs.
    fn name(&self) -> String;

    fn attach(&self, ctx: SensorContext) -> Result<(), SensorError>;

    fn act(&self) -> Result<(), SensorError>;

    fn cleanup(&self);
}
