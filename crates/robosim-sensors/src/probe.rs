use std::sync::Arc;

use robosim_core::{GeometryError, LineSegment, Obstacle, ObstacleId, Pose, Vector2};

use crate::SensorPort;

/// Contact geometry of a sensor: a segment fixed in the robot's local frame.
///
/// The probe carries no state between ticks. Each query maps the local segment
/// through the pose it is given.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionProbe {
    local: LineSegment,
}

impl CollisionProbe {
    pub fn new(local: LineSegment) -> Self {
        Self { local }
    }

    /// The bumper probe of a touch sensor plugged into `port`.
    pub fn for_port(port: SensorPort) -> Self {
        Self::new(port.touch_probe())
    }

    pub fn local_segment(&self) -> LineSegment {
        self.local
    }

    /// The probe in arena coordinates for the given robot pose.
    pub fn world_segment(&self, pose: &Pose) -> Result<LineSegment, GeometryError> {
        pose.segment_to_world(&self.local)
    }

    /// The first obstacle, in field order, that the probe touches.
    pub fn first_contact(
        &self,
        pose: &Pose,
        obstacles: &[Arc<Obstacle>],
        epsilon: f64,
    ) -> Result<Option<ObstacleId>, GeometryError> {
        let segment = self.world_segment(pose)?;
        Ok(obstacles
            .iter()
            .position(|obstacle| obstacle.overlaps_segment(&segment, epsilon))
            .map(ObstacleId::new))
    }

    /// Where the probe crosses the boundary of `obstacle`.
    pub fn contact_points(
        &self,
        pose: &Pose,
        obstacle: &Obstacle,
    ) -> Result<Vec<Vector2>, GeometryError> {
        let segment = self.world_segment(pose)?;
        Ok(obstacle.intersection_points_with(&[segment]))
    }
}
