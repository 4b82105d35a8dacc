use std::sync::{PoisonError, RwLock};

use robosim_core::{Angle, Pose, Vector2};
use robosim_sensors::PoseSource;

/// The robot body. Holds the pose that the motion side writes and the sensors read.
#[derive(Debug, Default)]
pub struct Robot {
    pose: RwLock<Pose>,
}

impl Robot {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose: RwLock::new(pose),
        }
    }

    pub fn pose(&self) -> Pose {
        *self.pose.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_pose(&self, pose: Pose) {
        *self.pose.write().unwrap_or_else(PoisonError::into_inner) = pose;
    }

    /// Moves the robot `distance` units along its heading. Negative values back up.
    pub fn advance(&self, distance: f64) {
        let mut pose = self.pose.write().unwrap_or_else(PoisonError::into_inner);
        let step = pose.heading.rotate_vector(&Vector2::new(distance, 0.0));
        pose.position += step;
    }

    /// Turns the robot in place, counter-clockwise for positive angles.
    pub fn rotate(&self, angle: Angle) {
        let mut pose = self.pose.write().unwrap_or_else(PoisonError::into_inner);
        pose.heading = pose.heading + angle;
    }
}

impl PoseSource for Robot {
    fn current_pose(&self) -> Pose {
        self.pose()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn advance_follows_heading() {
        let robot = Robot::new(Pose::new(Vector2::new(10.0, 10.0), Angle::PI_2));
        robot.advance(5.0);
        let pose = robot.pose();
        assert_relative_eq!(pose.position.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(pose.position.y, 15.0, epsilon = 1e-9);

        robot.rotate(Angle::PI_2);
        robot.advance(-5.0);
        assert_relative_eq!(robot.pose().position.x, 15.0, epsilon = 1e-9);
    }
}
