use std::path::Path;

use anyhow::{Context, Result};
use robosim_core::{Angle, Obstacle, Pose, Vector2};
use serde::{Deserialize, Serialize};

use crate::{Simulation, SimulationConfig};

/// A walled 500 x 500 arena with a round pillar and a triangular block.
pub const DEMO_ARENA: &str = r#"{
    "obstacles": [
        {"type": "rectangle", "min": [-10.0, -10.0], "max": [510.0, 0.0]},
        {"type": "rectangle", "min": [-10.0, 500.0], "max": [510.0, 510.0]},
        {"type": "rectangle", "min": [-10.0, 0.0], "max": [0.0, 500.0]},
        {"type": "rectangle", "min": [500.0, 0.0], "max": [510.0, 500.0]},
        {"type": "circle", "center": [350.0, 250.0], "radius": 40.0},
        {"type": "polygon", "vertices": [[120.0, 380.0], [200.0, 380.0], [160.0, 450.0]]}
    ],
    "robot": {"position": [100.0, 250.0], "heading_deg": 0.0}
}"#;

/// Arena description: the obstacles and where the robot starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arena {
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub robot: RobotStart,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RobotStart {
    pub position: Vector2,
    /// Heading in degrees, counter-clockwise from +x.
    #[serde(default)]
    pub heading_deg: f64,
}

impl Default for RobotStart {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            heading_deg: 0.0,
        }
    }
}

impl RobotStart {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, Angle::from_degrees(self.heading_deg))
    }
}

impl Arena {
    /// Parses an arena. Every obstacle is validated; one bad obstacle rejects the
    /// whole arena.
    pub fn from_json(json: &str) -> Result<Self> {
        let arena: Arena = serde_json::from_str(json).context("Failed to parse arena")?;
        arena
            .robot
            .pose()
            .validate()
            .context("Invalid robot start pose")?;
        Ok(arena)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read arena file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In arena file {}", path.display()))
    }

    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_ARENA)
    }

    /// Creates a simulation with this arena's obstacles, in file order.
    pub fn into_simulation(self, config: SimulationConfig) -> Simulation {
        let sim = Simulation::new(config);
        sim.robot().set_pose(self.robot.pose());
        for obstacle in self.obstacles {
            sim.add_obstacle(obstacle);
        }
        log::info!(
            "Loaded arena with {} obstacles, robot at ({:.1}, {:.1}) heading {}",
            sim.field().len(),
            self.robot.position.x,
            self.robot.position.y,
            self.robot.pose().heading
        );
        sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_arena_is_valid() {
        let arena = Arena::demo().unwrap();
        assert_eq!(arena.obstacles.len(), 6);
        let sim = arena.into_simulation(SimulationConfig::default());
        assert_eq!(sim.field().len(), 6);
        assert_eq!(sim.robot().pose().position, Vector2::new(100.0, 250.0));
    }

    #[test]
    fn rejects_arena_with_bad_obstacle() {
        let json = r#"{"obstacles": [
            {"type": "circle", "center": [0.0, 0.0], "radius": 5.0},
            {"type": "polygon", "vertices": [[0.0, 0.0], [1.0, 1.0]]}
        ]}"#;
        assert!(Arena::from_json(json).is_err());
    }

    #[test]
    fn missing_robot_defaults_to_origin() {
        let arena = Arena::from_json(r#"{"obstacles": []}"#).unwrap();
        assert_eq!(arena.robot.pose(), Pose::default());
    }
}
