use serde::{Deserialize, Serialize};

/// Default boundary tolerance, in arena units.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Settings for containment and contact tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Points closer than this to an obstacle boundary count as touching it.
    pub epsilon: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}
