use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A heading in radians, always wrapped into (-pi, pi].
///
/// Zero points along the arena's +x axis and angles grow counter-clockwise:
///
/// ```
/// # use robosim_core::Angle;
/// let a = Angle::from_degrees(170.0) + Angle::from_degrees(20.0);
/// assert!((a.degrees() + 170.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Angle(f64);

impl Angle {
    pub const PI_2: Angle = Angle(PI / 2.0);

    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Rotate `v` counter-clockwise by this angle.
    pub fn rotate_vector(&self, v: &Vector2) -> Vector2 {
        nalgebra::Rotation2::new(self.0) * v
    }
}

impl From<f64> for Angle {
    fn from(radians: f64) -> Self {
        Angle::from_radians(radians)
    }
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.1} deg", self.degrees())
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::from_radians(0.0)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        let diff = (self.0 - other.0).abs();
        const TOLERANCE: f64 = 1e-9;
        !(TOLERANCE..=(2.0 * PI - TOLERANCE)).contains(&diff)
    }
}

fn wrap_angle(angle: f64) -> f64 {
    // NaN and infinities pass through so that pose validation can reject them.
    if !angle.is_finite() {
        return angle;
    }
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}
