use serde::{Deserialize, Serialize};

use crate::{math, Angle, GeometryError, Vector2};

/// A directed line segment: one obstacle edge or one sensor probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    start: Vector2,
    end: Vector2,
}

impl LineSegment {
    /// Creates a segment, rejecting non-finite endpoints.
    pub fn new(start: Vector2, end: Vector2) -> Result<Self, GeometryError> {
        Ok(Self {
            start: math::ensure_finite(start)?,
            end: math::ensure_finite(end)?,
        })
    }

    /// For endpoints known to be finite, e.g. validated polygon vertices or constant
    /// probe geometry. Non-finite endpoints are a logic error.
    pub fn from_finite(start: Vector2, end: Vector2) -> Self {
        debug_assert!(
            start.iter().chain(end.iter()).all(|c| c.is_finite()),
            "non-finite segment endpoint"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Vector2 {
        self.start
    }

    pub fn end(&self) -> Vector2 {
        self.end
    }

    /// `end - start`.
    pub fn direction(&self) -> Vector2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

/// Position and heading of the robot in arena coordinates.
///
/// The robot's local frame has +x pointing forward and +y to the robot's left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector2,
    pub heading: Angle,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vector2::zeros(), Angle::default())
    }
}

impl Pose {
    pub fn new(position: Vector2, heading: Angle) -> Self {
        Self { position, heading }
    }

    /// Fails with [`GeometryError::InvalidGeometry`] if any component is not finite.
    pub fn validate(&self) -> Result<(), GeometryError> {
        math::ensure_finite(self.position)?;
        if !self.heading.is_finite() {
            return Err(GeometryError::invalid("non-finite heading"));
        }
        Ok(())
    }

    /// Maps a point from the robot's local frame into arena coordinates.
    pub fn to_world(&self, local: &Vector2) -> Vector2 {
        self.position + self.heading.rotate_vector(local)
    }

    /// Maps a local-frame segment into arena coordinates.
    pub fn segment_to_world(&self, local: &LineSegment) -> Result<LineSegment, GeometryError> {
        self.validate()?;
        LineSegment::new(self.to_world(&local.start), self.to_world(&local.end))
    }
}
