//! Geometry kernel: distances, projections and intersections.
//!
//! All functions here are pure. Inputs are assumed finite; values enter the
//! kernel through [`ensure_finite`], [`LineSegment::new`] or the obstacle
//! constructors, which reject NaN and infinities.

use crate::{GeometryError, LineSegment, Vector2};

/// Slack on the segment parameter so that crossings exactly at an endpoint count.
const PARAM_SLACK: f64 = 1e-12;

/// Returns `p` unchanged if both coordinates are finite.
pub fn ensure_finite(p: Vector2) -> Result<Vector2, GeometryError> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(GeometryError::invalid(format!(
            "non-finite point ({}, {})",
            p.x, p.y
        )))
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &Vector2, b: &Vector2) -> f64 {
    (a - b).norm()
}

/// 2-D cross product (z component of the 3-D cross product).
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Projects `p` onto `segment`, clamped to the segment's span.
///
/// A zero-length segment projects everything onto its start point.
pub fn project_onto_segment(p: &Vector2, segment: &LineSegment) -> Vector2 {
    let d = segment.direction();
    let len2 = d.norm_squared();
    if len2 == 0.0 {
        return segment.start();
    }
    let t = ((p - segment.start()).dot(&d) / len2).clamp(0.0, 1.0);
    segment.start() + d * t
}

/// Intersection point of two segments, if they cross or touch at a single point.
///
/// Parallel and collinear segments yield `None`, even when they overlap: an
/// overlap has no distinct intersection point.
pub fn segment_intersection(a: &LineSegment, b: &LineSegment) -> Option<Vector2> {
    let r = a.direction();
    let s = b.direction();
    let denom = cross(&r, &s);
    if denom.abs() <= 1e-12 * r.norm() * s.norm() {
        return None;
    }

    let qp = b.start() - a.start();
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;
    let in_span = |x: f64| (-PARAM_SLACK..=1.0 + PARAM_SLACK).contains(&x);
    if in_span(t) && in_span(u) {
        Some(a.start() + r * t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Points where `segment` crosses the circle, ordered from the segment's start.
///
/// Returns zero, one (tangent, or only one crossing within the span) or two points.
pub fn line_circle_intersections(
    segment: &LineSegment,
    center: &Vector2,
    radius: f64,
) -> Vec<Vector2> {
    let d = segment.direction();
    let f = segment.start() - center;
    let a = d.dot(&d);
    if a == 0.0 {
        return Vec::new();
    }
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }

    let in_span = |t: f64| (-PARAM_SLACK..=1.0 + PARAM_SLACK).contains(&t);
    let at = |t: f64| segment.start() + d * t.clamp(0.0, 1.0);

    if disc <= 1e-12 * b * b {
        let t = -b / (2.0 * a);
        return if in_span(t) { vec![at(t)] } else { Vec::new() };
    }

    let sq = disc.sqrt();
    [(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)]
        .into_iter()
        .filter(|t| in_span(*t))
        .map(at)
        .collect()
}
