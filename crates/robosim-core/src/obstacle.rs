use serde::{Deserialize, Serialize};

use crate::{
    math::{self, cross, distance},
    GeometryError, LineSegment, Vector2, DEFAULT_EPSILON,
};

/// An obstacle in the arena.
///
/// All shapes answer the same three questions: where is the nearest boundary point,
/// does a point lie inside, and where does a set of segments cross the boundary.
/// Sensors and the motion code only ever talk to this type, never to the shapes.
///
/// Obstacles are immutable once constructed. Construction validates the geometry, so
/// an `Obstacle` value is always well-formed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "ObstacleDesc")]
pub enum Obstacle {
    Polygon(Polygon),
    Circle(Circle),
    Compound(Compound),
}

/// A closed polygon. The last vertex connects back to the first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Vector2>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Circle {
    center: Vector2,
    radius: f64,
}

/// A union of obstacles, e.g. an L-shaped wall made of two boxes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Compound {
    members: Vec<Obstacle>,
}

impl Obstacle {
    /// Creates a polygon from its vertices in boundary order.
    ///
    /// Fails if there are fewer than 3 vertices, any coordinate is non-finite, the
    /// vertices are collinear, or the boundary crosses itself.
    pub fn polygon(vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        Polygon::new(vertices).map(Obstacle::Polygon)
    }

    /// Creates a circle. The radius must be finite and positive.
    pub fn circle(center: Vector2, radius: f64) -> Result<Self, GeometryError> {
        Circle::new(center, radius).map(Obstacle::Circle)
    }

    /// Creates an axis-aligned box spanning the two corners.
    pub fn rectangle(min: Vector2, max: Vector2) -> Result<Self, GeometryError> {
        let (lo, hi) = (min.inf(&max), min.sup(&max));
        Self::polygon(vec![
            lo,
            Vector2::new(hi.x, lo.y),
            hi,
            Vector2::new(lo.x, hi.y),
        ])
    }

    /// Groups already-validated obstacles into one. At least one member is required.
    pub fn compound(members: Vec<Obstacle>) -> Result<Self, GeometryError> {
        if members.is_empty() {
            return Err(GeometryError::invalid("compound obstacle has no members"));
        }
        Ok(Obstacle::Compound(Compound { members }))
    }

    /// Nearest boundary point to `p`.
    ///
    /// For polygons, ties between edges go to the first edge in vertex order. For a
    /// circle queried at its exact center, the boundary point at angle 0 is returned.
    pub fn closest_point_to(&self, p: &Vector2) -> Vector2 {
        match self {
            Obstacle::Polygon(polygon) => polygon.closest_point_to(p),
            Obstacle::Circle(circle) => circle.closest_point_to(p),
            Obstacle::Compound(compound) => compound.closest_point_to(p),
        }
    }

    /// Distance from `p` to the nearest boundary point.
    pub fn distance_to(&self, p: &Vector2) -> f64 {
        distance(p, &self.closest_point_to(p))
    }

    /// True if `p` is inside the obstacle or within [`DEFAULT_EPSILON`] of its boundary.
    pub fn lies_inside(&self, p: &Vector2) -> bool {
        self.lies_inside_with_tolerance(p, DEFAULT_EPSILON)
    }

    /// True if `p` is inside the obstacle or within `epsilon` of its boundary.
    pub fn lies_inside_with_tolerance(&self, p: &Vector2, epsilon: f64) -> bool {
        match self {
            Obstacle::Polygon(polygon) => polygon.contains(p, epsilon),
            Obstacle::Circle(circle) => distance(p, &circle.center) <= circle.radius + epsilon,
            Obstacle::Compound(compound) => compound
                .members
                .iter()
                .any(|m| m.lies_inside_with_tolerance(p, epsilon)),
        }
    }

    /// All points where `segments` cross the boundary.
    ///
    /// Points are grouped by input segment in the order given, then by boundary edge
    /// order (or member order for compounds). A segment passing exactly through a
    /// polygon vertex reports that vertex once for each of the two edges.
    pub fn intersection_points_with(&self, segments: &[LineSegment]) -> Vec<Vector2> {
        let mut points = Vec::new();
        for segment in segments {
            self.collect_intersections(segment, &mut points);
        }
        points
    }

    /// True if the segment touches the obstacle: either endpoint lies inside, or the
    /// segment crosses the boundary.
    pub fn overlaps_segment(&self, segment: &LineSegment, epsilon: f64) -> bool {
        self.lies_inside_with_tolerance(&segment.start(), epsilon)
            || self.lies_inside_with_tolerance(&segment.end(), epsilon)
            || self.crosses(segment)
    }

    fn collect_intersections(&self, segment: &LineSegment, out: &mut Vec<Vector2>) {
        match self {
            Obstacle::Polygon(polygon) => out.extend(
                polygon
                    .edges()
                    .filter_map(|edge| math::segment_intersection(segment, &edge)),
            ),
            Obstacle::Circle(circle) => out.extend(math::line_circle_intersections(
                segment,
                &circle.center,
                circle.radius,
            )),
            Obstacle::Compound(compound) => {
                for member in &compound.members {
                    member.collect_intersections(segment, out);
                }
            }
        }
    }

    // Short-circuiting variant of `collect_intersections`, used on every tick.
    fn crosses(&self, segment: &LineSegment) -> bool {
        match self {
            Obstacle::Polygon(polygon) => polygon
                .edges()
                .any(|edge| math::segment_intersection(segment, &edge).is_some()),
            Obstacle::Circle(circle) => {
                !math::line_circle_intersections(segment, &circle.center, circle.radius)
                    .is_empty()
            }
            Obstacle::Compound(compound) => compound.members.iter().any(|m| m.crosses(segment)),
        }
    }
}

impl Polygon {
    fn new(vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::invalid(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        for v in &vertices {
            math::ensure_finite(*v)?;
        }

        let polygon = Polygon { vertices };
        let scale = polygon
            .vertices
            .iter()
            .map(|v| v.amax())
            .fold(1.0_f64, f64::max);
        if polygon.signed_area().abs() <= f64::EPSILON * scale * scale {
            return Err(GeometryError::invalid("polygon has zero area"));
        }
        if polygon.self_intersects() {
            return Err(GeometryError::invalid("polygon boundary crosses itself"));
        }
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    /// Boundary edges in vertex order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = LineSegment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            LineSegment::from_finite(self.vertices[i], self.vertices[(i + 1) % n])
        })
    }

    /// Shoelace area; positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| cross(&self.vertices[i], &self.vertices[(i + 1) % n]))
            .sum::<f64>()
            / 2.0
    }

    fn self_intersects(&self) -> bool {
        let edges: Vec<_> = self.edges().collect();
        let n = edges.len();
        for i in 0..n {
            // Skip the neighbours, which share a vertex with edge i.
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if math::segment_intersection(&edges[i], &edges[j]).is_some() {
                    return true;
                }
            }
        }
        false
    }

    fn closest_point_to(&self, p: &Vector2) -> Vector2 {
        let mut best = self.vertices[0];
        let mut best_dist = f64::INFINITY;
        for edge in self.edges() {
            let candidate = math::project_onto_segment(p, &edge);
            let d = (candidate - p).norm_squared();
            if d < best_dist {
                best = candidate;
                best_dist = d;
            }
        }
        best
    }

    fn contains(&self, p: &Vector2, epsilon: f64) -> bool {
        // Points on (or within epsilon of) the boundary are inside. This keeps a probe
        // resting exactly on an edge from flickering between pressed and released.
        if self
            .edges()
            .any(|edge| distance(p, &math::project_onto_segment(p, &edge)) <= epsilon)
        {
            return true;
        }

        let v = &self.vertices;
        let mut inside = false;
        let mut j = v.len() - 1;
        for i in 0..v.len() {
            let (a, b) = (v[i], v[j]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl Circle {
    fn new(center: Vector2, radius: f64) -> Result<Self, GeometryError> {
        math::ensure_finite(center)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::invalid(format!(
                "circle radius must be positive, got {}",
                radius
            )));
        }
        Ok(Circle { center, radius })
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn closest_point_to(&self, p: &Vector2) -> Vector2 {
        let offset = p - self.center;
        let norm = offset.norm();
        if norm == 0.0 {
            return self.center + Vector2::new(self.radius, 0.0);
        }
        self.center + offset * (self.radius / norm)
    }
}

impl Compound {
    pub fn members(&self) -> &[Obstacle] {
        &self.members
    }

    fn closest_point_to(&self, p: &Vector2) -> Vector2 {
        let mut best = None;
        let mut best_dist = f64::INFINITY;
        for member in &self.members {
            let candidate = member.closest_point_to(p);
            let d = (candidate - p).norm_squared();
            if d < best_dist {
                best = Some(candidate);
                best_dist = d;
            }
        }
        // Compounds are never empty, the fallback only guards NaN distances.
        best.unwrap_or_else(|| self.members[0].closest_point_to(p))
    }
}

/// Unvalidated obstacle description, as found in arena files.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ObstacleDesc {
    Polygon { vertices: Vec<Vector2> },
    Rectangle { min: Vector2, max: Vector2 },
    Circle { center: Vector2, radius: f64 },
    Compound { members: Vec<Obstacle> },
}

impl TryFrom<ObstacleDesc> for Obstacle {
    type Error = GeometryError;

    fn try_from(desc: ObstacleDesc) -> Result<Self, Self::Error> {
        match desc {
            ObstacleDesc::Polygon { vertices } => Obstacle::polygon(vertices),
            ObstacleDesc::Rectangle { min, max } => Obstacle::rectangle(min, max),
            ObstacleDesc::Circle { center, radius } => Obstacle::circle(center, radius),
            ObstacleDesc::Compound { members } => Obstacle::compound(members),
        }
    }
}
