//! Narrow-phase collision tests.
//!
//! Polygon pairs use the separating axis theorem. Anything involving a polygon and a circle
//! or point rotates the polygon so that each outside edge in turn lies axis-aligned and
//! compares extents; the polygon's axis angle is restored before returning. Circles compare
//! centre distances in pixel space. Touching counts as colliding throughout.

use std::collections::BTreeSet;

use crate::{
    core::prelude::*,
    shape::rotation::{rotate_vertices_about_origin, AxisAngleGuard},
    warn_every_seconds,
};

impl Shape {
    /// Pixel-space angle of each outside edge `v[i] - v[i + 1]`, the last edge wrapping to
    /// the first vertex.
    pub fn outside_edge_angles(&self) -> Vec<f64> {
        let viewport = self.viewport;
        self.vertices
            .iter()
            .circular_tuple_windows()
            .map(|(a, b)| {
                let edge = a.to_pixel_offset(viewport) - b.to_pixel_offset(viewport);
                f64::from(edge.y).atan2(f64::from(edge.x))
            })
            .collect()
    }

    /// Normalised edge directions `v[i] - v[i - 1]` in NDC, the first wrapping to the last
    /// vertex. A zero-length edge yields a zero vector.
    pub fn outside_vectors(&self) -> Vec<Vec2> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let edge = self.vertices[i] - self.vertices[(i + n - 1) % n];
                if edge.len() < EPSILON {
                    warn_every_seconds!(
                        1,
                        "zero-length edge ending at vertex {i} of {:?}; its axis is degenerate",
                        self.kind
                    );
                }
                edge.normed()
            })
            .collect()
    }

    /// Whether this shape overlaps `other`.
    ///
    /// Takes both shapes mutably because polygon/circle tests rotate the polygon; its axis
    /// angle is back where it was when this returns.
    pub fn collides(&mut self, other: &mut Shape) -> Result<bool> {
        if self.viewport != other.viewport {
            bail!(GeomError::invalid_argument(format!(
                "shapes on different viewports: {:?} vs. {:?}",
                self.viewport, other.viewport
            )));
        }
        match (self.is_circle(), other.is_circle()) {
            (true, true) => circles_collide(self, other),
            (false, true) => polygon_collides_circle(self, other),
            (true, false) => polygon_collides_circle(other, self),
            (false, false) => polygons_collide(self, other),
        }
    }

    /// Whether `point` lies inside or on this shape.
    pub fn collides_point(&mut self, point: NdCoords) -> Result<bool> {
        if let Some((centre, radius)) = self.circle_parts() {
            return Ok(circle_contains(centre, radius, point, self.viewport));
        }
        polygon_contains(self, point)
    }

    fn circle_parts(&self) -> Option<(NdCoords, f32)> {
        match self.kind {
            ShapeKind::Circle { centre, radius, .. } => Some((centre, radius)),
            _ => None,
        }
    }

    fn require_vertices(&self, action: &str) -> Result<()> {
        if self.vertices.is_empty() {
            bail!(GeomError::illegal_state(format!(
                "cannot {action} {:?} without vertices",
                self.kind
            )));
        }
        Ok(())
    }
}

/// `angles[0]`, then the successive differences.
fn edge_deltas(angles: &[f64]) -> impl Iterator<Item = f64> + '_ {
    angles
        .first()
        .copied()
        .into_iter()
        .chain(angles.iter().tuple_windows().map(|(prev, next)| next - prev))
}

fn axis_extents(vertices: &[NdCoords]) -> Result<(Range, Range)> {
    let x = Range::of_values(vertices.iter().map(|v| v.x));
    let y = Range::of_values(vertices.iter().map(|v| v.y));
    x.zip(y)
        .ok_or_else(|| GeomError::illegal_state("extent of an empty vertex set").into())
}

fn polygons_collide(a: &Shape, b: &Shape) -> Result<bool> {
    a.require_vertices("collide")?;
    b.require_vertices("collide")?;
    let project = |shape: &Shape, axis: Vec2| {
        Range::of_projection(shape.exterior_vertices().iter().map(|v| v.as_vec2()), axis)
    };
    let axes: BTreeSet<Vec2> = a
        .outside_vectors()
        .into_iter()
        .chain(b.outside_vectors())
        .map(|v| v.orthog())
        .collect();
    for axis in axes {
        if let (Some(lhs), Some(rhs)) = (project(a, axis), project(b, axis)) {
            if !lhs.intersects(&rhs) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn polygon_collides_circle(polygon: &mut Shape, circle: &Shape) -> Result<bool> {
    let Some((centre, radius)) = circle.circle_parts() else {
        bail!(GeomError::illegal_state(format!(
            "expected a circle, got {:?}",
            circle.kind
        )));
    };
    polygon.require_vertices("collide")?;
    let viewport = polygon.viewport;
    let angles = polygon.outside_edge_angles();
    let mut polygon = AxisAngleGuard::new(polygon);
    for (&angle, delta) in angles.iter().zip(edge_deltas(&angles)) {
        let (x_range, y_range) = axis_extents(polygon.rotate_axis(delta)?)?;
        let mut rotated_centre = [centre];
        rotate_vertices_about_origin(&mut rotated_centre, angle, viewport);
        let [c] = rotated_centre;
        if !x_range.intersects(&Range::around(c.x, radius))
            || !y_range.intersects(&Range::around(c.y, radius))
        {
            return Ok(false);
        }
    }
    Ok(true)
}

fn polygon_contains(polygon: &mut Shape, point: NdCoords) -> Result<bool> {
    polygon.require_vertices("collide")?;
    let viewport = polygon.viewport;
    let angles = polygon.outside_edge_angles();
    let mut polygon = AxisAngleGuard::new(polygon);
    let mut point = [point];
    for delta in edge_deltas(&angles) {
        let (x_range, y_range) = axis_extents(polygon.rotate_axis(delta)?)?;
        rotate_vertices_about_origin(&mut point, delta, viewport);
        if !x_range.contains(point[0].x) || !y_range.contains(point[0].y) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn pixel_dist_squared(a: NdCoords, b: NdCoords, viewport: Viewport) -> f64 {
    let d = a.to_pixel(viewport) - b.to_pixel(viewport);
    let (dx, dy) = (f64::from(d.x), f64::from(d.y));
    dx * dx + dy * dy
}

fn circles_collide(a: &Shape, b: &Shape) -> Result<bool> {
    let (Some((a_centre, a_radius)), Some((b_centre, b_radius))) =
        (a.circle_parts(), b.circle_parts())
    else {
        bail!(GeomError::illegal_state(format!(
            "expected two circles, got {:?} and {:?}",
            a.kind, b.kind
        )));
    };
    let viewport = a.viewport;
    let reach = f64::from(viewport.nd_dist_x_to_pixel(a_radius))
        + f64::from(viewport.nd_dist_x_to_pixel(b_radius));
    Ok(pixel_dist_squared(a_centre, b_centre, viewport) <= reach * reach)
}

fn circle_contains(centre: NdCoords, radius: f32, point: NdCoords, viewport: Viewport) -> bool {
    let radius = f64::from(viewport.nd_dist_x_to_pixel(radius));
    pixel_dist_squared(centre, point, viewport) <= radius * radius
}
