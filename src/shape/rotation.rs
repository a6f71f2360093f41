//! Rotation in pixel space.
//!
//! NDC is not isotropic on a non-square viewport, so every rotation converts to pixel offsets
//! first, rotates there, rounds, and converts back. Positive angles rotate clockwise on screen.

use std::f64::consts::FRAC_PI_2;
use std::ops::{Deref, DerefMut};

use crate::core::prelude::*;
use crate::error_every_seconds;
use crate::util::gg_float;

/// Rotates each vertex clockwise by `angle` radians about the viewport centre, in place.
///
/// The rotated pixel offsets are rounded to seven decimal places before converting back,
/// which keeps rotate/unrotate round trips stable.
pub fn rotate_vertices_about_origin(vertices: &mut [NdCoords], angle: f64, viewport: Viewport) {
    let angle = -angle;
    for vertex in vertices.iter_mut() {
        let offset = vertex.to_pixel_offset(viewport);
        let (x, y) = (f64::from(offset.x), f64::from(offset.y));
        let theta = y.atan2(x);
        let hyp = (x * x + y * y).sqrt();
        let new_theta = FRAC_PI_2 - theta - angle;
        let rotated = Vec2 {
            x: gg_float::to_f32(gg_float::round_fixed(new_theta.sin() * hyp)),
            y: gg_float::to_f32(gg_float::round_fixed(new_theta.cos() * hyp)),
        };
        *vertex = NdCoords::from_pixel_offset(rotated, viewport);
    }
}

impl Shape {
    /// Rotates the whole shape clockwise about the world origin and returns the new vertices.
    ///
    /// The rotation is accumulated into the axis angle. Fails with `IllegalState` on a shape
    /// without vertices, or if the vertex buffer rejects the upload (the rotation itself has
    /// still happened in that case).
    pub fn rotate_axis(&mut self, angle: f64) -> Result<&[NdCoords]> {
        if self.vertices.is_empty() {
            bail!(GeomError::illegal_state(format!(
                "cannot rotate {:?} without vertices",
                self.kind
            )));
        }
        rotate_vertices_about_origin(&mut self.vertices, angle, self.viewport);
        if let ShapeKind::Circle { centre, .. } = &mut self.kind {
            let mut rotated = [*centre];
            rotate_vertices_about_origin(&mut rotated, angle, self.viewport);
            *centre = rotated[0];
        }
        self.transform.add_axis_angle(angle);
        self.push_vertices()?;
        Ok(&self.vertices)
    }

    /// Rotates clockwise about the shape's own centre. Only the local angle changes.
    ///
    /// The vertices are uploaded once, after they are back in place; if that upload fails the
    /// shape is still rotated about its centre.
    pub fn rotate_local(&mut self, angle: f64) -> Result<()> {
        if self.vertices.is_empty() {
            bail!(GeomError::illegal_state(format!(
                "cannot rotate {:?} without vertices",
                self.kind
            )));
        }
        let centre = self.center();
        let to_origin = NdCoords::origin() - centre;
        for vertex in &mut self.vertices {
            *vertex = *vertex + to_origin;
        }
        rotate_vertices_about_origin(&mut self.vertices, angle, self.viewport);
        let back = centre - NdCoords::origin();
        for vertex in &mut self.vertices {
            *vertex = *vertex + back;
        }
        self.transform.add_local_angle(angle);
        debug!(
            "rotate_local({angle:.4}): local angle now {:.4}",
            self.local_angle()
        );
        self.push_vertices()
    }

    pub fn set_axis_angle(&mut self, target: f64) -> Result<()> {
        let delta = target - self.axis_angle();
        self.rotate_axis(delta)?;
        Ok(())
    }

    pub fn set_local_angle(&mut self, target: f64) -> Result<()> {
        self.rotate_local(target - self.local_angle())
    }

    /// Turns the shape about its centre so that its `facing` direction points at `target`.
    ///
    /// `facing` is the clockwise angle from straight up at which the unrotated shape points;
    /// e.g. 0 for a triangle with its tip on top. A target on the centre leaves the shape as
    /// it is.
    pub fn point_to(&mut self, target: NdCoords, facing: f64) -> Result<()> {
        let delta =
            target.to_pixel_offset(self.viewport) - self.center().to_pixel_offset(self.viewport);
        if delta.len() < EPSILON {
            return Ok(());
        }
        let heading = f64::from(delta.x).atan2(f64::from(delta.y));
        self.set_local_angle(heading - facing)
    }
}

/// Scoped axis rotation: whatever axis rotation happens through the guard is undone when it
/// drops, and the axis angle is written back exactly.
///
/// ```
/// use ggshape::core::prelude::*;
/// use ggshape::shape::rotation::AxisAngleGuard;
///
/// let mut rect = Shape::rect(NdCoords::new(0.1, 0.5), 0.2, 0.2, Viewport::default())?;
/// {
///     let mut guard = AxisAngleGuard::new(&mut rect);
///     guard.rotate_axis(1.0)?;
///     assert_eq!(guard.axis_angle(), 1.0);
/// }
/// assert_eq!(rect.axis_angle(), 0.0);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct AxisAngleGuard<'a> {
    shape: &'a mut Shape,
    saved_angle: f64,
}

impl<'a> AxisAngleGuard<'a> {
    pub fn new(shape: &'a mut Shape) -> Self {
        let saved_angle = shape.axis_angle();
        Self { shape, saved_angle }
    }

    pub fn saved_angle(&self) -> f64 {
        self.saved_angle
    }
}

impl Deref for AxisAngleGuard<'_> {
    type Target = Shape;

    fn deref(&self) -> &Self::Target {
        self.shape
    }
}

impl DerefMut for AxisAngleGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.shape
    }
}

impl Drop for AxisAngleGuard<'_> {
    fn drop(&mut self) {
        #[allow(clippy::float_cmp)]
        if self.shape.axis_angle() != self.saved_angle {
            if let Err(e) = self.shape.set_axis_angle(self.saved_angle) {
                error_every_seconds!(
                    1,
                    "failed to restore axis angle {:.4} of {:?}: {e:?}",
                    self.saved_angle, self.shape.kind
                );
            }
            self.shape.transform.overwrite_axis_angle(self.saved_angle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{recording_handle, RecordingVertexBuffer};
    use std::f64::consts::{FRAC_PI_6, PI};

    const TOLERANCE: f32 = 1e-5;

    fn assert_vertices_close(lhs: &[NdCoords], rhs: &[NdCoords]) {
        assert_eq!(lhs.len(), rhs.len());
        for (a, b) in lhs.iter().zip(rhs) {
            assert!(a.almost_eq(*b, TOLERANCE), "{a} vs. {b}");
        }
    }

    fn sample_shapes(viewport: Viewport) -> Vec<Shape> {
        vec![
            Shape::rect(NdCoords::new(0.1, 0.6), 0.3, 0.2, viewport).unwrap(),
            Shape::triangle(
                NdCoords::new(-0.4, 0.1),
                NdCoords::new(-0.2, -0.3),
                NdCoords::new(-0.6, -0.3),
                viewport,
            )
            .unwrap(),
            Shape::circle_with_sides(NdCoords::new(0.3, -0.4), 0.1, 16, viewport).unwrap(),
            Shape::polygon(
                vec![
                    NdCoords::new(0.0, 0.0),
                    NdCoords::new(0.5, 0.2),
                    NdCoords::new(0.4, -0.5),
                    NdCoords::new(-0.1, -0.3),
                    NdCoords::new(-0.2, 0.1),
                ],
                viewport,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn rotation_round_trips() {
        for viewport in [Viewport::default(), Viewport::new(800.0, 600.0)] {
            for theta in [0.0, FRAC_PI_6, FRAC_PI_2, PI, 3.0 * PI] {
                for mut shape in sample_shapes(viewport) {
                    let before = shape.vertices().to_vec();
                    let centre = shape.center();
                    shape.rotate_axis(theta).unwrap();
                    shape.rotate_axis(-theta).unwrap();
                    assert_vertices_close(shape.vertices(), &before);
                    assert!(shape.center().almost_eq(centre, TOLERANCE));
                    assert_eq!(shape.axis_angle(), 0.0);
                }
            }
        }
    }

    #[test]
    fn positive_angle_is_clockwise() {
        let viewport = Viewport::new(800.0, 600.0);
        // Straight right, 100px from the centre.
        let mut vertices = [NdCoords::new(0.25, 0.0)];
        rotate_vertices_about_origin(&mut vertices, FRAC_PI_2, viewport);
        // Now straight down, still 100px away.
        assert!(vertices[0].almost_eq(NdCoords::new(0.0, -1.0 / 3.0), TOLERANCE));
    }

    #[test]
    fn rotated_offsets_are_rounded() {
        let viewport = Viewport::new(2.0, 2.0);
        let mut vertices = [NdCoords::new(1.0, 0.0)];
        rotate_vertices_about_origin(&mut vertices, PI, viewport);
        // cos(3pi/2) is not exactly zero in f64; rounding makes it so.
        assert_eq!(vertices[0], NdCoords::new(-1.0, 0.0));
        assert_eq!(vertices[0].y, 0.0);
    }

    #[test]
    fn axis_rotation_moves_circle_centre() {
        let viewport = Viewport::new(2.0, 2.0);
        let mut circle = Shape::circle(NdCoords::new(0.5, 0.0), 0.1, viewport).unwrap();
        circle.rotate_axis(FRAC_PI_2).unwrap();
        assert!(circle.center().almost_eq(NdCoords::new(0.0, -0.5), TOLERANCE));
        assert_eq!(circle.axis_angle(), FRAC_PI_2);
    }

    #[test]
    fn empty_shape_cannot_rotate() {
        let mut empty = Shape::polygon(Vec::new(), Viewport::default()).unwrap();
        for err in [
            empty.rotate_axis(1.0).map(|_| ()).unwrap_err(),
            empty.rotate_local(1.0).unwrap_err(),
        ] {
            assert!(
                matches!(
                    err.downcast_ref::<GeomError>(),
                    Some(GeomError::IllegalState(_))
                ),
                "{err:?}"
            );
        }
        assert_eq!(empty.axis_angle(), 0.0);
    }

    #[test]
    fn local_rotation_keeps_centre() {
        for viewport in [Viewport::default(), Viewport::new(800.0, 600.0)] {
            for mut shape in sample_shapes(viewport) {
                let centre = shape.center();
                for angle in [0.3, FRAC_PI_2, -2.0, 3.0 * PI] {
                    shape.rotate_local(angle).unwrap();
                    assert!(
                        shape.center().almost_eq(centre, TOLERANCE),
                        "{:?}: {} vs. {centre}",
                        shape.kind(),
                        shape.center()
                    );
                }
            }
        }
    }

    #[test]
    fn local_rotation_bookkeeping() {
        let mut shape = Shape::rect(NdCoords::new(0.2, 0.2), 0.2, 0.2, Viewport::default()).unwrap();
        shape.rotate_axis(0.5).unwrap();
        shape.rotate_local(0.25).unwrap();
        shape.rotate_local(0.5).unwrap();
        assert!((shape.axis_angle() - 0.5).abs() < 1e-12);
        assert!((shape.local_angle() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn set_angles_rotate_by_the_difference() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut shape = Shape::rect(NdCoords::new(0.2, 0.2), 0.2, 0.2, viewport).unwrap();
        let original = shape.vertices().to_vec();
        shape.set_axis_angle(1.0).unwrap();
        shape.set_axis_angle(0.25).unwrap();
        assert!((shape.axis_angle() - 0.25).abs() < 1e-12);

        let mut reference = Shape::rect(NdCoords::new(0.2, 0.2), 0.2, 0.2, viewport).unwrap();
        reference.rotate_axis(0.25).unwrap();
        assert_vertices_close(shape.vertices(), reference.vertices());

        shape.set_axis_angle(0.0).unwrap();
        shape.set_local_angle(PI).unwrap();
        shape.set_local_angle(0.0).unwrap();
        assert_vertices_close(shape.vertices(), &original);
    }

    #[test]
    fn point_to_turns_tip_towards_target() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut triangle = Shape::triangle(
            NdCoords::new(0.0, 0.2),
            NdCoords::new(0.05, 0.0),
            NdCoords::new(-0.05, 0.0),
            viewport,
        )
        .unwrap();
        let centre = triangle.center();
        triangle.point_to(NdCoords::new(0.9, centre.y), 0.0).unwrap();
        assert!((triangle.local_angle() - FRAC_PI_2).abs() < 1e-6);
        let tip = triangle.vertices()[0];
        assert!(tip.x > centre.x);
        assert!((tip.y - centre.y).abs() < TOLERANCE);

        // Target on the centre: no change.
        triangle.point_to(triangle.center(), 0.0).unwrap();
        assert!((triangle.local_angle() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn guard_restores_axis_angle_exactly() {
        let viewport = Viewport::default();
        let mut shape = Shape::rect(NdCoords::new(0.1, 0.1), 0.3, 0.3, viewport).unwrap();
        shape.rotate_axis(0.1).unwrap();
        let before = shape.vertices().to_vec();
        {
            let mut guard = AxisAngleGuard::new(&mut shape);
            assert_eq!(guard.saved_angle(), 0.1);
            for delta in [0.7, -0.2, 3.3, 0.123_456] {
                guard.rotate_axis(delta).unwrap();
            }
        }
        assert_eq!(shape.axis_angle(), 0.1);
        assert_vertices_close(shape.vertices(), &before);
    }

    #[test]
    fn rotations_are_pushed() {
        let owner = RecordingVertexBuffer::shared(MAX_VERTEX_BUFFER_FLOATS);
        let handle = recording_handle(&owner);
        let id = handle.id();
        let mut shape = Shape::rect(NdCoords::new(0.1, 0.1), 0.3, 0.3, Viewport::default())
            .unwrap()
            .with_vertex_buffer(handle)
            .unwrap();
        let vertices = shape.rotate_axis(0.4).unwrap().to_vec();
        let flat = vertices.iter().flat_map(|v| [v.x, v.y]).collect_vec();
        assert_eq!(owner.borrow().contents(id), Some(&flat[..]));

        // An owner that is busy elsewhere rejects the push.
        let busy = owner.borrow();
        let err = shape.rotate_axis(0.1).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeomError>(),
            Some(GeomError::IllegalState(_))
        ));
        drop(busy);
    }

    #[test]
    fn failed_local_push_keeps_shape_in_place() {
        let owner = RecordingVertexBuffer::shared(MAX_VERTEX_BUFFER_FLOATS);
        let viewport = Viewport::new(800.0, 600.0);
        let mut shape = Shape::rect(NdCoords::new(0.4, 0.6), 0.2, 0.2, viewport)
            .unwrap()
            .with_vertex_buffer(recording_handle(&owner))
            .unwrap();
        shape.rotate_axis(0.3).unwrap();
        let centre = shape.center();

        let busy = owner.borrow();
        let err = shape.rotate_local(0.5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeomError>(),
            Some(GeomError::IllegalState(_))
        ));
        drop(busy);

        assert!(
            shape.center().almost_eq(centre, TOLERANCE),
            "{} vs. {centre}",
            shape.center()
        );
        assert_eq!(shape.axis_angle(), 0.3);
        assert_eq!(shape.local_angle(), 0.5);

        // The next successful push catches the buffer up.
        shape.rotate_local(-0.5).unwrap();
        let id = shape.vertex_buffer().unwrap().id();
        assert_eq!(owner.borrow().contents(id), Some(&shape.vertex_data()[..]));
    }

    #[test]
    fn guard_restores_angle_when_push_fails() {
        let owner = RecordingVertexBuffer::shared(MAX_VERTEX_BUFFER_FLOATS);
        let mut shape = Shape::rect(NdCoords::new(0.1, 0.1), 0.3, 0.3, Viewport::default())
            .unwrap()
            .with_vertex_buffer(recording_handle(&owner))
            .unwrap();
        let before = shape.vertices().to_vec();
        {
            let mut guard = AxisAngleGuard::new(&mut shape);
            guard.rotate_axis(0.8).unwrap();
            let busy = owner.borrow();
            drop(guard);
            drop(busy);
        }
        assert_eq!(shape.axis_angle(), 0.0);
        assert_vertices_close(shape.vertices(), &before);
    }
}
