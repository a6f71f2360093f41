//! Shapes: a closed set of variants over one shared, mutable vertex list.
//!
//! Vertices are stored in NDC and drawn as a triangle fan. Every mutation (rotation, shift)
//! recomputes them in place and pushes them to the attached vertex buffer, if any.

use std::f64::consts::TAU;

use crate::core::prelude::*;
use crate::util::{gg_float, gg_iter};

pub mod collision;
pub mod rotation;
pub mod transform;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// `centre` is tracked analytically and moved with the vertices. `radius` is an NDC
    /// x-distance.
    Circle {
        centre: NdCoords,
        radius: f32,
        sides: usize,
    },
    Rect,
    Triangle,
    Polygon,
}

impl ShapeKind {
    pub fn is_circle(&self) -> bool {
        matches!(self, ShapeKind::Circle { .. })
    }
}

/// A 2D shape owning its vertices, its angle bookkeeping and (optionally) a GPU vertex buffer.
///
/// Not `Clone`: each shape owns its vertex buffer slot.
///
/// ```
/// use ggshape::core::prelude::*;
///
/// let viewport = Viewport::new(800.0, 600.0);
/// let mut rect = Shape::rect(NdCoords::new(-0.5, 0.5), 1.0, 1.0, viewport)?;
/// assert!(rect.center().almost_eq(NdCoords::origin(), EPSILON));
/// rect.shift(0.25, 0.0)?;
/// assert!(rect.center().almost_eq(NdCoords::new(0.25, 0.0), EPSILON));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Shape {
    kind: ShapeKind,
    vertices: Vec<NdCoords>,
    transform: Transform,
    viewport: Viewport,
    vertex_buffer: Option<VertexBufferHandle>,
    tint: Colour,
}

impl Shape {
    fn new(kind: ShapeKind, vertices: Vec<NdCoords>, viewport: Viewport) -> Result<Self> {
        viewport.validate()?;
        if let Some(bad) = vertices
            .iter()
            .find(|v| !v.x.is_finite() || !v.y.is_finite())
        {
            bail!(GeomError::invalid_argument(format!(
                "non-finite vertex {bad} in {kind:?}"
            )));
        }
        Ok(Self {
            kind,
            vertices,
            transform: Transform::default(),
            viewport,
            vertex_buffer: None,
            tint: Colour::white(),
        })
    }

    /// A regular polygon approximating a circle with [`DEFAULT_CIRCLE_SIDES`] sides.
    pub fn circle(centre: NdCoords, radius: f32, viewport: Viewport) -> Result<Self> {
        Self::circle_with_sides(centre, radius, DEFAULT_CIRCLE_SIDES, viewport)
    }

    /// `radius` is an NDC x-distance; it converts to pixels along x and is used for both
    /// axes, so the circle stays round on non-square viewports. The first vertex is straight
    /// up from the centre, the rest follow clockwise.
    pub fn circle_with_sides(
        centre: NdCoords,
        radius: f32,
        sides: usize,
        viewport: Viewport,
    ) -> Result<Self> {
        if sides < 3 {
            bail!(GeomError::invalid_argument(format!(
                "a circle needs at least 3 sides, got {sides}"
            )));
        }
        if !(radius >= 0.0 && radius.is_finite()) {
            bail!(GeomError::invalid_argument(format!(
                "invalid circle radius: {radius}"
            )));
        }
        let centre_px = centre.to_pixel_offset(viewport);
        let radius_px = f64::from(viewport.nd_dist_x_to_pixel(radius));
        #[allow(clippy::cast_precision_loss)]
        let vertices = (0..sides)
            .map(|i| {
                let theta = TAU * i as f64 / sides as f64;
                let offset = Vec2 {
                    x: gg_float::to_f32(theta.sin() * radius_px),
                    y: gg_float::to_f32(theta.cos() * radius_px),
                };
                NdCoords::from_pixel_offset(centre_px + offset, viewport)
            })
            .collect_vec();
        Self::new(
            ShapeKind::Circle {
                centre,
                radius,
                sides,
            },
            vertices,
            viewport,
        )
    }

    /// Axis-aligned rectangle from its top-left corner; `width` and `height` are NDC
    /// distances. Vertices run top-left, top-right, bottom-right, bottom-left.
    pub fn rect(top_left: NdCoords, width: f32, height: f32, viewport: Viewport) -> Result<Self> {
        if !(width >= 0.0 && height >= 0.0) {
            bail!(GeomError::invalid_argument(format!(
                "rect extent must be non-negative: {width} x {height}"
            )));
        }
        let NdCoords { x, y } = top_left;
        Self::new(
            ShapeKind::Rect,
            vec![
                NdCoords::new(x, y),
                NdCoords::new(x + width, y),
                NdCoords::new(x + width, y - height),
                NdCoords::new(x, y - height),
            ],
            viewport,
        )
    }

    pub fn triangle(a: NdCoords, b: NdCoords, c: NdCoords, viewport: Viewport) -> Result<Self> {
        Self::new(ShapeKind::Triangle, vec![a, b, c], viewport)
    }

    /// Any vertex list, in fan order. An empty list is accepted here; operations that need
    /// vertices fail on it with `IllegalState`.
    pub fn polygon(vertices: Vec<NdCoords>, viewport: Viewport) -> Result<Self> {
        Self::new(ShapeKind::Polygon, vertices, viewport)
    }

    /// Attaches a vertex buffer and uploads the current vertices to it.
    pub fn with_vertex_buffer(mut self, buffer: VertexBufferHandle) -> Result<Self> {
        buffer.push(&self.vertices)?;
        self.vertex_buffer = Some(buffer);
        Ok(self)
    }

    #[must_use]
    pub fn with_tint(mut self, tint: Colour) -> Self {
        self.tint = tint;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
    pub fn is_circle(&self) -> bool {
        self.kind.is_circle()
    }
    /// NDC radius for circles.
    pub fn radius(&self) -> Option<f32> {
        match self.kind {
            ShapeKind::Circle { radius, .. } => Some(radius),
            _ => None,
        }
    }
    pub fn vertices(&self) -> &[NdCoords] {
        &self.vertices
    }
    /// The boundary in order, as used by collision. Fan order already walks the boundary.
    pub fn exterior_vertices(&self) -> &[NdCoords] {
        &self.vertices
    }
    /// Flat `[x0, y0, x1, y1, ..]`, the layout vertex buffers take.
    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| [v.x, v.y]).collect()
    }
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
    /// Only the GPU-side fields are public; the angle pair changes through rotation.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
    pub fn axis_angle(&self) -> f64 {
        self.transform.axis_angle()
    }
    pub fn local_angle(&self) -> f64 {
        self.transform.local_angle()
    }
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
    pub fn tint(&self) -> Colour {
        self.tint
    }
    pub fn vertex_buffer(&self) -> Option<&VertexBufferHandle> {
        self.vertex_buffer.as_ref()
    }

    /// The shape's centre:
    /// - circles: the analytic centre;
    /// - rects and triangles: the mean of the vertices;
    /// - polygons: the area centroid, or the vertex mean if the area vanishes.
    ///
    /// An empty polygon reports the origin.
    pub fn center(&self) -> NdCoords {
        match self.kind {
            ShapeKind::Circle { centre, .. } => centre,
            ShapeKind::Rect | ShapeKind::Triangle => self.vertex_mean(),
            ShapeKind::Polygon => self.area_centroid().unwrap_or_else(|| self.vertex_mean()),
        }
    }

    fn vertex_mean(&self) -> NdCoords {
        gg_iter::mean(self.vertices.iter().map(|v| v.as_vec2()))
            .map_or_else(NdCoords::origin, NdCoords::from)
    }

    fn area_centroid(&self) -> Option<NdCoords> {
        let (twice_area, x, y) = self
            .vertices
            .iter()
            .map(|v| v.as_vec2())
            .circular_tuple_windows()
            .map(|(u, v)| {
                let cross = u.cross(v);
                (cross, (u.x + v.x) * cross, (u.y + v.y) * cross)
            })
            .reduce(gg_iter::sum_tuple3)?;
        if twice_area.abs() < EPSILON * EPSILON {
            return None;
        }
        Some(NdCoords::new(x / (3.0 * twice_area), y / (3.0 * twice_area)))
    }

    /// Translates every vertex (and a circle's centre) by an NDC offset.
    pub fn shift(&mut self, dx: f32, dy: f32) -> Result<()> {
        let offset = Vec2 { x: dx, y: dy };
        for vertex in &mut self.vertices {
            *vertex = *vertex + offset;
        }
        if let ShapeKind::Circle { centre, .. } = &mut self.kind {
            *centre = *centre + offset;
        }
        self.push_vertices()
    }

    pub fn set_center(&mut self, center: NdCoords) -> Result<()> {
        let offset = center - self.center();
        self.shift(offset.x, offset.y)
    }

    pub(crate) fn push_vertices(&self) -> Result<()> {
        match &self.vertex_buffer {
            Some(buffer) => buffer.push(&self.vertices),
            None => Ok(()),
        }
    }

    /// The vertices with the GPU-side model and rotation matrices applied on the CPU.
    pub fn calculate_vertices_matrix(&self) -> Vec<NdCoords> {
        let matrix = self.transform.matrix_no_projection();
        self.vertices
            .iter()
            .map(|v| NdCoords::from(matrix * v.as_vec2()))
            .collect()
    }

    /// Draws with whatever program is bound, binding the default program first if none is.
    pub fn draw(&self, binder: &mut dyn ShaderBinder, camera: Camera) -> Result<()> {
        let program = match binder.bound_program() {
            Some(program) => program,
            None => binder.bind_default(),
        };
        binder.set_matrix_uniforms(
            program,
            &self.transform.projection_matrix(self.viewport, camera),
            &self.transform.model_matrix(),
            &self.transform.rotation_matrix(),
        )?;
        binder.set_colour_uniform(program, self.tint)?;
        binder.draw_buffer(
            self.vertex_buffer.as_ref().map(VertexBufferHandle::id),
            self.vertices.len(),
        )
    }

    /// Binds `program`, draws, and unbinds again even if drawing failed.
    pub fn draw_with(
        &self,
        binder: &mut dyn ShaderBinder,
        program: ProgramId,
        camera: Camera,
    ) -> Result<()> {
        binder.bind(program);
        let rv = self.draw(binder, camera);
        binder.unbind();
        rv
    }

    /// Binds `texture`, draws with the bound (or default) program, then unbinds both even if
    /// drawing failed.
    pub fn draw_with_texture(
        &self,
        binder: &mut dyn ShaderBinder,
        texture: TextureId,
        camera: Camera,
    ) -> Result<()> {
        binder.bind_texture(texture);
        let rv = self.draw(binder, camera);
        binder.unbind();
        binder.unbind_texture();
        rv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{recording_handle, BinderCall, RecordingBinder, RecordingVertexBuffer};

    fn square_viewport() -> Viewport {
        Viewport::new(2.0, 2.0)
    }

    #[test]
    fn rect_vertices_run_clockwise_from_top_left() {
        let rect = Shape::rect(NdCoords::new(-0.5, 0.5), 1.0, 0.5, Viewport::default()).unwrap();
        assert_eq!(
            rect.vertices(),
            &[
                NdCoords::new(-0.5, 0.5),
                NdCoords::new(0.5, 0.5),
                NdCoords::new(0.5, 0.0),
                NdCoords::new(-0.5, 0.0),
            ]
        );
        assert!(rect.center().almost_eq(NdCoords::new(0.0, 0.25), EPSILON));
        assert_eq!(rect.vertex_data(), vec![-0.5, 0.5, 0.5, 0.5, 0.5, 0.0, -0.5, 0.0]);
    }

    #[test]
    fn circle_vertices_lie_on_the_radius() {
        let viewport = Viewport::new(800.0, 600.0);
        let centre = NdCoords::new(0.25, -0.1);
        let circle = Shape::circle_with_sides(centre, 0.1, 12, viewport).unwrap();
        assert_eq!(circle.vertices().len(), 12);
        assert_eq!(circle.center(), centre);
        assert_eq!(circle.radius(), Some(0.1));
        let centre_px = centre.to_pixel_offset(viewport);
        let radius_px = viewport.nd_dist_x_to_pixel(0.1);
        for vertex in circle.vertices() {
            let dist = (vertex.to_pixel_offset(viewport) - centre_px).len();
            assert!((dist - radius_px).abs() < 1e-3, "{dist} vs. {radius_px}");
        }
        // First vertex straight up.
        let first = circle.vertices()[0].to_pixel_offset(viewport) - centre_px;
        assert!(first.almost_eq(Vec2 { x: 0.0, y: radius_px }));
    }

    #[test]
    fn polygon_centre_is_area_centroid() {
        // An L-shaped hexagon: the vertex mean and the centroid differ.
        let polygon = Shape::polygon(
            vec![
                NdCoords::new(0.0, 0.0),
                NdCoords::new(0.0, 0.4),
                NdCoords::new(0.2, 0.4),
                NdCoords::new(0.2, 0.2),
                NdCoords::new(0.4, 0.2),
                NdCoords::new(0.4, 0.0),
            ],
            square_viewport(),
        )
        .unwrap();
        assert!(polygon
            .center()
            .almost_eq(NdCoords::new(1.0 / 6.0, 1.0 / 6.0), EPSILON));
    }

    #[test]
    fn degenerate_polygon_centre_falls_back_to_mean() {
        let line = Shape::polygon(
            vec![
                NdCoords::new(0.0, 0.0),
                NdCoords::new(0.5, 0.0),
                NdCoords::new(1.0, 0.0),
            ],
            square_viewport(),
        )
        .unwrap();
        assert!(line.center().almost_eq(NdCoords::new(0.5, 0.0), EPSILON));
        let empty = Shape::polygon(Vec::new(), square_viewport()).unwrap();
        assert_eq!(empty.center(), NdCoords::origin());
    }

    #[test]
    fn shift_and_set_center_move_everything() {
        let mut circle = Shape::circle(NdCoords::origin(), 0.2, square_viewport()).unwrap();
        circle.shift(0.1, -0.1).unwrap();
        assert!(circle.center().almost_eq(NdCoords::new(0.1, -0.1), EPSILON));
        circle.set_center(NdCoords::new(-0.5, 0.5)).unwrap();
        assert!(circle.center().almost_eq(NdCoords::new(-0.5, 0.5), EPSILON));
        let mean = gg_iter::mean(circle.vertices().iter().map(|v| v.as_vec2())).unwrap();
        assert!(mean.almost_eq(Vec2 { x: -0.5, y: 0.5 }));

        let mut triangle = Shape::triangle(
            NdCoords::new(0.0, 0.3),
            NdCoords::new(0.3, -0.3),
            NdCoords::new(-0.3, -0.3),
            square_viewport(),
        )
        .unwrap();
        triangle.set_center(NdCoords::new(0.5, 0.5)).unwrap();
        assert!(triangle.center().almost_eq(NdCoords::new(0.5, 0.5), EPSILON));
        assert!(triangle.vertices()[0].almost_eq(NdCoords::new(0.5, 0.9), EPSILON));
    }

    #[test]
    fn invalid_construction_is_rejected() {
        let expect_invalid = |result: Result<Shape>| {
            let err = result.unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<GeomError>(),
                    Some(GeomError::InvalidArgument(_))
                ),
                "{err:?}"
            );
        };
        expect_invalid(Shape::circle_with_sides(
            NdCoords::origin(),
            0.1,
            2,
            square_viewport(),
        ));
        expect_invalid(Shape::circle(NdCoords::origin(), -0.1, square_viewport()));
        expect_invalid(Shape::rect(NdCoords::origin(), -1.0, 1.0, square_viewport()));
        expect_invalid(Shape::rect(NdCoords::origin(), 1.0, 1.0, Viewport::new(0.0, 1.0)));
        expect_invalid(Shape::polygon(
            vec![NdCoords::new(f32::NAN, 0.0)],
            square_viewport(),
        ));
    }

    #[test]
    fn mutations_are_pushed_to_the_vertex_buffer() {
        let owner = RecordingVertexBuffer::shared(MAX_VERTEX_BUFFER_FLOATS);
        let handle = recording_handle(&owner);
        let id = handle.id();
        let mut rect = Shape::rect(NdCoords::new(0.0, 0.0), 0.5, 0.5, square_viewport())
            .unwrap()
            .with_vertex_buffer(handle)
            .unwrap();
        assert_eq!(owner.borrow().contents(id), Some(&rect.vertex_data()[..]));
        rect.shift(0.25, 0.0).unwrap();
        assert_eq!(owner.borrow().contents(id), Some(&rect.vertex_data()[..]));
        assert_eq!(owner.borrow().upload_count(), 2);
    }

    #[test]
    fn oversized_shape_cannot_attach_buffer() {
        let owner = RecordingVertexBuffer::shared(16);
        let circle = Shape::circle_with_sides(NdCoords::origin(), 0.5, 9, square_viewport())
            .unwrap();
        let err = circle.with_vertex_buffer(recording_handle(&owner)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeomError>(),
            Some(GeomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn vertices_matrix_applies_gpu_transform() {
        let mut rect = Shape::rect(NdCoords::new(0.0, 0.5), 0.5, 0.5, square_viewport()).unwrap();
        assert_eq!(rect.calculate_vertices_matrix(), rect.vertices().to_vec());
        rect.transform_mut().translation = Vec2 { x: 0.1, y: 0.0 };
        rect.transform_mut().scale = Vec2::splat(2.0);
        let moved = rect.calculate_vertices_matrix();
        assert!(moved[1].almost_eq(NdCoords::new(1.1, 1.0), EPSILON));
    }

    #[test]
    fn draw_binds_default_program_when_unbound() {
        let owner = RecordingVertexBuffer::shared(MAX_VERTEX_BUFFER_FLOATS);
        let handle = recording_handle(&owner);
        let id = handle.id();
        let rect = Shape::rect(NdCoords::origin(), 0.5, 0.5, square_viewport())
            .unwrap()
            .with_vertex_buffer(handle)
            .unwrap()
            .with_tint(Colour::red());
        let mut binder = RecordingBinder::default();
        rect.draw(&mut binder, Camera::default()).unwrap();
        let calls = binder.take_calls();
        assert_eq!(calls[0], BinderCall::BindDefault);
        assert!(matches!(
            calls[1],
            BinderCall::MatrixUniforms { program, .. } if program == RecordingBinder::DEFAULT_PROGRAM
        ));
        assert_eq!(
            calls[2],
            BinderCall::ColourUniform {
                program: RecordingBinder::DEFAULT_PROGRAM,
                colour: Colour::red()
            }
        );
        assert_eq!(
            calls[3],
            BinderCall::Draw {
                buffer: Some(id),
                vertex_count: 4
            }
        );

        // Already bound: no rebinding.
        rect.draw(&mut binder, Camera::default()).unwrap();
        assert!(!binder.calls().contains(&BinderCall::BindDefault));
    }

    #[test]
    fn draw_with_binds_and_unbinds() {
        let rect = Shape::rect(NdCoords::origin(), 0.5, 0.5, square_viewport()).unwrap();
        let mut binder = RecordingBinder::default();
        rect.draw_with(&mut binder, ProgramId(7), Camera::default())
            .unwrap();
        let calls = binder.take_calls();
        assert_eq!(calls.first(), Some(&BinderCall::Bind(ProgramId(7))));
        assert_eq!(calls.last(), Some(&BinderCall::Unbind));
        assert_eq!(binder.bound_program(), None);
    }

    #[test]
    fn draw_with_texture_binds_and_unbinds() {
        let rect = Shape::rect(NdCoords::origin(), 0.5, 0.5, square_viewport()).unwrap();
        let mut binder = RecordingBinder::default();
        rect.draw_with_texture(&mut binder, TextureId(2), Camera::default())
            .unwrap();
        let calls = binder.take_calls();
        assert_eq!(calls[0], BinderCall::BindTexture(TextureId(2)));
        assert_eq!(calls[1], BinderCall::BindDefault);
        assert!(calls.contains(&BinderCall::Draw {
            buffer: None,
            vertex_count: 4
        }));
        assert_eq!(
            calls[calls.len() - 2..],
            [BinderCall::Unbind, BinderCall::UnbindTexture]
        );
        assert_eq!(binder.bound_program(), None);
        assert_eq!(binder.bound_texture(), None);
    }

    #[test]
    fn draw_with_texture_unbinds_on_failure() {
        struct FailingDraw(RecordingBinder);

        impl ShaderBinder for FailingDraw {
            fn bound_program(&self) -> Option<ProgramId> {
                self.0.bound_program()
            }
            fn bind_default(&mut self) -> ProgramId {
                self.0.bind_default()
            }
            fn bind(&mut self, program: ProgramId) {
                self.0.bind(program);
            }
            fn unbind(&mut self) {
                self.0.unbind();
            }
            fn bound_texture(&self) -> Option<TextureId> {
                self.0.bound_texture()
            }
            fn bind_texture(&mut self, texture: TextureId) {
                self.0.bind_texture(texture);
            }
            fn unbind_texture(&mut self) {
                self.0.unbind_texture();
            }
            fn set_matrix_uniforms(
                &mut self,
                program: ProgramId,
                projection: &Mat3x3,
                model: &Mat3x3,
                rotation: &Mat3x3,
            ) -> Result<()> {
                self.0
                    .set_matrix_uniforms(program, projection, model, rotation)
            }
            fn set_colour_uniform(&mut self, program: ProgramId, colour: Colour) -> Result<()> {
                self.0.set_colour_uniform(program, colour)
            }
            fn draw_buffer(&mut self, _buffer: Option<BufferId>, _vertex_count: usize) -> Result<()> {
                bail!("draw call rejected")
            }
        }

        let rect = Shape::rect(NdCoords::origin(), 0.5, 0.5, square_viewport()).unwrap();
        let mut binder = FailingDraw(RecordingBinder::default());
        assert!(rect
            .draw_with_texture(&mut binder, TextureId(2), Camera::default())
            .is_err());
        assert_eq!(binder.bound_program(), None);
        assert_eq!(binder.bound_texture(), None);
    }
}
