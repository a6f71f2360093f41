use crate::core::prelude::*;

/// Per-shape rotation bookkeeping plus the GPU-side transform.
///
/// The angle pair records how the shape's vertices have been rotated on the CPU:
/// - `axis_angle`: cumulative clockwise rotation about the world origin (viewport centre),
/// - `local_angle`: cumulative clockwise rotation about the shape's own centre.
///
/// They are tracked independently even though both mutate the same vertices. Neither is ever
/// normalised; trigonometry takes care of wrap-around.
///
/// `translation`, `scale` and `rotation` are applied only by the shader, through the matrices
/// returned here. Collision math never looks at them.
///
/// # Examples
///
/// ```
/// use ggshape::shape::transform::Transform;
/// use ggshape::util::linalg::{Mat3x3, Vec2};
///
/// let mut transform = Transform::default();
/// transform.translation = Vec2 { x: 0.5, y: 0.0 };
/// let moved = transform.model_matrix() * Vec2 { x: 0.25, y: 0.25 };
/// assert_eq!(moved, Vec2 { x: 0.75, y: 0.25 });
/// assert!(transform.rotation_matrix().almost_eq(Mat3x3::one()));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    axis_angle: f64,
    local_angle: f64,
    pub translation: Vec2,
    pub scale: Vec2,
    /// Clockwise, radians, about the model origin.
    pub rotation: f32,
    pub obeys_camera: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            axis_angle: 0.0,
            local_angle: 0.0,
            translation: Vec2::zero(),
            scale: Vec2::one(),
            rotation: 0.0,
            obeys_camera: true,
        }
    }
}

impl Transform {
    pub fn axis_angle(&self) -> f64 {
        self.axis_angle
    }
    pub fn local_angle(&self) -> f64 {
        self.local_angle
    }

    pub(crate) fn add_axis_angle(&mut self, delta: f64) {
        self.axis_angle += delta;
    }
    pub(crate) fn add_local_angle(&mut self, delta: f64) {
        self.local_angle += delta;
    }
    pub(crate) fn overwrite_axis_angle(&mut self, angle: f64) {
        self.axis_angle = angle;
    }

    /// Translation after scale.
    pub fn model_matrix(&self) -> Mat3x3 {
        Mat3x3::translation_vec2(self.translation) * Mat3x3::scale(self.scale.x, self.scale.y)
    }

    pub fn rotation_matrix(&self) -> Mat3x3 {
        Mat3x3::rotation(-self.rotation)
    }

    /// `model * rotation`: what the shader applies before projection.
    pub fn matrix_no_projection(&self) -> Mat3x3 {
        self.model_matrix() * self.rotation_matrix()
    }

    /// Maps world positions, expressed with the same NDC mapping as screen positions, to NDC
    /// as seen through `camera`. Identity when the shape ignores the camera.
    pub fn projection_matrix(&self, viewport: Viewport, camera: Camera) -> Mat3x3 {
        if !self.obeys_camera {
            return Mat3x3::one();
        }
        let zoom = camera.zoom;
        Mat3x3 {
            xx: zoom,
            xw: zoom - 1.0 - zoom * viewport.pixel_dist_x_to_nd(camera.position.x),
            yy: zoom,
            yw: 1.0 - zoom + zoom * viewport.pixel_dist_y_to_nd(camera.position.y),
            ..Mat3x3::one()
        }
    }
}
