use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::coords::{Camera, Viewport};

pub const EPSILON: f32 = 1e-5;
/// Rotated pixel offsets are rounded to 7 decimal places.
pub const ROUNDING_SCALE: f64 = 10_000_000.0;
/// Capacity of the reference vertex buffer, in floats.
pub const MAX_VERTEX_BUFFER_FLOATS: usize = 4096;
/// Uniform-buffer binding points live in `[0, MAX_BINDING_POINT)`.
pub const MAX_BINDING_POINT: u32 = 84;
pub const VIEW_PROJECTION_BINDING: u32 = 83;
pub const DEFAULT_CIRCLE_SIDES: usize = 64;

/// Runtime configuration for a geometry context.
///
/// Everything here has a sensible default; a TOML document only needs to name the fields it
/// overrides:
///
/// ```
/// use ggshape::core::config::GeomConfig;
///
/// let config = GeomConfig::from_toml_str(r#"
///     [viewport]
///     width = 1600.0
///     height = 900.0
/// "#).unwrap();
/// assert_eq!(config.viewport.width, 1600.0);
/// assert_eq!(config.viewport.scale_factor, 1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomConfig {
    pub max_vertex_buffer_floats: usize,
    pub circle_sides: usize,
    pub viewport: Viewport,
    pub camera: Camera,
}

impl Default for GeomConfig {
    fn default() -> Self {
        Self {
            max_vertex_buffer_floats: MAX_VERTEX_BUFFER_FLOATS,
            circle_sides: DEFAULT_CIRCLE_SIDES,
            viewport: Viewport::default(),
            camera: Camera::default(),
        }
    }
}

impl GeomConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse geometry config")?;
        config.viewport.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialise geometry config")
    }
}
