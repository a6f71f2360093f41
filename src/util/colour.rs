use crate::core::error::GeomError;
use anyhow::Result;

/// Normalised RGBA colour, as uploaded to the colour uniform of a shape's program.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    /// Reads an `[r, g, b, a]` slice. Anything but exactly four components is an
    /// [`InvalidArgument`](GeomError::InvalidArgument).
    pub fn from_rgba_slice(rgba: &[f32]) -> Result<Self> {
        match *rgba {
            [r, g, b, a] => Ok(Self { r, g, b, a }),
            _ => Err(GeomError::invalid_argument(format!(
                "RGBA colour needs 4 components, got {}",
                rgba.len()
            ))
            .into()),
        }
    }

    pub fn red() -> Self {
        Self {
            r: 1.0,
            ..Default::default()
        }
    }

    pub fn white() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
    }
}

impl From<Colour> for [f32; 4] {
    fn from(value: Colour) -> Self {
        [value.r, value.g, value.b, value.a]
    }
}
