//! Coordinate spaces and the conversions between them.
//!
//! Every position carries its space in its type:
//! - [`NdCoords`]: normalised device coordinates. Origin at the viewport centre, both axes in
//!   `[-1, 1]`, +y up.
//! - [`PixelCoords`]: logical pixels. Origin top-left, +y down.
//! - [`ScreenCoords`]: device-native physical pixels, i.e. logical pixels multiplied by
//!   [`Viewport::scale_factor`]. Origin top-left, +y down.
//! - [`WorldCoords`]: camera-relative logical pixels, `world = pixel / zoom + camera.position`.
//!
//! Angle and distance math happens on *pixel offsets*: an NDC vector scaled by half the
//! viewport size, origin at the viewport centre, +y up. These are plain [`Vec2`] values
//! produced by [`NdCoords::to_pixel_offset`]; a distance converts independently of any
//! position via the `*_dist_*` methods on [`Viewport`].

use crate::core::error::GeomError;
use crate::util::linalg::Vec2;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Viewport size in logical pixels, plus the device scale factor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1600.0, 900.0)
    }
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.scale_factor > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.scale_factor.is_finite()
    }

    pub fn validate(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GeomError::invalid_argument(format!("degenerate viewport: {self:?}")).into())
        }
    }

    #[inline]
    pub fn nd_dist_x_to_pixel(self, dist: f32) -> f32 {
        dist * self.width / 2.0
    }
    #[inline]
    pub fn nd_dist_y_to_pixel(self, dist: f32) -> f32 {
        dist * self.height / 2.0
    }
    #[inline]
    pub fn pixel_dist_x_to_nd(self, dist: f32) -> f32 {
        dist * 2.0 / self.width
    }
    #[inline]
    pub fn pixel_dist_y_to_nd(self, dist: f32) -> f32 {
        dist * 2.0 / self.height
    }
    #[inline]
    pub fn pixel_dist_to_screen(self, dist: f32) -> f32 {
        dist * self.scale_factor
    }
    #[inline]
    pub fn screen_dist_to_pixel(self, dist: f32) -> f32 {
        dist / self.scale_factor
    }
}

/// Where the viewport's top-left corner sits in world space, and how far it is zoomed in.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            zoom: 1.0,
        }
    }
}

macro_rules! coord_space {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub x: f32,
            pub y: f32,
        }

        impl $name {
            #[inline]
            pub const fn new(x: f32, y: f32) -> Self {
                Self { x, y }
            }

            /// Drops the space tag.
            #[inline]
            pub fn as_vec2(self) -> Vec2 {
                Vec2 {
                    x: self.x,
                    y: self.y,
                }
            }

            #[inline]
            pub fn almost_eq(self, other: Self, tolerance: f32) -> bool {
                (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
            }
        }

        impl From<Vec2> for $name {
            fn from(value: Vec2) -> Self {
                Self::new(value.x, value.y)
            }
        }

        /// Offsets a position by an untagged vector in the same units.
        impl Add<Vec2> for $name {
            type Output = $name;

            fn add(self, rhs: Vec2) -> Self::Output {
                Self::new(self.x + rhs.x, self.y + rhs.y)
            }
        }

        /// The difference of two positions in one space is an untagged vector.
        impl Sub<$name> for $name {
            type Output = Vec2;

            fn sub(self, rhs: $name) -> Self::Output {
                Vec2 {
                    x: self.x - rhs.x,
                    y: self.y - rhs.y,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({}, {})"), self.x, self.y)
            }
        }
    };
}

coord_space!(
    /// A position in normalised device coordinates.
    NdCoords,
    "nd"
);
coord_space!(
    /// A position in logical pixels, origin top-left.
    PixelCoords,
    "px"
);
coord_space!(
    /// A position in device-native physical pixels, origin top-left.
    ScreenCoords,
    "screen"
);
coord_space!(
    /// A camera-relative position.
    WorldCoords,
    "world"
);

impl NdCoords {
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn to_pixel(self, viewport: Viewport) -> PixelCoords {
        PixelCoords::new(
            viewport.width * (self.x + 1.0) / 2.0,
            viewport.height * (1.0 - self.y) / 2.0,
        )
    }

    pub fn to_screen(self, viewport: Viewport) -> ScreenCoords {
        self.to_pixel(viewport).to_screen(viewport)
    }

    pub fn to_world(self, viewport: Viewport, camera: Camera) -> WorldCoords {
        self.to_pixel(viewport).to_world(camera)
    }

    /// The vector from the viewport centre to this point, in pixel units, +y up.
    pub fn to_pixel_offset(self, viewport: Viewport) -> Vec2 {
        Vec2 {
            x: viewport.nd_dist_x_to_pixel(self.x),
            y: viewport.nd_dist_y_to_pixel(self.y),
        }
    }

    /// Inverse of [`to_pixel_offset`](NdCoords::to_pixel_offset).
    pub fn from_pixel_offset(offset: Vec2, viewport: Viewport) -> Self {
        Self::new(
            viewport.pixel_dist_x_to_nd(offset.x),
            viewport.pixel_dist_y_to_nd(offset.y),
        )
    }
}

impl PixelCoords {
    pub fn to_nd(self, viewport: Viewport) -> NdCoords {
        NdCoords::new(
            2.0 * self.x / viewport.width - 1.0,
            1.0 - 2.0 * self.y / viewport.height,
        )
    }

    pub fn to_screen(self, viewport: Viewport) -> ScreenCoords {
        ScreenCoords::new(
            viewport.pixel_dist_to_screen(self.x),
            viewport.pixel_dist_to_screen(self.y),
        )
    }

    pub fn to_world(self, camera: Camera) -> WorldCoords {
        WorldCoords::from(self.as_vec2() / camera.zoom + camera.position)
    }
}

impl ScreenCoords {
    pub fn to_pixel(self, viewport: Viewport) -> PixelCoords {
        PixelCoords::new(
            viewport.screen_dist_to_pixel(self.x),
            viewport.screen_dist_to_pixel(self.y),
        )
    }

    pub fn to_nd(self, viewport: Viewport) -> NdCoords {
        self.to_pixel(viewport).to_nd(viewport)
    }
}

impl WorldCoords {
    pub fn to_pixel(self, camera: Camera) -> PixelCoords {
        PixelCoords::from((self.as_vec2() - camera.position) * camera.zoom)
    }

    pub fn to_nd(self, viewport: Viewport, camera: Camera) -> NdCoords {
        self.to_pixel(camera).to_nd(viewport)
    }
}
