#[allow(unused_imports)]
pub use itertools::Itertools;
#[allow(unused_imports)]
pub use num_traits;

#[allow(unused_imports)]
pub use anyhow::{anyhow, bail, Context, Result};
#[allow(unused_imports)]
pub use tracing::{debug, error, info, warn};

#[allow(unused_imports)]
pub use crate::{
    core::{
        config::*,
        error::GeomError,
        render::{
            BindingPoint, BindingPointRegistry, BufferId, ProgramId, ShaderBinder,
            TextureId, VertexBufferHandle, VertexBufferOwner,
        },
    },
    shape::{transform::Transform, Shape, ShapeKind},
    util::{
        assert::*,
        colour::Colour,
        coords::{Camera, NdCoords, PixelCoords, ScreenCoords, Viewport, WorldCoords},
        linalg,
        linalg::{Mat3x3, Vec2},
        range::Range,
    },
};
