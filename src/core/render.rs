//! The narrow seams between the geometry core and the rendering backend.
//!
//! The core never owns GPU resources. After every mutation a shape pushes its vertices through
//! a [`VertexBufferOwner`]; to draw, it asks a [`ShaderBinder`] for the currently bound program
//! and uploads its matrices there. [`RecordingVertexBuffer`] and [`RecordingBinder`] are
//! in-memory implementations for headless use and tests.

use crate::core::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BufferId(pub usize);

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ProgramId(pub usize);

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct TextureId(pub usize);

/// Owns the GPU-side vertex storage for shapes.
///
/// `vertices` is a flat `[x0, y0, x1, y1, ...]` array in normalised device coordinates.
/// Capacity limits are the owner's business; the core pushes whatever the shape holds.
pub trait VertexBufferOwner {
    fn update_vertices(&mut self, id: BufferId, vertices: &[f32], offset: usize) -> Result<()>;
}

/// A shape's link to its vertex buffer.
///
/// Shapes are single-threaded, so the owner is shared through `Rc<RefCell<..>>`; this also
/// keeps [`Shape`](crate::shape::Shape) `!Send`.
#[derive(Clone)]
pub struct VertexBufferHandle {
    owner: Rc<RefCell<dyn VertexBufferOwner>>,
    id: BufferId,
}

impl VertexBufferHandle {
    pub fn new(owner: Rc<RefCell<dyn VertexBufferOwner>>, id: BufferId) -> Self {
        Self { owner, id }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn push(&self, vertices: &[NdCoords]) -> Result<()> {
        let flat = vertices.iter().flat_map(|v| [v.x, v.y]).collect_vec();
        let mut owner = self.owner.try_borrow_mut().map_err(|_| {
            GeomError::illegal_state(format!(
                "vertex buffer owner for {:?} is already borrowed",
                self.id
            ))
        })?;
        owner.update_vertices(self.id, &flat, 0)
    }
}

impl Debug for VertexBufferHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "VertexBufferHandle[{:?}]", self.id)
    }
}

/// Reference [`VertexBufferOwner`]: keeps the latest contents of each buffer in memory and
/// rejects payloads beyond its capacity.
#[derive(Debug)]
pub struct RecordingVertexBuffer {
    max_floats: usize,
    buffers: BTreeMap<BufferId, Vec<f32>>,
    upload_count: usize,
    next_id: usize,
}

impl Default for RecordingVertexBuffer {
    fn default() -> Self {
        Self::with_capacity(MAX_VERTEX_BUFFER_FLOATS)
    }
}

impl RecordingVertexBuffer {
    pub fn with_capacity(max_floats: usize) -> Self {
        Self {
            max_floats,
            buffers: BTreeMap::new(),
            upload_count: 0,
            next_id: 0,
        }
    }

    /// A shared owner; see [`recording_handle`].
    pub fn shared(max_floats: usize) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::with_capacity(max_floats)))
    }

    pub fn allocate(&mut self) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(id, Vec::new());
        id
    }

    pub fn contents(&self, id: BufferId) -> Option<&[f32]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count
    }
}

impl VertexBufferOwner for RecordingVertexBuffer {
    fn update_vertices(&mut self, id: BufferId, vertices: &[f32], offset: usize) -> Result<()> {
        let end = offset + vertices.len();
        if end > self.max_floats {
            return Err(GeomError::invalid_argument(format!(
                "{} floats at offset {offset} exceed buffer capacity {}, which would overflow",
                vertices.len(),
                self.max_floats
            ))
            .into());
        }
        let buffer = self.buffers.entry(id).or_default();
        if buffer.len() < end {
            buffer.resize(end, 0.0);
        }
        buffer[offset..end].copy_from_slice(vertices);
        self.upload_count += 1;
        Ok(())
    }
}

/// Hands `VertexBufferHandle`s out of a shared [`RecordingVertexBuffer`].
pub fn recording_handle(owner: &Rc<RefCell<RecordingVertexBuffer>>) -> VertexBufferHandle {
    let id = owner.borrow_mut().allocate();
    VertexBufferHandle::new(owner.clone(), id)
}

/// The shader/texture side of drawing.
///
/// The core does not manage program or texture lifetime; it only asks which program is bound
/// and pushes uniforms to it.
pub trait ShaderBinder {
    fn bound_program(&self) -> Option<ProgramId>;
    /// Binds the built-in default program and returns it.
    fn bind_default(&mut self) -> ProgramId;
    fn bind(&mut self, program: ProgramId);
    fn unbind(&mut self);

    fn bound_texture(&self) -> Option<TextureId>;
    fn bind_texture(&mut self, texture: TextureId);
    fn unbind_texture(&mut self);

    fn set_matrix_uniforms(
        &mut self,
        program: ProgramId,
        projection: &Mat3x3,
        model: &Mat3x3,
        rotation: &Mat3x3,
    ) -> Result<()>;
    fn set_colour_uniform(&mut self, program: ProgramId, colour: Colour) -> Result<()>;
    fn draw_buffer(&mut self, buffer: Option<BufferId>, vertex_count: usize) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum BinderCall {
    Bind(ProgramId),
    BindDefault,
    Unbind,
    BindTexture(TextureId),
    UnbindTexture,
    MatrixUniforms {
        program: ProgramId,
        projection: Mat3x3,
        model: Mat3x3,
        rotation: Mat3x3,
    },
    ColourUniform {
        program: ProgramId,
        colour: Colour,
    },
    Draw {
        buffer: Option<BufferId>,
        vertex_count: usize,
    },
}

/// Reference [`ShaderBinder`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingBinder {
    bound: Option<ProgramId>,
    texture: Option<TextureId>,
    calls: Vec<BinderCall>,
}

impl RecordingBinder {
    pub const DEFAULT_PROGRAM: ProgramId = ProgramId(0);

    pub fn calls(&self) -> &[BinderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BinderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl ShaderBinder for RecordingBinder {
    fn bound_program(&self) -> Option<ProgramId> {
        self.bound
    }

    fn bind_default(&mut self) -> ProgramId {
        self.calls.push(BinderCall::BindDefault);
        self.bound = Some(Self::DEFAULT_PROGRAM);
        Self::DEFAULT_PROGRAM
    }

    fn bind(&mut self, program: ProgramId) {
        self.calls.push(BinderCall::Bind(program));
        self.bound = Some(program);
    }

    fn unbind(&mut self) {
        self.calls.push(BinderCall::Unbind);
        self.bound = None;
    }

    fn bound_texture(&self) -> Option<TextureId> {
        self.texture
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(BinderCall::BindTexture(texture));
        self.texture = Some(texture);
    }

    fn unbind_texture(&mut self) {
        self.calls.push(BinderCall::UnbindTexture);
        self.texture = None;
    }

    fn set_matrix_uniforms(
        &mut self,
        program: ProgramId,
        projection: &Mat3x3,
        model: &Mat3x3,
        rotation: &Mat3x3,
    ) -> Result<()> {
        if self.bound != Some(program) {
            bail!(GeomError::illegal_state(format!(
                "uniform upload to {program:?}, but {:?} is bound",
                self.bound
            )));
        }
        self.calls.push(BinderCall::MatrixUniforms {
            program,
            projection: *projection,
            model: *model,
            rotation: *rotation,
        });
        Ok(())
    }

    fn set_colour_uniform(&mut self, program: ProgramId, colour: Colour) -> Result<()> {
        self.calls.push(BinderCall::ColourUniform { program, colour });
        Ok(())
    }

    fn draw_buffer(&mut self, buffer: Option<BufferId>, vertex_count: usize) -> Result<()> {
        self.calls.push(BinderCall::Draw {
            buffer,
            vertex_count,
        });
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BindingPoint(u32);

impl BindingPoint {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Allocator for uniform-buffer binding points.
///
/// Passed explicitly to whatever creates uniform buffers; there is no process-wide registry.
/// Points live in `[0, MAX_BINDING_POINT)` and [`VIEW_PROJECTION_BINDING`] is reserved from
/// the start.
#[derive(Clone, Debug)]
pub struct BindingPointRegistry {
    taken: BTreeSet<u32>,
}

impl Default for BindingPointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingPointRegistry {
    pub fn new() -> Self {
        Self {
            taken: BTreeSet::from([VIEW_PROJECTION_BINDING]),
        }
    }

    pub fn allocate(&mut self, point: u32) -> Result<BindingPoint> {
        if point >= MAX_BINDING_POINT {
            bail!(GeomError::invalid_argument(format!(
                "binding point must be within [0, {MAX_BINDING_POINT}), got {point}"
            )));
        }
        if !self.taken.insert(point) {
            bail!(GeomError::invalid_argument(format!(
                "binding point {point} is already taken"
            )));
        }
        Ok(BindingPoint(point))
    }

    pub fn release(&mut self, point: BindingPoint) {
        self.taken.remove(&point.0);
    }

    pub fn is_taken(&self, point: u32) -> bool {
        self.taken.contains(&point)
    }
}
