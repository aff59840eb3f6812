//! The consolidated, program-wide reflection tables.

use std::collections::BTreeMap;

use crate::stage::StageFlags;
use crate::walk::{Variable, VariableMap};

/// Program-level classification of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Constant,
    UnorderedAccess,
}

impl BufferKind {
    fn index(self) -> usize {
        match self {
            BufferKind::Constant => 0,
            BufferKind::UnorderedAccess => 1,
        }
    }
}

/// The consolidated description of one buffer shared by a program's stages.
///
/// Built once while the program's stages are merged; immutable afterwards
/// (the stage mask is the only field that accumulates during construction).
#[derive(Debug, Clone)]
pub struct BufferReflection {
    name: String,
    bind_point: u32,
    kind: BufferKind,
    size_in_bytes: usize,
    variable_count: u32,
    variables: VariableMap,
    stage_mask: StageFlags,
}

impl BufferReflection {
    pub(crate) fn new(
        name: String,
        bind_point: u32,
        kind: BufferKind,
        size_in_bytes: usize,
        variable_count: u32,
        variables: VariableMap,
    ) -> Self {
        Self {
            name,
            bind_point,
            kind,
            size_in_bytes,
            variable_count,
            variables,
            stage_mask: StageFlags::empty(),
        }
    }

    pub(crate) fn add_stage(&mut self, flag: StageFlags) {
        self.stage_mask |= flag;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bind_point(&self) -> u32 {
        self.bind_point
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Total size in bytes as declared by the compiler.
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    /// Number of top-level variables as declared by the compiler. Nested
    /// aggregates expand further in [`variables`](Self::variables).
    pub fn variable_count(&self) -> u32 {
        self.variable_count
    }

    /// The flattened variable map, keyed by fully-qualified name.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Union of the stage bits of every stage that declares this buffer.
    pub fn stage_mask(&self) -> StageFlags {
        self.stage_mask
    }
}

/// Program-level classification of a bound resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Sampler,
    /// Error sentinel for binding kinds the engine does not model.
    Unknown,
}

/// Dimensionality of a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimensions {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture2DMS,
    Texture2DMSArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    TextureBuffer,
    Unknown,
}

/// Category of the values a texture read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// Float, including normalized (unorm/snorm) formats.
    Float,
    Int,
    Uint,
    Double,
    Unknown,
}

/// The consolidated description of one bound resource (texture or sampler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    /// Texture dimensionality; `Unknown` for samplers.
    pub dims: ResourceDimensions,
    /// Read return category; `Unknown` for samplers.
    pub return_type: ReturnType,
    pub bind_point: u32,
    pub register_space: u32,
    /// Array binding size; 0 for a single-instance binding.
    pub array_size: u32,
    /// Union of the stage bits of every stage that declares this resource.
    pub stage_mask: StageFlags,
}

#[derive(Debug, Default)]
pub(crate) struct BufferTable {
    pub(crate) by_bind_point: BTreeMap<u32, BufferReflection>,
    pub(crate) bind_points: BTreeMap<String, u32>,
}

impl BufferTable {
    pub(crate) fn insert(&mut self, buffer: BufferReflection) {
        self.bind_points
            .insert(buffer.name.clone(), buffer.bind_point);
        self.by_bind_point.insert(buffer.bind_point, buffer);
    }
}

/// The immutable, program-wide reflection result.
///
/// Created exactly once when a multi-stage program is finalized (see
/// [`ProgramReflection::reflect`]), then read-only for the rest of its
/// lifetime; it can be shared by reference across threads freely.
#[derive(Debug, Default)]
pub struct ProgramReflection {
    pub(crate) buffers: [BufferTable; 2],
    pub(crate) resources: BTreeMap<String, Resource>,
}

impl ProgramReflection {
    pub(crate) fn table(&self, kind: BufferKind) -> &BufferTable {
        &self.buffers[kind.index()]
    }

    pub(crate) fn table_mut(&mut self, kind: BufferKind) -> &mut BufferTable {
        &mut self.buffers[kind.index()]
    }

    pub fn buffer_by_bind_point(&self, kind: BufferKind, bind_point: u32) -> Option<&BufferReflection> {
        self.table(kind).by_bind_point.get(&bind_point)
    }

    pub fn buffer_by_name(&self, kind: BufferKind, name: &str) -> Option<&BufferReflection> {
        let bind_point = self.buffer_bind_point(kind, name)?;
        self.table(kind).by_bind_point.get(&bind_point)
    }

    /// Bind point for a named buffer, if the program declares it.
    pub fn buffer_bind_point(&self, kind: BufferKind, name: &str) -> Option<u32> {
        self.table(kind).bind_points.get(name).copied()
    }

    /// All buffers of `kind`, in bind-point order.
    pub fn buffers(&self, kind: BufferKind) -> impl Iterator<Item = &BufferReflection> {
        self.table(kind).by_bind_point.values()
    }

    pub fn buffer_count(&self, kind: BufferKind) -> usize {
        self.table(kind).by_bind_point.len()
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// All bound resources, in name order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}
