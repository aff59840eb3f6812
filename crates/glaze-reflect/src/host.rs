//! In-memory backend adapter.
//!
//! `HostStage` implements the backend traits over plain owned data. Embedders
//! use it to feed pre-recorded reflection metadata through the engine, and the
//! engine's own tests use it as the reference backend.

use crate::backend::{
    BoundResourceDesc, BufferDecl, BufferDeclKind, InputElementDesc, ResourceBindingKind,
    ResourceComponentType, StageReflection, TypeNode, VariableDecl,
};
use crate::program::ResourceDimensions;
use crate::types::ScalarKind;

/// An owned type tree.
#[derive(Debug, Clone)]
pub enum HostType {
    /// A scalar/vector/matrix leaf.
    Leaf {
        kind: ScalarKind,
        rows: u32,
        columns: u32,
        elements: u32,
        row_major: bool,
        offset: usize,
    },
    /// A struct with named members.
    Struct {
        members: Vec<(String, HostType)>,
        elements: u32,
        offset: usize,
    },
}

impl HostType {
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::vector(kind, 1)
    }

    pub fn vector(kind: ScalarKind, columns: u32) -> Self {
        HostType::Leaf {
            kind,
            rows: 1,
            columns,
            elements: 0,
            row_major: false,
            offset: 0,
        }
    }

    /// A float matrix leaf.
    pub fn matrix(rows: u32, columns: u32, row_major: bool) -> Self {
        HostType::Leaf {
            kind: ScalarKind::Float,
            rows,
            columns,
            elements: 0,
            row_major,
            offset: 0,
        }
    }

    /// A leaf with an arbitrary `(kind, rows, columns)` triple, including ones
    /// the engine rejects.
    pub fn raw_leaf(kind: ScalarKind, rows: u32, columns: u32) -> Self {
        HostType::Leaf {
            kind,
            rows,
            columns,
            elements: 0,
            row_major: false,
            offset: 0,
        }
    }

    pub fn structure(members: Vec<(&str, HostType)>) -> Self {
        HostType::Struct {
            members: members
                .into_iter()
                .map(|(name, ty)| (name.to_owned(), ty))
                .collect(),
            elements: 0,
            offset: 0,
        }
    }

    /// Turns the type into an array of `elements` elements.
    pub fn array(mut self, count: u32) -> Self {
        match &mut self {
            HostType::Leaf { elements, .. } | HostType::Struct { elements, .. } => {
                *elements = count
            }
        }
        self
    }

    /// Sets the node's offset relative to its parent aggregate.
    pub fn at_offset(mut self, at: usize) -> Self {
        match &mut self {
            HostType::Leaf { offset, .. } | HostType::Struct { offset, .. } => *offset = at,
        }
        self
    }
}

impl TypeNode for HostType {
    fn is_struct(&self) -> bool {
        matches!(self, HostType::Struct { .. })
    }

    fn member_count(&self) -> u32 {
        match self {
            HostType::Struct { members, .. } => members.len() as u32,
            HostType::Leaf { .. } => 0,
        }
    }

    fn member_name(&self, index: u32) -> Option<&str> {
        match self {
            HostType::Struct { members, .. } => {
                members.get(index as usize).map(|(name, _)| name.as_str())
            }
            HostType::Leaf { .. } => None,
        }
    }

    fn member_at(&self, index: u32) -> Option<Box<dyn TypeNode + '_>> {
        match self {
            HostType::Struct { members, .. } => {
                let (_, ty) = members.get(index as usize)?;
                Some(Box::new(ty))
            }
            HostType::Leaf { .. } => None,
        }
    }

    fn element_count(&self) -> u32 {
        match self {
            HostType::Leaf { elements, .. } | HostType::Struct { elements, .. } => *elements,
        }
    }

    fn scalar_kind(&self) -> ScalarKind {
        match self {
            HostType::Leaf { kind, .. } => *kind,
            HostType::Struct { .. } => ScalarKind::Unknown(0),
        }
    }

    fn rows(&self) -> u32 {
        match self {
            HostType::Leaf { rows, .. } => *rows,
            HostType::Struct { .. } => 0,
        }
    }

    fn columns(&self) -> u32 {
        match self {
            HostType::Leaf { columns, .. } => *columns,
            HostType::Struct { .. } => 0,
        }
    }

    fn offset(&self) -> usize {
        match self {
            HostType::Leaf { offset, .. } | HostType::Struct { offset, .. } => *offset,
        }
    }

    fn is_row_major(&self) -> bool {
        match self {
            HostType::Leaf { row_major, .. } => *row_major,
            HostType::Struct { .. } => false,
        }
    }
}

/// An owned buffer declaration.
#[derive(Debug, Clone)]
pub struct HostBuffer {
    pub name: String,
    pub kind: BufferDeclKind,
    pub size_in_bytes: usize,
    /// `(name, start offset, type)` per top-level variable.
    pub variables: Vec<(String, usize, HostType)>,
}

impl HostBuffer {
    pub fn constant(name: &str, size_in_bytes: usize) -> Self {
        Self {
            name: name.to_owned(),
            kind: BufferDeclKind::Constant,
            size_in_bytes,
            variables: Vec::new(),
        }
    }

    pub fn texture_buffer(name: &str, size_in_bytes: usize) -> Self {
        Self {
            kind: BufferDeclKind::TextureBuffer,
            ..Self::constant(name, size_in_bytes)
        }
    }

    /// A buffer-like slot of a kind the consolidator skips.
    pub fn other(name: &str, raw: u32) -> Self {
        Self {
            kind: BufferDeclKind::Other(raw),
            ..Self::constant(name, 0)
        }
    }

    pub fn with_variable(mut self, name: &str, start_offset: usize, ty: HostType) -> Self {
        self.variables.push((name.to_owned(), start_offset, ty));
        self
    }
}

impl BufferDecl for HostBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BufferDeclKind {
        self.kind
    }

    fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    fn variable_count(&self) -> u32 {
        self.variables.len() as u32
    }

    fn variable_at(&self, index: u32) -> Option<VariableDecl<'_>> {
        self.variables
            .get(index as usize)
            .map(|(name, start_offset, ty)| VariableDecl {
                name: name.as_str(),
                start_offset: *start_offset,
                ty: Box::new(ty),
            })
    }
}

/// An owned resource-binding-table entry.
#[derive(Debug, Clone)]
pub struct HostResource {
    pub name: String,
    pub kind: ResourceBindingKind,
    pub bind_point: u32,
    pub register_space: u32,
    pub bind_count: u32,
    pub dims: ResourceDimensions,
    pub component_type: ResourceComponentType,
}

impl HostResource {
    /// A single 2D float texture.
    pub fn texture(name: &str, bind_point: u32) -> Self {
        Self {
            name: name.to_owned(),
            kind: ResourceBindingKind::Texture,
            bind_point,
            register_space: 0,
            bind_count: 1,
            dims: ResourceDimensions::Texture2D,
            component_type: ResourceComponentType::Float,
        }
    }

    pub fn sampler(name: &str, bind_point: u32) -> Self {
        Self {
            kind: ResourceBindingKind::Sampler,
            dims: ResourceDimensions::Unknown,
            component_type: ResourceComponentType::Unknown(0),
            ..Self::texture(name, bind_point)
        }
    }

    pub fn with_dims(mut self, dims: ResourceDimensions) -> Self {
        self.dims = dims;
        self
    }

    pub fn with_component_type(mut self, component_type: ResourceComponentType) -> Self {
        self.component_type = component_type;
        self
    }

    pub fn with_bind_count(mut self, bind_count: u32) -> Self {
        self.bind_count = bind_count;
        self
    }

    pub fn with_register_space(mut self, register_space: u32) -> Self {
        self.register_space = register_space;
        self
    }
}

/// An in-memory reflection handle for one stage.
#[derive(Debug, Clone, Default)]
pub struct HostStage {
    slots: Vec<Option<HostBuffer>>,
    resources: Vec<HostResource>,
    /// `(semantic name, semantic index, format)` per input element.
    inputs: Vec<(String, u32, u32)>,
}

impl HostStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constant buffer and its resource-binding-table entry in one
    /// step.
    pub fn with_constant_buffer(mut self, buffer: HostBuffer, bind_point: u32) -> Self {
        self.resources.push(HostResource {
            name: buffer.name.clone(),
            kind: match buffer.kind {
                BufferDeclKind::TextureBuffer => ResourceBindingKind::TextureBuffer,
                _ => ResourceBindingKind::ConstantBuffer,
            },
            bind_point,
            register_space: 0,
            bind_count: 1,
            dims: ResourceDimensions::Unknown,
            component_type: ResourceComponentType::Unknown(0),
        });
        self.slots.push(Some(buffer));
        self
    }

    /// Appends a raw buffer slot without a binding-table entry.
    pub fn with_buffer_slot(mut self, buffer: HostBuffer) -> Self {
        self.slots.push(Some(buffer));
        self
    }

    /// Appends an empty probe slot.
    pub fn with_empty_slot(mut self) -> Self {
        self.slots.push(None);
        self
    }

    pub fn with_resource(mut self, resource: HostResource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_input(mut self, semantic_name: &str, semantic_index: u32, format: u32) -> Self {
        self.inputs
            .push((semantic_name.to_owned(), semantic_index, format));
        self
    }
}

impl StageReflection for HostStage {
    fn declared_buffer_count(&self) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|buffer| {
                matches!(
                    buffer.kind,
                    BufferDeclKind::Constant | BufferDeclKind::TextureBuffer
                )
            })
            .count() as u32
    }

    fn buffer_slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    fn buffer_at(&self, index: u32) -> Option<&dyn BufferDecl> {
        self.slots
            .get(index as usize)?
            .as_ref()
            .map(|buffer| buffer as &dyn BufferDecl)
    }

    fn buffer_bind_point(&self, name: &str) -> Option<u32> {
        self.resources
            .iter()
            .find(|resource| {
                resource.name == name
                    && matches!(
                        resource.kind,
                        ResourceBindingKind::ConstantBuffer | ResourceBindingKind::TextureBuffer
                    )
            })
            .map(|resource| resource.bind_point)
    }

    fn bound_resource_count(&self) -> u32 {
        self.resources.len() as u32
    }

    fn bound_resource_at(&self, index: u32) -> Option<BoundResourceDesc<'_>> {
        self.resources.get(index as usize).map(|resource| {
            BoundResourceDesc {
                name: &resource.name,
                kind: resource.kind,
                bind_point: resource.bind_point,
                register_space: resource.register_space,
                bind_count: resource.bind_count,
                dims: resource.dims,
                component_type: resource.component_type,
            }
        })
    }

    fn input_element_count(&self) -> u32 {
        self.inputs.len() as u32
    }

    fn input_element_at(&self, index: u32) -> Option<InputElementDesc<'_>> {
        self.inputs
            .get(index as usize)
            .map(|(semantic_name, semantic_index, format)| InputElementDesc {
                semantic_name,
                semantic_index: *semantic_index,
                format: *format,
            })
    }
}
