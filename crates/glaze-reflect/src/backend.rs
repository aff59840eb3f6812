//! Capability traits a graphics backend implements to expose one compiled
//! stage's reflection metadata to the consolidation engine.
//!
//! The engine never talks to a compiler or driver directly; it walks these
//! traits. Each supported backend ships one adapter that maps its native
//! reflection objects onto this minimal surface (see the `host` module for the
//! in-memory adapter, and the DXBC adapter crate for a wire-format one).

use crate::program::ResourceDimensions;
use crate::types::ScalarKind;

/// One compiler-reported type-tree node: a struct, or a leaf
/// (scalar/vector/matrix), either possibly an array.
pub trait TypeNode {
    /// `true` when the node is a struct whose members are themselves type nodes.
    fn is_struct(&self) -> bool;
    /// Number of struct members; 0 for leaves.
    fn member_count(&self) -> u32;
    /// Declared name of member `index`.
    fn member_name(&self, index: u32) -> Option<&str>;
    /// Type node of member `index`, borrowing from this node.
    fn member_at(&self, index: u32) -> Option<Box<dyn TypeNode + '_>>;
    /// Array element count; 0 when the node is not an array.
    fn element_count(&self) -> u32;
    /// Scalar category for leaf nodes.
    fn scalar_kind(&self) -> ScalarKind;
    /// Row count for leaf nodes (1 for vectors, 2..=4 for matrices).
    fn rows(&self) -> u32;
    /// Column count for leaf nodes.
    fn columns(&self) -> u32;
    /// Byte offset of this node relative to its parent aggregate.
    fn offset(&self) -> usize;
    /// Matrix storage order; meaningful for matrix leaves only.
    fn is_row_major(&self) -> bool;
}

impl<T: TypeNode + ?Sized> TypeNode for &T {
    fn is_struct(&self) -> bool {
        (**self).is_struct()
    }
    fn member_count(&self) -> u32 {
        (**self).member_count()
    }
    fn member_name(&self, index: u32) -> Option<&str> {
        (**self).member_name(index)
    }
    fn member_at(&self, index: u32) -> Option<Box<dyn TypeNode + '_>> {
        (**self).member_at(index)
    }
    fn element_count(&self) -> u32 {
        (**self).element_count()
    }
    fn scalar_kind(&self) -> ScalarKind {
        (**self).scalar_kind()
    }
    fn rows(&self) -> u32 {
        (**self).rows()
    }
    fn columns(&self) -> u32 {
        (**self).columns()
    }
    fn offset(&self) -> usize {
        (**self).offset()
    }
    fn is_row_major(&self) -> bool {
        (**self).is_row_major()
    }
}

/// Kind of a buffer-like declaration as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferDeclKind {
    /// A constant buffer.
    Constant,
    /// A texture buffer.
    TextureBuffer,
    /// Any other buffer-like object, carrying the backend's raw code. These do
    /// not participate in buffer consolidation.
    Other(u32),
}

/// A top-level variable inside a buffer declaration: the entry point into the
/// type walker.
pub struct VariableDecl<'a> {
    /// Declared variable name.
    pub name: &'a str,
    /// Byte offset of the variable from the start of its buffer.
    pub start_offset: usize,
    /// The variable's type tree.
    pub ty: Box<dyn TypeNode + 'a>,
}

/// One buffer-like object declared by a stage.
pub trait BufferDecl {
    fn name(&self) -> &str;
    fn kind(&self) -> BufferDeclKind;
    /// Total size in bytes as declared by the compiler.
    fn size_in_bytes(&self) -> usize;
    /// Number of top-level variables.
    fn variable_count(&self) -> u32;
    fn variable_at(&self, index: u32) -> Option<VariableDecl<'_>>;
}

/// Kind of an entry in a stage's resource-binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceBindingKind {
    /// A constant buffer binding; consolidated by the buffer pass, skipped by
    /// the resource pass.
    ConstantBuffer,
    /// A texture buffer binding; likewise handled by the buffer pass.
    TextureBuffer,
    Texture,
    Sampler,
    /// Any other binding kind, carrying the backend's raw code.
    Other(u32),
}

/// Texel component category as the driver reports it.
///
/// The consolidation engine folds `UNorm`, `SNorm` and `Float` into one
/// float-returning category; the distinction only exists at this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceComponentType {
    UNorm,
    SNorm,
    Float,
    SInt,
    UInt,
    Mixed,
    Double,
    /// A component category this engine does not model.
    Unknown(u32),
}

/// One entry of a stage's resource-binding table.
#[derive(Debug, Clone)]
pub struct BoundResourceDesc<'a> {
    pub name: &'a str,
    pub kind: ResourceBindingKind,
    /// Register slot the resource binds to.
    pub bind_point: u32,
    /// Register space (0 on backends without register spaces).
    pub register_space: u32,
    /// Number of consecutive bind points the declaration occupies.
    pub bind_count: u32,
    /// Texture dimensionality; `Unknown` for non-texture bindings.
    pub dims: ResourceDimensions,
    /// Sampled component category; `Unknown(0)` for non-texture bindings.
    pub component_type: ResourceComponentType,
}

/// One element of the vertex stage's input signature.
#[derive(Debug, Clone)]
pub struct InputElementDesc<'a> {
    /// Semantic name (e.g. `"POSITION"`).
    pub semantic_name: &'a str,
    /// Semantic index (e.g. `1` for `TEXCOORD1`).
    pub semantic_index: u32,
    /// Backend-specific element format code.
    pub format: u32,
}

/// Reflection metadata for one compiled stage.
///
/// Buffer enumeration is a bounded probe: slots `0..buffer_slot_count()` may
/// interleave buffers of non-constant kinds (or gaps), so callers filter by
/// [`BufferDecl::kind`] and stop once [`declared_buffer_count`] matching
/// declarations were seen.
///
/// [`declared_buffer_count`]: StageReflection::declared_buffer_count
pub trait StageReflection {
    /// Number of constant/texture-buffer declarations in this stage.
    fn declared_buffer_count(&self) -> u32;
    /// Upper bound on buffer slot indices worth probing.
    fn buffer_slot_count(&self) -> u32;
    /// The buffer-like object at `index`, if that slot holds one.
    fn buffer_at(&self, index: u32) -> Option<&dyn BufferDecl>;
    /// Bind point for a named buffer, looked up in the stage's
    /// resource-binding table.
    fn buffer_bind_point(&self, name: &str) -> Option<u32>;
    /// Number of entries in the resource-binding table.
    fn bound_resource_count(&self) -> u32;
    fn bound_resource_at(&self, index: u32) -> Option<BoundResourceDesc<'_>>;
    /// Number of input-signature elements (vertex stage only; 0 elsewhere).
    fn input_element_count(&self) -> u32;
    fn input_element_at(&self, index: u32) -> Option<InputElementDesc<'_>>;
}
