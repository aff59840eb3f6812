//! `StageReflection` adapter over a parsed DXBC container.
//!
//! This is the DXBC instantiation of the engine's backend traits: raw record
//! codes from the `RDEF` and `ISGN` chunks are mapped onto the engine's
//! vocabulary here, and nowhere else.

use glaze_reflect::backend::{
    BoundResourceDesc, BufferDecl, BufferDeclKind, InputElementDesc, ResourceBindingKind,
    ResourceComponentType, StageReflection, TypeNode, VariableDecl,
};
use glaze_reflect::{ResourceDimensions, ScalarKind};

use crate::container::DxbcContainer;
use crate::error::DxbcError;
use crate::rdef::{RdefBuffer, RdefData, RdefType};
use crate::signature::SignatureData;

// D3D_SHADER_VARIABLE_CLASS
const CLASS_MATRIX_ROWS: u32 = 2;
const CLASS_STRUCT: u32 = 5;

// D3D_SHADER_INPUT_TYPE
const INPUT_CBUFFER: u32 = 0;
const INPUT_TBUFFER: u32 = 1;
const INPUT_TEXTURE: u32 = 2;
const INPUT_SAMPLER: u32 = 3;

// D3D_CBUFFER_TYPE
const CBUFFER_KIND_CBUFFER: u32 = 0;
const CBUFFER_KIND_TBUFFER: u32 = 1;

/// Reflection metadata for one compiled stage, parsed out of its DXBC blob.
///
/// Owns the parsed `RDEF` data (and the input signature, when the blob carries
/// one) and exposes them through the engine's backend traits.
#[derive(Debug, Clone)]
pub struct DxbcStage {
    rdef: RdefData,
    signature: Option<SignatureData>,
}

impl DxbcStage {
    /// Parses a stage's DXBC blob and extracts its reflection chunks.
    pub fn from_bytes(bytes: &[u8]) -> Result<DxbcStage, DxbcError> {
        Self::from_container(&DxbcContainer::parse(bytes)?)
    }

    /// Extracts the reflection chunks from an already-parsed container.
    pub fn from_container(container: &DxbcContainer<'_>) -> Result<DxbcStage, DxbcError> {
        let rdef = container.rdef()?;
        let signature = container.input_signature().transpose()?;
        Ok(DxbcStage { rdef, signature })
    }

    /// The parsed resource-definition data backing this stage.
    pub fn rdef(&self) -> &RdefData {
        &self.rdef
    }

    /// The parsed input signature, when the blob carries one.
    pub fn input_signature(&self) -> Option<&SignatureData> {
        self.signature.as_ref()
    }
}

impl StageReflection for DxbcStage {
    fn declared_buffer_count(&self) -> u32 {
        self.rdef
            .buffers
            .iter()
            .filter(|buffer| {
                matches!(buffer.kind, CBUFFER_KIND_CBUFFER | CBUFFER_KIND_TBUFFER)
            })
            .count() as u32
    }

    fn buffer_slot_count(&self) -> u32 {
        self.rdef.buffers.len() as u32
    }

    fn buffer_at(&self, index: u32) -> Option<&dyn BufferDecl> {
        self.rdef
            .buffers
            .get(index as usize)
            .map(|buffer| buffer as &dyn BufferDecl)
    }

    fn buffer_bind_point(&self, name: &str) -> Option<u32> {
        self.rdef
            .bindings
            .iter()
            .find(|binding| {
                matches!(binding.input_type, INPUT_CBUFFER | INPUT_TBUFFER)
                    && binding.name == name
            })
            .map(|binding| binding.bind_point)
    }

    fn bound_resource_count(&self) -> u32 {
        self.rdef.bindings.len() as u32
    }

    fn bound_resource_at(&self, index: u32) -> Option<BoundResourceDesc<'_>> {
        let binding = self.rdef.bindings.get(index as usize)?;
        Some(BoundResourceDesc {
            name: &binding.name,
            kind: binding_kind(binding.input_type),
            bind_point: binding.bind_point,
            register_space: binding.register_space,
            bind_count: binding.bind_count,
            dims: dimensions(binding.dimension),
            component_type: component_type(binding.return_type),
        })
    }

    fn input_element_count(&self) -> u32 {
        self.signature
            .as_ref()
            .map_or(0, |signature| signature.elements.len() as u32)
    }

    fn input_element_at(&self, index: u32) -> Option<InputElementDesc<'_>> {
        let element = self.signature.as_ref()?.elements.get(index as usize)?;
        Some(InputElementDesc {
            semantic_name: &element.semantic_name,
            semantic_index: element.semantic_index,
            format: element.component_type,
        })
    }
}

impl BufferDecl for RdefBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BufferDeclKind {
        match self.kind {
            CBUFFER_KIND_CBUFFER => BufferDeclKind::Constant,
            CBUFFER_KIND_TBUFFER => BufferDeclKind::TextureBuffer,
            other => BufferDeclKind::Other(other),
        }
    }

    fn size_in_bytes(&self) -> usize {
        self.size_in_bytes as usize
    }

    fn variable_count(&self) -> u32 {
        self.variables.len() as u32
    }

    fn variable_at(&self, index: u32) -> Option<VariableDecl<'_>> {
        let variable = self.variables.get(index as usize)?;
        Some(VariableDecl {
            name: &variable.name,
            start_offset: variable.start_offset as usize,
            ty: Box::new(DxbcTypeNode {
                ty: &variable.ty,
                offset: 0,
            }),
        })
    }
}

/// A type record paired with the member offset it was reached through.
///
/// D3D reflection reports a member's intra-struct offset on the member table
/// entry, not on the type record itself, so the adapter carries it alongside.
struct DxbcTypeNode<'a> {
    ty: &'a RdefType,
    offset: u32,
}

impl TypeNode for DxbcTypeNode<'_> {
    fn is_struct(&self) -> bool {
        self.ty.class == CLASS_STRUCT
    }

    fn member_count(&self) -> u32 {
        self.ty.members.len() as u32
    }

    fn member_name(&self, index: u32) -> Option<&str> {
        self.ty
            .members
            .get(index as usize)
            .map(|member| member.name.as_str())
    }

    fn member_at(&self, index: u32) -> Option<Box<dyn TypeNode + '_>> {
        let member = self.ty.members.get(index as usize)?;
        Some(Box::new(DxbcTypeNode {
            ty: &member.ty,
            offset: member.offset,
        }))
    }

    fn element_count(&self) -> u32 {
        self.ty.elements
    }

    fn scalar_kind(&self) -> ScalarKind {
        // D3D_SHADER_VARIABLE_TYPE
        match self.ty.base_type {
            1 => ScalarKind::Bool,
            2 => ScalarKind::Int,
            3 => ScalarKind::Float,
            19 => ScalarKind::Uint,
            other => ScalarKind::Unknown(other),
        }
    }

    fn rows(&self) -> u32 {
        self.ty.rows
    }

    fn columns(&self) -> u32 {
        self.ty.columns
    }

    fn offset(&self) -> usize {
        self.offset as usize
    }

    fn is_row_major(&self) -> bool {
        self.ty.class == CLASS_MATRIX_ROWS
    }
}

fn binding_kind(input_type: u32) -> ResourceBindingKind {
    match input_type {
        INPUT_CBUFFER => ResourceBindingKind::ConstantBuffer,
        INPUT_TBUFFER => ResourceBindingKind::TextureBuffer,
        INPUT_TEXTURE => ResourceBindingKind::Texture,
        INPUT_SAMPLER => ResourceBindingKind::Sampler,
        other => ResourceBindingKind::Other(other),
    }
}

fn dimensions(dimension: u32) -> ResourceDimensions {
    // D3D_SRV_DIMENSION
    match dimension {
        1 => ResourceDimensions::TextureBuffer,
        2 => ResourceDimensions::Texture1D,
        3 => ResourceDimensions::Texture1DArray,
        4 => ResourceDimensions::Texture2D,
        5 => ResourceDimensions::Texture2DArray,
        6 => ResourceDimensions::Texture2DMS,
        7 => ResourceDimensions::Texture2DMSArray,
        8 => ResourceDimensions::Texture3D,
        9 => ResourceDimensions::TextureCube,
        10 => ResourceDimensions::TextureCubeArray,
        _ => ResourceDimensions::Unknown,
    }
}

fn component_type(return_type: u32) -> ResourceComponentType {
    // D3D_RESOURCE_RETURN_TYPE
    match return_type {
        1 => ResourceComponentType::UNorm,
        2 => ResourceComponentType::SNorm,
        3 => ResourceComponentType::SInt,
        4 => ResourceComponentType::UInt,
        5 => ResourceComponentType::Float,
        6 => ResourceComponentType::Mixed,
        7 => ResourceComponentType::Double,
        other => ResourceComponentType::Unknown(other),
    }
}
