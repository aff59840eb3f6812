//! Stage-by-stage consolidation of per-stage reflection into the program-wide
//! tables.

use tracing::{debug, warn};

use crate::backend::{
    BufferDeclKind, ResourceBindingKind, ResourceComponentType, StageReflection,
};
use crate::error::ReflectError;
use crate::program::{
    BufferKind, BufferReflection, ProgramReflection, Resource, ResourceDimensions, ResourceKind,
    ReturnType,
};
use crate::stage::{ShaderStage, StageFlags};
use crate::validate::{check_buffer_redeclaration, check_resource_redeclaration};
use crate::walk::{flatten_type, struct_size, VariableMap};

/// The per-stage reflection handles of one program, indexed by stage.
pub struct StageSet<'a> {
    stages: [Option<&'a dyn StageReflection>; ShaderStage::COUNT],
}

impl<'a> StageSet<'a> {
    pub fn new() -> Self {
        Self {
            stages: [None; ShaderStage::COUNT],
        }
    }

    /// Attaches a stage's reflection handle, replacing any previous handle for
    /// that stage.
    pub fn set(&mut self, stage: ShaderStage, handle: &'a dyn StageReflection) -> &mut Self {
        self.stages[stage.index()] = Some(handle);
        self
    }

    pub fn get(&self, stage: ShaderStage) -> Option<&'a dyn StageReflection> {
        self.stages[stage.index()]
    }

    /// Active stages in the fixed [`ShaderStage::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &'a dyn StageReflection)> + '_ {
        ShaderStage::ALL
            .into_iter()
            .filter_map(|stage| self.get(stage).map(|handle| (stage, handle)))
    }
}

impl Default for StageSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Incremental construction of a [`ProgramReflection`], one stage at a time.
///
/// Stages must be added in a fixed order for deterministic diagnostics;
/// [`ProgramReflection::reflect`] does that for a whole [`StageSet`]. A failed
/// [`add_stage`](Self::add_stage) leaves the tables exactly as the previous
/// stages built them.
#[derive(Default)]
pub struct ProgramReflectionBuilder {
    reflection: ProgramReflection,
}

impl ProgramReflectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one stage's buffers and resources into the program tables,
    /// validating every redeclaration against the recorded definitions.
    pub fn add_stage(
        &mut self,
        stage: ShaderStage,
        handle: &dyn StageReflection,
    ) -> Result<(), ReflectError> {
        self.merge_buffers(stage, handle)?;
        self.merge_resources(stage, handle)?;
        if stage == ShaderStage::Vertex {
            check_vertex_inputs(handle)?;
        }
        Ok(())
    }

    /// The tables built so far.
    pub fn reflection(&self) -> &ProgramReflection {
        &self.reflection
    }

    pub fn finish(self) -> ProgramReflection {
        self.reflection
    }

    fn merge_buffers(
        &mut self,
        stage: ShaderStage,
        handle: &dyn StageReflection,
    ) -> Result<(), ReflectError> {
        let target = handle.declared_buffer_count();
        let mut found = 0u32;

        // Buffer slots can be sparse with respect to constant/texture-buffer
        // declarations, so probe every slot but stop as soon as the declared
        // number of matching-kind buffers has been seen.
        for index in 0..handle.buffer_slot_count() {
            if found == target {
                break;
            }
            let Some(decl) = handle.buffer_at(index) else {
                continue;
            };
            let kind = match decl.kind() {
                BufferDeclKind::Constant => BufferKind::Constant,
                BufferDeclKind::TextureBuffer => BufferKind::UnorderedAccess,
                BufferDeclKind::Other(_) => continue,
            };
            found += 1;

            let name = decl.name().to_owned();
            let mut variables = VariableMap::new();
            for var_index in 0..decl.variable_count() {
                let Some(var) = decl.variable_at(var_index) else {
                    return Err(ReflectError::MalformedBufferDecl {
                        name,
                        index: var_index,
                    });
                };
                flatten_type(var.ty.as_ref(), &mut variables, var.name, var.start_offset)?;
            }

            let declared_size = decl.size_in_bytes();
            let computed_size = struct_size(&variables);
            if computed_size != declared_size {
                // The compiler-declared size is authoritative; disagreement
                // points at a layout-rule divergence worth surfacing.
                warn!(
                    buffer = %name,
                    declared = declared_size,
                    computed = computed_size,
                    "declared buffer size differs from flattened layout"
                );
            }

            let Some(bind_point) = handle.buffer_bind_point(&name) else {
                return Err(ReflectError::MissingBindPoint { name });
            };

            let table = self.reflection.table_mut(kind);
            match table.bind_points.get(&name).copied() {
                Some(first) if first != bind_point => {
                    let existing = table
                        .by_bind_point
                        .get(&first)
                        .map(|buffer| buffer.stage_mask())
                        .unwrap_or_else(StageFlags::empty);
                    return Err(ReflectError::BindPointConflict {
                        name,
                        stage,
                        existing,
                        first,
                        second: bind_point,
                    });
                }
                Some(_) => {
                    let Some(prev) = table.by_bind_point.get_mut(&bind_point) else {
                        return Err(ReflectError::MissingBindPoint { name });
                    };
                    let check = check_buffer_redeclaration(prev, &variables);
                    if !check.matches() {
                        return Err(ReflectError::BufferMismatch {
                            name,
                            report: check.report(),
                        });
                    }
                    prev.add_stage(stage.flag());
                }
                None => {
                    let mut buffer = BufferReflection::new(
                        name.clone(),
                        bind_point,
                        kind,
                        declared_size,
                        decl.variable_count(),
                        variables,
                    );
                    buffer.add_stage(stage.flag());
                    debug!(
                        buffer = %name,
                        bind_point,
                        kind = ?kind,
                        stage = ?stage,
                        "registered buffer"
                    );
                    table.insert(buffer);
                }
            }
        }

        Ok(())
    }

    fn merge_resources(
        &mut self,
        stage: ShaderStage,
        handle: &dyn StageReflection,
    ) -> Result<(), ReflectError> {
        for index in 0..handle.bound_resource_count() {
            let Some(desc) = handle.bound_resource_at(index) else {
                continue;
            };
            let kind = match desc.kind {
                // Buffer-kind bindings were consolidated by the buffer pass.
                ResourceBindingKind::ConstantBuffer | ResourceBindingKind::TextureBuffer => {
                    continue;
                }
                ResourceBindingKind::Texture => ResourceKind::Texture,
                ResourceBindingKind::Sampler => ResourceKind::Sampler,
                ResourceBindingKind::Other(raw) => {
                    warn!(resource = %desc.name, raw, "unrecognized resource binding kind");
                    ResourceKind::Unknown
                }
            };
            let (dims, return_type) = if kind != ResourceKind::Sampler {
                (desc.dims, fold_return_type(&desc))
            } else {
                (ResourceDimensions::Unknown, ReturnType::Unknown)
            };

            // A name ending in `]` marks an array binding spanning `bind_count`
            // consecutive slots.
            let array_size = if desc.name.ends_with(']') {
                desc.bind_count
            } else {
                0
            };

            let name = desc.name.to_owned();
            let resource = Resource {
                name: name.clone(),
                kind,
                dims,
                return_type,
                bind_point: desc.bind_point,
                register_space: desc.register_space,
                array_size,
                stage_mask: StageFlags::empty(),
            };

            match self.reflection.resources.get_mut(&name) {
                Some(prev) => {
                    let check = check_resource_redeclaration(prev, &resource);
                    if !check.matches() {
                        return Err(ReflectError::ResourceMismatch {
                            name,
                            report: check.report(),
                        });
                    }
                    prev.stage_mask |= stage.flag();
                }
                None => {
                    let mut resource = resource;
                    resource.stage_mask |= stage.flag();
                    debug!(
                        resource = %name,
                        bind_point = resource.bind_point,
                        kind = ?resource.kind,
                        stage = ?stage,
                        "registered resource"
                    );
                    self.reflection.resources.insert(name, resource);
                }
            }
        }

        Ok(())
    }
}

fn fold_return_type(desc: &crate::backend::BoundResourceDesc<'_>) -> ReturnType {
    match desc.component_type {
        // Normalized formats read back as floats.
        ResourceComponentType::UNorm
        | ResourceComponentType::SNorm
        | ResourceComponentType::Float => ReturnType::Float,
        ResourceComponentType::SInt => ReturnType::Int,
        ResourceComponentType::UInt => ReturnType::Uint,
        ResourceComponentType::Double => ReturnType::Double,
        ResourceComponentType::Mixed | ResourceComponentType::Unknown(_) => {
            warn!(
                resource = %desc.name,
                component_type = ?desc.component_type,
                "unrecognized resource return category"
            );
            ReturnType::Unknown
        }
    }
}

/// Iterates the vertex stage's input signature and validates that every
/// element is present and carries a semantic name. The elements are not yet
/// turned into a vertex-attribute layout; callers bind attributes by semantic
/// name.
fn check_vertex_inputs(handle: &dyn StageReflection) -> Result<(), ReflectError> {
    for index in 0..handle.input_element_count() {
        let Some(element) = handle.input_element_at(index) else {
            return Err(ReflectError::MissingInputElement { index });
        };
        if element.semantic_name.is_empty() {
            return Err(ReflectError::EmptyInputSemantic { index });
        }
    }
    Ok(())
}

impl ProgramReflection {
    /// Builds the program-wide reflection tables from every active stage, in
    /// the fixed [`ShaderStage::ALL`] order.
    ///
    /// Any consolidation failure rejects the whole program: there is no
    /// partial acceptance, and the error's `Display` output is the complete
    /// diagnostic log.
    pub fn reflect(stages: &StageSet<'_>) -> Result<ProgramReflection, ReflectError> {
        let mut builder = ProgramReflectionBuilder::new();
        for (stage, handle) in stages.iter() {
            builder.add_stage(stage, handle)?;
        }
        Ok(builder.finish())
    }
}
