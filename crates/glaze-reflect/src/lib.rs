//! Backend-agnostic shader reflection and cross-stage binding consolidation.
//!
//! After each stage of a multi-stage GPU program has been compiled, this crate
//! walks the compiler-reported type metadata of every stage and merges it into
//! one verified, program-wide description: every constant/storage buffer with
//! its flattened variables (exact byte offsets, array strides, matrix storage
//! order), and every bound texture/sampler. Declarations shared by multiple
//! stages must be structurally identical; any disagreement rejects the whole
//! program with an itemized diagnostic instead of silently picking one stage's
//! view.
//!
//! Compilers and drivers are reached only through the capability traits in
//! [`backend`]; one adapter per graphics backend maps its native reflection
//! objects onto that surface. The [`host`] module ships an in-memory adapter.
//!
//! Consolidation runs single-threaded, exactly once per program. The resulting
//! [`ProgramReflection`] is immutable and can be read concurrently for the
//! lifetime of the owning program.

#![forbid(unsafe_code)]

pub mod backend;
mod consolidate;
mod error;
pub mod host;
mod program;
mod stage;
mod types;
mod validate;
mod walk;

pub use crate::consolidate::{ProgramReflectionBuilder, StageSet};
pub use crate::error::ReflectError;
pub use crate::program::{
    BufferKind, BufferReflection, ProgramReflection, Resource, ResourceDimensions, ResourceKind,
    ReturnType,
};
pub use crate::stage::{ShaderStage, StageFlags};
pub use crate::types::{ScalarKind, VariableType};
pub use crate::walk::{flatten_type, struct_size, Variable, VariableMap};
