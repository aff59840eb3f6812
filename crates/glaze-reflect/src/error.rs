use thiserror::Error;

use crate::stage::{ShaderStage, StageFlags};
use crate::types::ScalarKind;

/// Failures detected while consolidating a program's per-stage reflection data.
///
/// Every variant is recoverable: a failed consolidation rejects the whole
/// program and the `Display` output is the human-readable diagnostic log for
/// the caller to surface. Nothing here panics on malformed stage metadata.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The same buffer name resolves to different bind points in different
    /// stages. No field-level report is possible; shared buffers must use
    /// explicit, matching bind points.
    #[error(
        "buffer '{name}' is bound at slot {first} by stages {existing:?} and at slot {second} by the {stage:?} stage; shared buffers must use the same bind point in every stage"
    )]
    BindPointConflict {
        name: String,
        stage: ShaderStage,
        existing: StageFlags,
        first: u32,
        second: u32,
    },

    /// A buffer redeclared by a later stage differs structurally from the
    /// definition recorded for an earlier stage. `report` itemizes every
    /// mismatching field.
    #[error("buffer '{name}' has different definitions between shader stages:\n{report}")]
    BufferMismatch { name: String, report: String },

    /// A resource redeclared by a later stage differs from the recorded
    /// definition. `report` itemizes every mismatching field.
    #[error("resource '{name}' has different definitions between shader stages:\n{report}")]
    ResourceMismatch { name: String, report: String },

    /// A leaf type node reported a `(scalar kind, rows, columns)` combination
    /// outside the closed type enumeration. This signals a compiler/driver
    /// capability gap rather than a user error.
    #[error("unsupported leaf type layout in '{name}': {kind:?} with {rows} row(s) and {columns} column(s)")]
    UnsupportedLeafLayout {
        name: String,
        kind: ScalarKind,
        rows: u32,
        columns: u32,
    },

    /// A type node advertised more members than it exposes.
    #[error("type metadata for '{name}' reports more members than it exposes (member {index} is missing)")]
    MalformedTypeTree { name: String, index: u32 },

    /// A buffer declaration advertised more variables than it exposes.
    #[error("buffer '{name}' reports more variables than it exposes (variable {index} is missing)")]
    MalformedBufferDecl { name: String, index: u32 },

    /// A declared buffer has no entry in the stage's resource-binding table.
    #[error("buffer '{name}' has no bind point in the stage's resource-binding table")]
    MissingBindPoint { name: String },

    /// The vertex stage advertised more input-signature elements than it exposes.
    #[error("vertex input element {index} is missing from the stage's input signature")]
    MissingInputElement { index: u32 },

    /// An input-signature element carries no semantic name.
    #[error("vertex input element {index} has an empty semantic name")]
    EmptyInputSemantic { index: u32 },
}
