//! A safe, zero-panic parser for DirectX shader-bytecode containers (`DXBC`),
//! plus the adapter that exposes their reflection chunks to `glaze-reflect`.
//!
//! Shader blobs are treated as **untrusted** input: every offset and size is
//! bounds-checked, and malformed or hostile bytes produce [`DxbcError`]s, never
//! panics or out-of-bounds reads.
//!
//! Covered chunks:
//!
//! - `RDEF`/`RD11` — constant-buffer declarations (with their recursive type
//!   records) and the resource-binding table.
//! - `ISGN`/`ISG1` — the vertex input signature.
//!
//! [`DxbcStage`] ties the two together and implements
//! `glaze_reflect::backend::StageReflection`, so a parsed blob can feed the
//! cross-stage consolidation engine directly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod adapter;
mod container;
mod error;
mod fourcc;
mod read;
/// Parser for DXBC resource-definition chunks (`RDEF`/`RD11`).
pub mod rdef;
/// Parser for DXBC input-signature chunks (`ISGN`/`ISG1`).
pub mod signature;

/// Builders for synthetic DXBC blobs in tests.
///
/// Available to this crate's own tests, and to downstream crates through the
/// `test-utils` feature. Not part of the stable parsing API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests_rdef;
#[cfg(test)]
mod tests_signature;

pub use crate::adapter::DxbcStage;
pub use crate::container::{DxbcChunk, DxbcContainer, DxbcHeader};
pub use crate::error::DxbcError;
pub use crate::fourcc::FourCC;
pub use crate::rdef::{
    parse_rdef_chunk, parse_rdef_chunk_with_fourcc, RdefBinding, RdefBuffer, RdefData, RdefType,
    RdefTypeMember, RdefVariable, TargetVersion,
};
pub use crate::signature::{
    parse_signature_chunk, parse_signature_chunk_with_fourcc, SignatureData, SignatureElement,
};
