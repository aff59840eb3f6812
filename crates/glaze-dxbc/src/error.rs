use thiserror::Error;

use crate::fourcc::FourCC;

/// Failures while parsing an untrusted `DXBC` blob.
///
/// Every variant carries enough context to point at the offending offset or
/// field; parsing never panics, whatever the input bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DxbcError {
    /// The fixed container header is truncated or carries impossible values.
    #[error("malformed DXBC header: {0}")]
    MalformedHeader(String),
    /// The chunk offset table is truncated, overlapping, or points outside the
    /// container.
    #[error("malformed DXBC chunk table: {0}")]
    MalformedChunkTable(String),
    /// A chunk payload failed to parse.
    #[error("invalid {chunk} chunk: {context}")]
    InvalidChunk {
        /// Identifier of the offending chunk.
        chunk: FourCC,
        /// What went wrong, with offsets where useful.
        context: String,
    },
    /// The container has no chunk of a required kind.
    #[error("DXBC container has no {0} chunk")]
    MissingChunk(&'static str),
}

impl DxbcError {
    pub(crate) fn invalid_chunk(chunk: FourCC, context: impl Into<String>) -> Self {
        DxbcError::InvalidChunk {
            chunk,
            context: context.into(),
        }
    }
}
