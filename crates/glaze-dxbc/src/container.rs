use core::fmt;

use crate::error::DxbcError;
use crate::fourcc::FourCC;
use crate::rdef::{parse_rdef_chunk_with_fourcc, RdefData};
use crate::signature::{parse_signature_chunk_with_fourcc, SignatureData};

// magic + checksum + reserved + total_size + chunk_count
const HEADER_LEN: usize = 4 + 16 + 4 + 4 + 4;
const DXBC_MAGIC: FourCC = FourCC(*b"DXBC");
// Real containers hold a handful of chunks; the cap bounds the work done on a
// hostile offset table.
const MAX_CHUNK_COUNT: u32 = 256;

/// The fixed header of a `DXBC` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DxbcHeader {
    /// MD5 checksum stored in the header; not validated during parsing.
    pub checksum: [u8; 16],
    /// Declared total size of the container in bytes.
    pub total_size: u32,
    /// Number of chunks in the container.
    pub chunk_count: u32,
}

/// One chunk of a `DXBC` container.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DxbcChunk<'a> {
    /// Chunk identifier (`RDEF`, `ISGN`, `SHEX`, ...).
    pub fourcc: FourCC,
    /// Raw payload bytes.
    pub data: &'a [u8],
}

impl fmt::Debug for DxbcChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DxbcChunk")
            .field("fourcc", &self.fourcc)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A parsed `DXBC` container.
///
/// The input is treated as untrusted: every offset and size in the header and
/// chunk table is validated up front, so chunk access never reads out of
/// bounds and never panics.
#[derive(Debug, Clone)]
pub struct DxbcContainer<'a> {
    header: DxbcHeader,
    chunks: Vec<DxbcChunk<'a>>,
}

impl<'a> DxbcContainer<'a> {
    /// Parses a `DXBC` container from `bytes`.
    pub fn parse(bytes: &'a [u8]) -> Result<DxbcContainer<'a>, DxbcError> {
        if bytes.len() < HEADER_LEN {
            return Err(DxbcError::MalformedHeader(format!(
                "need at least {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let magic = FourCC([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != DXBC_MAGIC {
            return Err(DxbcError::MalformedHeader(format!(
                "bad magic {magic:?}, expected {DXBC_MAGIC:?}"
            )));
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&bytes[4..20]);

        // 4 reserved bytes at 20..24.
        let total_size = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
        let chunk_count = u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);

        if (total_size as usize) < HEADER_LEN {
            return Err(DxbcError::MalformedHeader(format!(
                "total_size {total_size} is smaller than the header"
            )));
        }
        if total_size as usize > bytes.len() {
            return Err(DxbcError::MalformedHeader(format!(
                "total_size {total_size} exceeds buffer length {}",
                bytes.len()
            )));
        }
        if chunk_count > MAX_CHUNK_COUNT {
            return Err(DxbcError::MalformedChunkTable(format!(
                "chunk_count {chunk_count} exceeds maximum {MAX_CHUNK_COUNT}"
            )));
        }

        let bytes = &bytes[..total_size as usize];
        let table_end = HEADER_LEN + chunk_count as usize * 4;
        if table_end > bytes.len() {
            return Err(DxbcError::MalformedChunkTable(format!(
                "chunk offset table ends at {table_end}, but total_size is {}",
                bytes.len()
            )));
        }

        let mut chunks = Vec::with_capacity(chunk_count as usize);
        for index in 0..chunk_count as usize {
            let entry = HEADER_LEN + index * 4;
            let offset =
                u32::from_le_bytes([bytes[entry], bytes[entry + 1], bytes[entry + 2], bytes[entry + 3]])
                    as usize;

            if offset < table_end {
                return Err(DxbcError::MalformedChunkTable(format!(
                    "chunk {index} offset {offset} points into the header or offset table"
                )));
            }
            let header_end = offset.checked_add(8).filter(|&end| end <= bytes.len()).ok_or_else(|| {
                DxbcError::MalformedChunkTable(format!(
                    "chunk {index} header at {offset} is outside total_size {}",
                    bytes.len()
                ))
            })?;

            let fourcc = FourCC([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]);
            let size = u32::from_le_bytes([
                bytes[offset + 4],
                bytes[offset + 5],
                bytes[offset + 6],
                bytes[offset + 7],
            ]) as usize;

            let data_end = header_end.checked_add(size).filter(|&end| end <= bytes.len()).ok_or_else(
                || {
                    DxbcError::MalformedChunkTable(format!(
                        "chunk {index} ({fourcc}) data of {size} bytes at {header_end} is outside total_size {}",
                        bytes.len()
                    ))
                },
            )?;

            chunks.push(DxbcChunk {
                fourcc,
                data: &bytes[header_end..data_end],
            });
        }

        Ok(DxbcContainer {
            header: DxbcHeader {
                checksum,
                total_size,
                chunk_count,
            },
            chunks,
        })
    }

    /// The parsed container header.
    pub fn header(&self) -> &DxbcHeader {
        &self.header
    }

    /// All chunks, in file order.
    pub fn chunks(&self) -> impl Iterator<Item = DxbcChunk<'a>> + '_ {
        self.chunks.iter().copied()
    }

    /// The first chunk matching `fourcc`, if any.
    pub fn chunk(&self, fourcc: FourCC) -> Option<DxbcChunk<'a>> {
        self.chunks().find(|chunk| chunk.fourcc == fourcc)
    }

    /// Parses the container's resource-definition chunk.
    ///
    /// Most compilers emit `RDEF`; some toolchains use the alternate `RD11`
    /// identifier. Chunks with the primary identifier are tried in file order
    /// first, then the alternate; the first successfully parsed chunk wins and
    /// the first parse error is reported only if no chunk parses.
    pub fn rdef(&self) -> Result<RdefData, DxbcError> {
        self.parse_first(&[FourCC(*b"RDEF"), FourCC(*b"RD11")], "RDEF/RD11", |chunk| {
            parse_rdef_chunk_with_fourcc(chunk.fourcc, chunk.data)
        })
    }

    /// Parses the container's vertex input-signature chunk, if present.
    ///
    /// Accepts both the `ISGN` and the `ISG1` identifier. Returns `None` when
    /// the container carries neither.
    pub fn input_signature(&self) -> Option<Result<SignatureData, DxbcError>> {
        match self.parse_first(&[FourCC(*b"ISGN"), FourCC(*b"ISG1")], "ISGN/ISG1", |chunk| {
            parse_signature_chunk_with_fourcc(chunk.fourcc, chunk.data)
        }) {
            Err(DxbcError::MissingChunk(_)) => None,
            result => Some(result),
        }
    }

    fn parse_first<T>(
        &self,
        ids: &[FourCC],
        what: &'static str,
        parse: impl Fn(DxbcChunk<'a>) -> Result<T, DxbcError>,
    ) -> Result<T, DxbcError> {
        let mut first_err = None;
        for &id in ids {
            for chunk in self.chunks().filter(|chunk| chunk.fourcc == id) {
                match parse(chunk) {
                    Ok(parsed) => return Ok(parsed),
                    Err(err) => {
                        if first_err.is_none() {
                            first_err = Some(err);
                        }
                    }
                }
            }
        }
        Err(first_err.unwrap_or(DxbcError::MissingChunk(what)))
    }
}
