//! Parser for DXBC input-signature chunks (`ISGN`/`ISG1`).
//!
//! Signature chunks map the vertex stage's input semantics onto registers.
//! Two entry layouts exist in the wild: the classic 24-byte records and a
//! 32-byte variant (usually under the `ISG1` identifier) that widens the
//! stream/precision fields. Both are accepted.

use crate::error::DxbcError;
use crate::fourcc::FourCC;
use crate::read;

const SIGNATURE_HEADER_LEN: usize = 8;
const ENTRY_LEN_V0: usize = 24;
const ENTRY_LEN_V1: usize = 32;
const MAX_ELEMENT_COUNT: u32 = 4096;

/// A parsed input-signature chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureData {
    /// Signature elements, in record order.
    pub elements: Vec<SignatureElement>,
}

/// One element of an input signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureElement {
    /// Semantic name (e.g. `"POSITION"`).
    pub semantic_name: String,
    /// Semantic index (e.g. `1` for `TEXCOORD1`).
    pub semantic_index: u32,
    /// Register the element is assigned to.
    pub register: u32,
    /// Raw system-value code.
    pub system_value: u32,
    /// Raw register-component-type code.
    pub component_type: u32,
    /// Component presence mask (x=1, y=2, z=4, w=8).
    pub mask: u8,
}

/// Parses an input-signature chunk payload.
pub fn parse_signature_chunk(bytes: &[u8]) -> Result<SignatureData, DxbcError> {
    parse_signature_chunk_with_fourcc(FourCC(*b"ISGN"), bytes)
}

/// Parses an input-signature chunk payload, attributing errors to `fourcc`.
///
/// A fourcc ending in `1` selects the 32-byte entry layout up front; otherwise
/// the layout is detected from the first entry and the other layout is tried
/// as a fallback when the preferred one fails to parse.
pub fn parse_signature_chunk_with_fourcc(
    fourcc: FourCC,
    bytes: &[u8],
) -> Result<SignatureData, DxbcError> {
    let invalid = |context: String| DxbcError::invalid_chunk(fourcc, context);

    let element_count = read::u32_le(bytes, 0, "element count").map_err(invalid)?;
    let element_offset = read::u32_le(bytes, 4, "element offset").map_err(invalid)? as usize;

    if element_count == 0 {
        return Ok(SignatureData {
            elements: Vec::new(),
        });
    }
    if element_count > MAX_ELEMENT_COUNT {
        return Err(invalid(format!(
            "element count {element_count} exceeds maximum {MAX_ELEMENT_COUNT}"
        )));
    }
    if element_offset < SIGNATURE_HEADER_LEN {
        return Err(invalid(format!(
            "element offset {element_offset} points into the signature header"
        )));
    }

    let prefer_v1 = fourcc.0[3] == b'1' || detect_v1_layout(bytes, element_offset);
    let (first, second) = if prefer_v1 {
        (ENTRY_LEN_V1, ENTRY_LEN_V0)
    } else {
        (ENTRY_LEN_V0, ENTRY_LEN_V1)
    };

    match parse_elements(fourcc, bytes, element_count, element_offset, first) {
        Ok(elements) => Ok(SignatureData { elements }),
        Err(first_err) => {
            match parse_elements(fourcc, bytes, element_count, element_offset, second) {
                Ok(elements) => Ok(SignatureData { elements }),
                Err(_) => Err(first_err),
            }
        }
    }
}

// In the 32-byte layout the DWORDs at +24/+28 hold stream and min-precision,
// which are tiny values; in the 24-byte layout the same offsets land in the
// semantic-name string table, which starts with ASCII bytes (large values).
fn detect_v1_layout(bytes: &[u8], element_offset: usize) -> bool {
    let word = |offset: usize| {
        let end = offset.checked_add(4)?;
        let slice = bytes.get(offset..end)?;
        Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
    };
    match (word(element_offset + 24), word(element_offset + 28)) {
        (Some(stream), Some(precision)) => stream <= 3 && precision <= 8,
        _ => false,
    }
}

fn parse_elements(
    fourcc: FourCC,
    bytes: &[u8],
    element_count: u32,
    element_offset: usize,
    entry_len: usize,
) -> Result<Vec<SignatureElement>, DxbcError> {
    let mut elements = Vec::with_capacity(element_count as usize);

    for index in 0..element_count as usize {
        let what = |field: &str| format!("element {index} {field}");
        let invalid = |context: String| DxbcError::invalid_chunk(fourcc, context);
        let entry = element_offset + index * entry_len;

        let name_offset = read::u32_le(bytes, entry, &what("name offset")).map_err(invalid)?;
        let semantic_index =
            read::u32_le(bytes, entry + 4, &what("semantic index")).map_err(invalid)?;
        let system_value =
            read::u32_le(bytes, entry + 8, &what("system value")).map_err(invalid)?;
        let component_type =
            read::u32_le(bytes, entry + 12, &what("component type")).map_err(invalid)?;
        let register = read::u32_le(bytes, entry + 16, &what("register")).map_err(invalid)?;
        // Both layouts store the presence mask in the byte at +20; the v1
        // layout just widens what follows it.
        let mask_word = read::u32_le(bytes, entry + 20, &what("mask")).map_err(invalid)?;
        let mask = (mask_word & 0xFF) as u8;

        let semantic_name = read::cstr(bytes, name_offset as usize, &what("semantic name"))
            .map_err(invalid)?
            .to_owned();

        elements.push(SignatureElement {
            semantic_name,
            semantic_index,
            register,
            system_value,
            component_type,
            mask,
        });
    }

    Ok(elements)
}
