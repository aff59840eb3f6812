//! Bounds-checked little-endian readers shared by the chunk parsers.
//!
//! Errors are plain context strings; callers wrap them with the identifier of
//! the chunk being parsed.

pub(crate) fn u32_le(bytes: &[u8], offset: usize, what: &str) -> Result<u32, String> {
    let end = offset
        .checked_add(4)
        .ok_or_else(|| format!("{what} offset overflows"))?;
    let slice = bytes
        .get(offset..end)
        .ok_or_else(|| format!("need 4 bytes for {what} at {offset}..{end}, chunk length is {}", bytes.len()))?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

pub(crate) fn u16_le(bytes: &[u8], offset: usize, what: &str) -> Result<u16, String> {
    let end = offset
        .checked_add(2)
        .ok_or_else(|| format!("{what} offset overflows"))?;
    let slice = bytes
        .get(offset..end)
        .ok_or_else(|| format!("need 2 bytes for {what} at {offset}..{end}, chunk length is {}", bytes.len()))?;
    Ok(u16::from_le_bytes([slice[0], slice[1]]))
}

pub(crate) fn cstr<'a>(bytes: &'a [u8], offset: usize, what: &str) -> Result<&'a str, String> {
    let tail = bytes
        .get(offset..)
        .ok_or_else(|| format!("{what} offset {offset} is outside chunk length {}", bytes.len()))?;
    let nul = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| format!("{what} at offset {offset} is missing a null terminator"))?;
    core::str::from_utf8(&tail[..nul])
        .map_err(|_| format!("{what} at offset {offset} is not valid UTF-8"))
}
