//! Parser for DXBC resource-definition chunks (`RDEF`).
//!
//! The `RDEF` chunk carries everything a stage declares about its constant
//! buffers (including the recursive type records behind each variable) and its
//! resource-binding table. All record fields are kept raw (`u32` codes); the
//! adapter maps them onto the engine's vocabulary.

use core::cell::Cell;

use crate::error::DxbcError;
use crate::fourcc::FourCC;
use crate::read;

const RDEF_HEADER_LEN: usize = 28;
const BUFFER_RECORD_LEN: usize = 24;
const VARIABLE_RECORD_LEN_SM4: usize = 24;
const VARIABLE_RECORD_LEN_SM5: usize = 40;
const RESOURCE_RECORD_LEN: usize = 32;
const RESOURCE_RECORD_LEN_SM51: usize = 40;
// Only the leading 16 bytes of a type record are layout-relevant; SM5 appends
// interface/name fields this parser does not consume.
const TYPE_RECORD_LEN: usize = 16;
const MEMBER_RECORD_LEN: usize = 12;

// Caps bound the work done on hostile counts; real shaders stay far below.
const MAX_RECORD_COUNT: u32 = 4096;
const MAX_TYPE_DEPTH: u32 = 32;
// Member tables reference type records by offset, so a small chunk can alias
// the same records from many members; the budget bounds total traversal work.
const MAX_TYPE_RECORDS: u32 = 65536;

/// Shader model and program type the chunk was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetVersion {
    /// Shader model major version.
    pub major: u8,
    /// Shader model minor version.
    pub minor: u8,
    /// Raw program type code.
    pub program_type: u16,
}

/// A parsed resource-definition chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefData {
    /// Shader model the chunk targets.
    pub target: TargetVersion,
    /// Compiler identification string, when present.
    pub creator: Option<String>,
    /// Constant/texture-buffer declarations, in record order.
    pub buffers: Vec<RdefBuffer>,
    /// Resource-binding-table entries, in record order.
    pub bindings: Vec<RdefBinding>,
}

/// One buffer declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefBuffer {
    /// Declared buffer name.
    pub name: String,
    /// Raw `D3D_CBUFFER_TYPE` code (0 = cbuffer, 1 = tbuffer).
    pub kind: u32,
    /// Declared size in bytes.
    pub size_in_bytes: u32,
    /// Top-level variables, in record order.
    pub variables: Vec<RdefVariable>,
}

/// One top-level variable of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefVariable {
    /// Declared variable name.
    pub name: String,
    /// Byte offset from the start of the buffer.
    pub start_offset: u32,
    /// Declared size in bytes.
    pub size_in_bytes: u32,
    /// Raw variable flags.
    pub flags: u32,
    /// The variable's type tree.
    pub ty: RdefType,
}

/// One type record, possibly a struct with members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefType {
    /// Raw `D3D_SHADER_VARIABLE_CLASS` code (2 = row-major matrix, 5 = struct).
    pub class: u32,
    /// Raw `D3D_SHADER_VARIABLE_TYPE` code (1 = bool, 2 = int, 3 = float, 19 = uint).
    pub base_type: u32,
    /// Matrix rows (1 for vectors).
    pub rows: u32,
    /// Vector/matrix columns.
    pub columns: u32,
    /// Array element count; 0 when not an array.
    pub elements: u32,
    /// Struct members; empty for leaves.
    pub members: Vec<RdefTypeMember>,
}

/// One member of a struct type record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefTypeMember {
    /// Declared member name.
    pub name: String,
    /// Byte offset from the start of the enclosing struct.
    pub offset: u32,
    /// The member's type tree.
    pub ty: RdefType,
}

/// One entry of the resource-binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdefBinding {
    /// Declared binding name.
    pub name: String,
    /// Raw `D3D_SHADER_INPUT_TYPE` code (0 = cbuffer, 1 = tbuffer, 2 = texture, 3 = sampler).
    pub input_type: u32,
    /// Raw `D3D_RESOURCE_RETURN_TYPE` code.
    pub return_type: u32,
    /// Raw `D3D_SRV_DIMENSION` code.
    pub dimension: u32,
    /// Declared multisample count.
    pub sample_count: u32,
    /// First register slot the binding occupies.
    pub bind_point: u32,
    /// Number of consecutive slots the binding occupies.
    pub bind_count: u32,
    /// Raw binding flags.
    pub flags: u32,
    /// Register space; 0 for shader models below 5.1, which have none.
    pub register_space: u32,
}

/// Parses an `RDEF` chunk payload.
pub fn parse_rdef_chunk(bytes: &[u8]) -> Result<RdefData, DxbcError> {
    parse_rdef_chunk_with_fourcc(FourCC(*b"RDEF"), bytes)
}

/// Parses an `RDEF`-style chunk payload, attributing errors to `fourcc`.
pub fn parse_rdef_chunk_with_fourcc(fourcc: FourCC, bytes: &[u8]) -> Result<RdefData, DxbcError> {
    Parser {
        fourcc,
        bytes,
        type_records: Cell::new(0),
    }
    .parse()
}

struct Parser<'a> {
    fourcc: FourCC,
    bytes: &'a [u8],
    type_records: Cell<u32>,
}

impl<'a> Parser<'a> {
    fn parse(&self) -> Result<RdefData, DxbcError> {
        let buffer_count = self.u32(0, "buffer count")?;
        let buffer_offset = self.u32(4, "buffer offset")?;
        let binding_count = self.u32(8, "binding count")?;
        let binding_offset = self.u32(12, "binding offset")?;
        let version = self.u32(16, "target version")?;
        let _flags = self.u32(20, "flags")?;
        let creator_offset = self.u32(24, "creator offset")?;

        let target = TargetVersion {
            major: ((version >> 8) & 0xFF) as u8,
            minor: (version & 0xFF) as u8,
            program_type: (version >> 16) as u16,
        };

        self.check_count(buffer_count, "buffer count")?;
        self.check_count(binding_count, "binding count")?;

        let creator = if creator_offset != 0 {
            Some(self.cstr(creator_offset as usize, "creator")?.to_owned())
        } else {
            None
        };

        let variable_record_len = if target.major >= 5 {
            VARIABLE_RECORD_LEN_SM5
        } else {
            VARIABLE_RECORD_LEN_SM4
        };
        let resource_record_len = if target.major > 5 || (target.major == 5 && target.minor >= 1) {
            RESOURCE_RECORD_LEN_SM51
        } else {
            RESOURCE_RECORD_LEN
        };

        let mut bindings = Vec::with_capacity(binding_count as usize);
        for index in 0..binding_count as usize {
            let record = binding_offset as usize + index * resource_record_len;
            bindings.push(self.parse_binding(record, resource_record_len, index)?);
        }

        let mut buffers = Vec::with_capacity(buffer_count as usize);
        for index in 0..buffer_count as usize {
            let record = buffer_offset as usize + index * BUFFER_RECORD_LEN;
            buffers.push(self.parse_buffer(record, variable_record_len, index)?);
        }

        Ok(RdefData {
            target,
            creator,
            buffers,
            bindings,
        })
    }

    fn parse_binding(
        &self,
        record: usize,
        record_len: usize,
        index: usize,
    ) -> Result<RdefBinding, DxbcError> {
        let what = |field: &str| format!("binding {index} {field}");
        let name_offset = self.u32(record, &what("name offset"))?;
        let binding = RdefBinding {
            name: self.cstr(name_offset as usize, &what("name"))?.to_owned(),
            input_type: self.u32(record + 4, &what("input type"))?,
            return_type: self.u32(record + 8, &what("return type"))?,
            dimension: self.u32(record + 12, &what("dimension"))?,
            sample_count: self.u32(record + 16, &what("sample count"))?,
            bind_point: self.u32(record + 20, &what("bind point"))?,
            bind_count: self.u32(record + 24, &what("bind count"))?,
            flags: self.u32(record + 28, &what("flags"))?,
            register_space: if record_len == RESOURCE_RECORD_LEN_SM51 {
                self.u32(record + 32, &what("register space"))?
            } else {
                0
            },
        };
        Ok(binding)
    }

    fn parse_buffer(
        &self,
        record: usize,
        variable_record_len: usize,
        index: usize,
    ) -> Result<RdefBuffer, DxbcError> {
        let what = |field: &str| format!("buffer {index} {field}");
        let name_offset = self.u32(record, &what("name offset"))?;
        let variable_count = self.u32(record + 4, &what("variable count"))?;
        let variable_offset = self.u32(record + 8, &what("variable offset"))?;
        let size_in_bytes = self.u32(record + 12, &what("size"))?;
        let _flags = self.u32(record + 16, &what("flags"))?;
        let kind = self.u32(record + 20, &what("kind"))?;

        self.check_count(variable_count, &what("variable count"))?;

        let mut variables = Vec::with_capacity(variable_count as usize);
        for var_index in 0..variable_count as usize {
            let var_record = variable_offset as usize + var_index * variable_record_len;
            variables.push(self.parse_variable(var_record, index, var_index)?);
        }

        Ok(RdefBuffer {
            name: self.cstr(name_offset as usize, &what("name"))?.to_owned(),
            kind,
            size_in_bytes,
            variables,
        })
    }

    fn parse_variable(
        &self,
        record: usize,
        buffer_index: usize,
        index: usize,
    ) -> Result<RdefVariable, DxbcError> {
        let what = |field: &str| format!("buffer {buffer_index} variable {index} {field}");
        let name_offset = self.u32(record, &what("name offset"))?;
        let start_offset = self.u32(record + 4, &what("start offset"))?;
        let size_in_bytes = self.u32(record + 8, &what("size"))?;
        let flags = self.u32(record + 12, &what("flags"))?;
        let type_offset = self.u32(record + 16, &what("type offset"))?;
        // Default-value offset at +20 and the SM5 texture/sampler ranges are
        // not consumed.

        Ok(RdefVariable {
            name: self.cstr(name_offset as usize, &what("name"))?.to_owned(),
            start_offset,
            size_in_bytes,
            flags,
            ty: self.parse_type(type_offset as usize, &what("type"), 0)?,
        })
    }

    fn parse_type(&self, record: usize, what: &str, depth: u32) -> Result<RdefType, DxbcError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(DxbcError::invalid_chunk(
                self.fourcc,
                format!("{what}: type nesting exceeds maximum depth {MAX_TYPE_DEPTH}"),
            ));
        }
        let visited = self.type_records.get() + 1;
        if visited > MAX_TYPE_RECORDS {
            return Err(DxbcError::invalid_chunk(
                self.fourcc,
                format!("{what}: chunk references more than {MAX_TYPE_RECORDS} type records"),
            ));
        }
        self.type_records.set(visited);
        if record + TYPE_RECORD_LEN > self.bytes.len() {
            return Err(DxbcError::invalid_chunk(
                self.fourcc,
                format!(
                    "{what}: type record at {record} is outside chunk length {}",
                    self.bytes.len()
                ),
            ));
        }

        let class = self.u16(record, what)? as u32;
        let base_type = self.u16(record + 2, what)? as u32;
        let rows = self.u16(record + 4, what)? as u32;
        let columns = self.u16(record + 6, what)? as u32;
        let elements = self.u16(record + 8, what)? as u32;
        let member_count = self.u16(record + 10, what)? as u32;
        let member_offset = self.u32(record + 12, what)?;

        self.check_count(member_count, what)?;

        let mut members = Vec::with_capacity(member_count as usize);
        for index in 0..member_count as usize {
            let member_record = member_offset as usize + index * MEMBER_RECORD_LEN;
            let member_what = format!("{what} member {index}");
            let name_offset = self.u32(member_record, &member_what)?;
            let type_offset = self.u32(member_record + 4, &member_what)?;
            let offset = self.u32(member_record + 8, &member_what)?;
            members.push(RdefTypeMember {
                name: self.cstr(name_offset as usize, &member_what)?.to_owned(),
                offset,
                ty: self.parse_type(type_offset as usize, &member_what, depth + 1)?,
            });
        }

        Ok(RdefType {
            class,
            base_type,
            rows,
            columns,
            elements,
            members,
        })
    }

    fn check_count(&self, count: u32, what: &str) -> Result<(), DxbcError> {
        if count > MAX_RECORD_COUNT {
            return Err(DxbcError::invalid_chunk(
                self.fourcc,
                format!("{what} {count} exceeds maximum {MAX_RECORD_COUNT}"),
            ));
        }
        Ok(())
    }

    fn u32(&self, offset: usize, what: &str) -> Result<u32, DxbcError> {
        read::u32_le(self.bytes, offset, what)
            .map_err(|context| DxbcError::invalid_chunk(self.fourcc, context))
    }

    fn u16(&self, offset: usize, what: &str) -> Result<u16, DxbcError> {
        read::u16_le(self.bytes, offset, what)
            .map_err(|context| DxbcError::invalid_chunk(self.fourcc, context))
    }

    fn cstr(&self, offset: usize, what: &str) -> Result<&'a str, DxbcError> {
        read::cstr(self.bytes, offset, what)
            .map_err(|context| DxbcError::invalid_chunk(self.fourcc, context))
    }
}
