/// Scalar category reported by a backend for a leaf type node.
///
/// This is the driver-side vocabulary; [`VariableType::classify`] combines it
/// with the reported row/column counts to produce the engine-side type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    /// An opaque GPU address.
    GpuPtr,
    /// A scalar category this engine does not model, carrying the backend's raw code.
    Unknown(u32),
}

/// The type of a flattened leaf variable inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    Bool,
    Bool2,
    Bool3,
    Bool4,
    Int,
    Int2,
    Int3,
    Int4,
    Uint,
    Uint2,
    Uint3,
    Uint4,
    Float,
    Float2,
    Float3,
    Float4,
    Float2x2,
    Float2x3,
    Float2x4,
    Float3x2,
    Float3x3,
    Float3x4,
    Float4x2,
    Float4x3,
    Float4x4,
    GpuPtr,
    /// Error sentinel; never produced by a successful reflection pass.
    Unknown,
}

impl VariableType {
    /// Maps a backend-reported `(scalar kind, rows, columns)` triple onto the
    /// closed type enumeration.
    ///
    /// Bool/int/uint values are vectors only (one row, 1..=4 columns). Float
    /// values are vectors with one row or matrices with 2..=4 rows and 2..=4
    /// columns. Returns `None` for any other combination; callers treat that as
    /// an unsupported leaf encoding, not a user error.
    pub fn classify(kind: ScalarKind, rows: u32, columns: u32) -> Option<VariableType> {
        match kind {
            ScalarKind::Bool if rows == 1 => match columns {
                1 => Some(VariableType::Bool),
                2 => Some(VariableType::Bool2),
                3 => Some(VariableType::Bool3),
                4 => Some(VariableType::Bool4),
                _ => None,
            },
            ScalarKind::Int if rows == 1 => match columns {
                1 => Some(VariableType::Int),
                2 => Some(VariableType::Int2),
                3 => Some(VariableType::Int3),
                4 => Some(VariableType::Int4),
                _ => None,
            },
            ScalarKind::Uint if rows == 1 => match columns {
                1 => Some(VariableType::Uint),
                2 => Some(VariableType::Uint2),
                3 => Some(VariableType::Uint3),
                4 => Some(VariableType::Uint4),
                _ => None,
            },
            ScalarKind::Float => match (rows, columns) {
                (1, 1) => Some(VariableType::Float),
                (1, 2) => Some(VariableType::Float2),
                (1, 3) => Some(VariableType::Float3),
                (1, 4) => Some(VariableType::Float4),
                (2, 2) => Some(VariableType::Float2x2),
                (2, 3) => Some(VariableType::Float2x3),
                (2, 4) => Some(VariableType::Float2x4),
                (3, 2) => Some(VariableType::Float3x2),
                (3, 3) => Some(VariableType::Float3x3),
                (3, 4) => Some(VariableType::Float3x4),
                (4, 2) => Some(VariableType::Float4x2),
                (4, 3) => Some(VariableType::Float4x3),
                (4, 4) => Some(VariableType::Float4x4),
                _ => None,
            },
            ScalarKind::GpuPtr if rows <= 1 && columns <= 1 => Some(VariableType::GpuPtr),
            _ => None,
        }
    }

    /// Number of 16-byte vector registers a single value of this type spans.
    pub fn row_count(self) -> u32 {
        match self {
            VariableType::Unknown => 0,
            VariableType::Bool
            | VariableType::Bool2
            | VariableType::Bool3
            | VariableType::Bool4
            | VariableType::Int
            | VariableType::Int2
            | VariableType::Int3
            | VariableType::Int4
            | VariableType::Uint
            | VariableType::Uint2
            | VariableType::Uint3
            | VariableType::Uint4
            | VariableType::Float
            | VariableType::Float2
            | VariableType::Float3
            | VariableType::Float4
            | VariableType::GpuPtr => 1,
            VariableType::Float2x2 | VariableType::Float2x3 | VariableType::Float2x4 => 2,
            VariableType::Float3x2 | VariableType::Float3x3 | VariableType::Float3x4 => 3,
            VariableType::Float4x2 | VariableType::Float4x3 | VariableType::Float4x4 => 4,
        }
    }

    /// Components per row.
    pub fn column_count(self) -> u32 {
        match self {
            VariableType::Unknown => 0,
            VariableType::Bool
            | VariableType::Int
            | VariableType::Uint
            | VariableType::Float
            | VariableType::GpuPtr => 1,
            VariableType::Bool2
            | VariableType::Int2
            | VariableType::Uint2
            | VariableType::Float2
            | VariableType::Float2x2
            | VariableType::Float3x2
            | VariableType::Float4x2 => 2,
            VariableType::Bool3
            | VariableType::Int3
            | VariableType::Uint3
            | VariableType::Float3
            | VariableType::Float2x3
            | VariableType::Float3x3
            | VariableType::Float4x3 => 3,
            VariableType::Bool4
            | VariableType::Int4
            | VariableType::Uint4
            | VariableType::Float4
            | VariableType::Float2x4
            | VariableType::Float3x4
            | VariableType::Float4x4 => 4,
        }
    }

    /// Unrounded byte span of a single value: every row but the last occupies a
    /// full 16-byte register, the last row occupies only its components.
    pub fn byte_size(self) -> usize {
        match self {
            VariableType::Unknown => 0,
            VariableType::GpuPtr => 8,
            _ => {
                let rows = self.row_count() as usize;
                let columns = self.column_count() as usize;
                (rows - 1) * 16 + columns * 4
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_vectors_and_matrices() {
        assert_eq!(
            VariableType::classify(ScalarKind::Float, 1, 4),
            Some(VariableType::Float4)
        );
        assert_eq!(
            VariableType::classify(ScalarKind::Float, 3, 4),
            Some(VariableType::Float3x4)
        );
        assert_eq!(
            VariableType::classify(ScalarKind::Uint, 1, 1),
            Some(VariableType::Uint)
        );
        assert_eq!(
            VariableType::classify(ScalarKind::Bool, 1, 3),
            Some(VariableType::Bool3)
        );
    }

    #[test]
    fn classify_rejects_unsupported_layouts() {
        // Integer matrices are not part of the closed enumeration.
        assert_eq!(VariableType::classify(ScalarKind::Int, 2, 2), None);
        // 1xN float "matrices" with N rows collapse to vectors; a 5-column row
        // has no representation.
        assert_eq!(VariableType::classify(ScalarKind::Float, 1, 5), None);
        assert_eq!(VariableType::classify(ScalarKind::Unknown(17), 1, 1), None);
    }

    #[test]
    fn byte_size_spans_rows() {
        assert_eq!(VariableType::Float.byte_size(), 4);
        assert_eq!(VariableType::Float3.byte_size(), 12);
        assert_eq!(VariableType::Float4.byte_size(), 16);
        // Two full rows plus a trailing 3-component row.
        assert_eq!(VariableType::Float3x3.byte_size(), 44);
        assert_eq!(VariableType::Float4x4.byte_size(), 64);
        assert_eq!(VariableType::GpuPtr.byte_size(), 8);
    }
}
