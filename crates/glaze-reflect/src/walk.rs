//! Flattening of compiler type trees into per-buffer variable maps.

use std::collections::BTreeMap;

use crate::backend::TypeNode;
use crate::error::ReflectError;
use crate::types::VariableType;

/// One flattened leaf variable inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub ty: VariableType,
    /// Byte offset within the owning buffer.
    pub location: usize,
    /// Array element count; 0 when the variable is not an array.
    pub array_size: u32,
    /// Byte distance between consecutive array elements; 0 when not an array.
    pub array_stride: usize,
    /// Matrix storage order; meaningful for matrix types only.
    pub is_row_major: bool,
}

/// Fully-qualified variable name → flattened variable.
///
/// Names use dotted struct-member paths and bracketed array indices, e.g.
/// `lights[2].intensity`. Names are unique within one buffer.
pub type VariableMap = BTreeMap<String, Variable>;

/// Recursively flattens `node` into `map` under `name`, with every produced
/// offset shifted by `base_offset`.
///
/// Structs are expanded member-by-member; an array-of-struct node is expanded
/// once per element, with element `i` shifted by `i` times the struct's
/// footprint (see [`struct_size`]). Only leaf scalars/vectors/matrices land in
/// the map.
pub fn flatten_type(
    node: &dyn TypeNode,
    map: &mut VariableMap,
    name: &str,
    base_offset: usize,
) -> Result<(), ReflectError> {
    let offset = base_offset + node.offset();

    if node.is_struct() {
        // Flatten the members once at offset 0 to learn the footprint of a
        // single element before laying out the real (possibly arrayed) copies.
        let mut scratch = VariableMap::new();
        for index in 0..node.member_count() {
            let (member_name, member) = member_of(node, name, index)?;
            flatten_type(member.as_ref(), &mut scratch, member_name, 0)?;
        }
        let footprint = struct_size(&scratch);

        for index in 0..node.member_count() {
            let (member_name, member) = member_of(node, name, index)?;
            if node.element_count() > 0 {
                for element in 0..node.element_count() {
                    flatten_type(
                        member.as_ref(),
                        map,
                        &format!("{name}[{element}].{member_name}"),
                        offset + footprint * element as usize,
                    )?;
                }
            } else {
                flatten_type(member.as_ref(), map, &format!("{name}.{member_name}"), offset)?;
            }
        }
        return Ok(());
    }

    let kind = node.scalar_kind();
    let (rows, columns) = (node.rows(), node.columns());
    let ty = VariableType::classify(kind, rows, columns).ok_or_else(|| {
        ReflectError::UnsupportedLeafLayout {
            name: name.to_owned(),
            kind,
            rows,
            columns,
        }
    })?;

    let array_size = node.element_count();
    map.insert(
        name.to_owned(),
        Variable {
            ty,
            location: offset,
            array_size,
            array_stride: if array_size > 0 {
                ty.row_count() as usize * 16
            } else {
                0
            },
            is_row_major: node.is_row_major(),
        },
    );
    Ok(())
}

fn member_of<'a>(
    node: &'a dyn TypeNode,
    name: &str,
    index: u32,
) -> Result<(&'a str, Box<dyn TypeNode + 'a>), ReflectError> {
    let missing = || ReflectError::MalformedTypeTree {
        name: name.to_owned(),
        index,
    };
    let member_name = node.member_name(index).ok_or_else(missing)?;
    let member = node.member_at(index).ok_or_else(missing)?;
    Ok((member_name, member))
}

/// Byte footprint of one struct instance, given its flattened member map with
/// offsets relative to 0.
///
/// The trailing member always pads out to whole 16-byte rows (`row_count * 16`),
/// regardless of its column count: each row of a value occupies one vector
/// register in the target buffer ABI, and downstream GPU-side layouts depend on
/// this rule bit-for-bit. When every member sits at offset 0 the footprint is
/// the max-offset member's unrounded byte span.
pub fn struct_size(map: &VariableMap) -> usize {
    let mut last: Option<&Variable> = None;
    for var in map.values() {
        if last.map_or(true, |best| var.location > best.location) {
            last = Some(var);
        }
    }
    match last {
        None => 0,
        Some(var) if var.location == 0 => var.ty.byte_size(),
        Some(var) => var.location + var.ty.row_count() as usize * 16,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::HostType;
    use crate::types::ScalarKind;

    fn flatten(ty: &HostType, name: &str) -> VariableMap {
        let mut map = VariableMap::new();
        flatten_type(ty, &mut map, name, 0).expect("flatten should succeed");
        map
    }

    #[test]
    fn leaf_vector_lands_at_base_offset() {
        let mut map = VariableMap::new();
        let ty = HostType::vector(ScalarKind::Float, 4);
        flatten_type(&ty, &mut map, "color", 32).unwrap();

        let var = map.get("color").expect("missing variable");
        assert_eq!(var.ty, VariableType::Float4);
        assert_eq!(var.location, 32);
        assert_eq!(var.array_size, 0);
        assert_eq!(var.array_stride, 0);
    }

    #[test]
    fn leaf_array_records_stride() {
        let map = flatten(&HostType::matrix(4, 4, true).array(3), "bones");
        let var = map.get("bones").unwrap();
        assert_eq!(var.ty, VariableType::Float4x4);
        assert_eq!(var.array_size, 3);
        assert_eq!(var.array_stride, 64);
        assert!(var.is_row_major);
    }

    #[test]
    fn struct_members_get_dotted_names() {
        let ty = HostType::structure(vec![
            ("direction", HostType::vector(ScalarKind::Float, 3)),
            ("intensity", HostType::scalar(ScalarKind::Float).at_offset(16)),
        ]);
        let map = flatten(&ty, "light");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("light.direction").unwrap().location, 0);
        assert_eq!(map.get("light.intensity").unwrap().location, 16);
    }

    #[test]
    fn struct_array_elements_step_by_footprint() {
        // Footprint of one element: intensity at 16 is the max-offset member,
        // so 16 + 1 row * 16 = 32 bytes.
        let element = HostType::structure(vec![
            ("direction", HostType::vector(ScalarKind::Float, 3)),
            ("intensity", HostType::scalar(ScalarKind::Float).at_offset(16)),
        ]);
        let map = flatten(&element.array(3), "lights");

        assert_eq!(map.len(), 6);
        for (element, base) in [(0usize, 0usize), (1, 32), (2, 64)] {
            assert_eq!(
                map.get(&format!("lights[{element}].direction")).unwrap().location,
                base
            );
            assert_eq!(
                map.get(&format!("lights[{element}].intensity")).unwrap().location,
                base + 16
            );
        }
    }

    #[test]
    fn nested_struct_offsets_accumulate() {
        let inner = HostType::structure(vec![(
            "value",
            HostType::vector(ScalarKind::Float, 4),
        )]);
        let outer = HostType::structure(vec![
            ("head", HostType::vector(ScalarKind::Float, 4)),
            ("tail", inner.at_offset(16)),
        ]);
        let mut map = VariableMap::new();
        flatten_type(&outer, &mut map, "data", 64).unwrap();

        assert_eq!(map.get("data.head").unwrap().location, 64);
        assert_eq!(map.get("data.tail.value").unwrap().location, 80);
    }

    #[test]
    fn unsupported_leaf_is_an_error() {
        let mut map = VariableMap::new();
        let err = flatten_type(
            &HostType::raw_leaf(ScalarKind::Int, 2, 2),
            &mut map,
            "bad",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ReflectError::UnsupportedLeafLayout { .. }));
        assert!(map.is_empty());
    }

    #[test]
    fn struct_size_rounds_tail_to_whole_rows() {
        let map = flatten(
            &HostType::structure(vec![
                ("a", HostType::vector(ScalarKind::Float, 4)),
                ("b", HostType::vector(ScalarKind::Float, 3).at_offset(16)),
            ]),
            "s",
        );
        // Max offset 16, trailing float3 still pads to a full register row.
        assert_eq!(struct_size(&map), 32);
    }

    #[test]
    fn struct_size_with_matrix_tail_counts_all_rows() {
        let map = flatten(
            &HostType::structure(vec![
                ("a", HostType::vector(ScalarKind::Float, 4)),
                ("m", HostType::matrix(3, 3, false).at_offset(16)),
            ]),
            "s",
        );
        assert_eq!(struct_size(&map), 16 + 3 * 16);
    }

    #[test]
    fn struct_size_at_zero_offset_is_unrounded() {
        let map = flatten(
            &HostType::structure(vec![("only", HostType::vector(ScalarKind::Float, 3))]),
            "s",
        );
        assert_eq!(struct_size(&map), 12);
    }

    #[test]
    fn struct_size_of_empty_map_is_zero() {
        assert_eq!(struct_size(&VariableMap::new()), 0);
    }
}
