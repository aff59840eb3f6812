use pretty_assertions::assert_eq;

use crate::test_utils::{
    build_container, build_rdef_chunk, BindingSpec, BufferSpec, RdefSpec, TypeSpec, VariableSpec,
};
use crate::{parse_rdef_chunk, DxbcContainer, DxbcError, FourCC};

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[test]
fn minimal_chunk_with_one_binding() {
    // Hand-rolled chunk: no buffers, a single texture bound at t3.
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 0); // buffer count
    push_u32(&mut chunk, 0); // buffer offset
    push_u32(&mut chunk, 1); // binding count
    push_u32(&mut chunk, 28); // binding offset
    push_u32(&mut chunk, 0); // version
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 0); // creator offset

    push_u32(&mut chunk, 60); // name offset
    push_u32(&mut chunk, 2); // input type (texture)
    push_u32(&mut chunk, 5); // return type (float)
    push_u32(&mut chunk, 4); // dimension (2d)
    push_u32(&mut chunk, 0); // sample count
    push_u32(&mut chunk, 3); // bind point
    push_u32(&mut chunk, 1); // bind count
    push_u32(&mut chunk, 0); // flags

    chunk.extend_from_slice(b"tex0\0");

    let rdef = parse_rdef_chunk(&chunk).expect("chunk should parse");
    assert_eq!(rdef.creator, None);
    assert!(rdef.buffers.is_empty());
    assert_eq!(rdef.bindings.len(), 1);
    assert_eq!(rdef.bindings[0].name, "tex0");
    assert_eq!(rdef.bindings[0].bind_point, 3);
    assert_eq!(rdef.bindings[0].bind_count, 1);
    assert_eq!(rdef.bindings[0].register_space, 0);
}

#[test]
fn builder_chunk_with_cbuffer_roundtrips() {
    let spec = RdefSpec::new()
        .with_buffer(
            BufferSpec::cbuffer("Globals", 16).with_variable(VariableSpec::new(
                "color",
                0,
                16,
                TypeSpec::float_vector(4),
            )),
        )
        .with_binding(BindingSpec::cbuffer("Globals", 0));

    let rdef = parse_rdef_chunk(&build_rdef_chunk(&spec)).expect("chunk should parse");
    assert_eq!(rdef.buffers.len(), 1);

    let buffer = &rdef.buffers[0];
    assert_eq!(buffer.name, "Globals");
    assert_eq!(buffer.kind, 0);
    assert_eq!(buffer.size_in_bytes, 16);
    assert_eq!(buffer.variables.len(), 1);

    let color = &buffer.variables[0];
    assert_eq!(color.name, "color");
    assert_eq!(color.start_offset, 0);
    assert_eq!(color.ty.base_type, 3);
    assert_eq!(color.ty.rows, 1);
    assert_eq!(color.ty.columns, 4);
    assert!(color.ty.members.is_empty());
}

#[test]
fn nested_struct_types_parse_with_member_offsets() {
    let light = TypeSpec::structure(vec![
        ("direction", 0, TypeSpec::float_vector(3)),
        ("intensity", 16, TypeSpec::float_vector(1)),
    ]);
    let spec = RdefSpec::new()
        .with_buffer(
            BufferSpec::cbuffer("Lights", 96).with_variable(VariableSpec::new(
                "lights",
                0,
                96,
                light.array(3),
            )),
        )
        .with_binding(BindingSpec::cbuffer("Lights", 0));

    let rdef = parse_rdef_chunk(&build_rdef_chunk(&spec)).expect("chunk should parse");
    let ty = &rdef.buffers[0].variables[0].ty;
    assert_eq!(ty.class, 5);
    assert_eq!(ty.elements, 3);
    assert_eq!(ty.members.len(), 2);
    assert_eq!(ty.members[0].name, "direction");
    assert_eq!(ty.members[0].offset, 0);
    assert_eq!(ty.members[1].name, "intensity");
    assert_eq!(ty.members[1].offset, 16);
    assert_eq!(ty.members[1].ty.columns, 1);
}

#[test]
fn creator_string_is_parsed() {
    let mut spec = RdefSpec::new();
    spec.creator = Some("glaze-test".to_owned());
    let rdef = parse_rdef_chunk(&build_rdef_chunk(&spec)).expect("chunk should parse");
    assert_eq!(rdef.creator.as_deref(), Some("glaze-test"));
}

#[test]
fn sm50_variable_records_use_the_wide_layout() {
    let mut spec = RdefSpec::new()
        .with_buffer(
            BufferSpec::cbuffer("Globals", 16).with_variable(VariableSpec::new(
                "color",
                0,
                16,
                TypeSpec::float_vector(4),
            )),
        )
        .with_binding(BindingSpec::cbuffer("Globals", 0));
    spec.version = 5 << 8; // shader model 5.0

    let rdef = parse_rdef_chunk(&build_rdef_chunk(&spec)).expect("chunk should parse");
    assert_eq!(rdef.target.major, 5);
    assert_eq!(rdef.target.minor, 0);
    assert_eq!(rdef.buffers[0].variables[0].name, "color");
}

#[test]
fn sm51_binding_records_carry_a_register_space() {
    let mut spec = RdefSpec::new()
        .with_binding(BindingSpec::texture2d("gAlbedo", 0))
        .with_binding(BindingSpec::sampler("gSampler", 0));
    spec.version = (5 << 8) | 1; // shader model 5.1

    let rdef = parse_rdef_chunk(&build_rdef_chunk(&spec)).expect("chunk should parse");
    assert_eq!(rdef.target.minor, 1);
    assert_eq!(rdef.bindings.len(), 2);
    assert_eq!(rdef.bindings[0].register_space, 0);
    assert_eq!(rdef.bindings[1].name, "gSampler");
}

#[test]
fn truncated_header_is_rejected() {
    let err = parse_rdef_chunk(&[0u8; 4]).expect_err("truncated chunk must fail");
    assert!(matches!(err, DxbcError::InvalidChunk { .. }));
}

#[test]
fn name_without_terminator_is_rejected() {
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 0); // buffer count
    push_u32(&mut chunk, 0); // buffer offset
    push_u32(&mut chunk, 1); // binding count
    push_u32(&mut chunk, 28); // binding offset
    push_u32(&mut chunk, 0); // version
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 0); // creator offset

    push_u32(&mut chunk, 60); // name offset
    for _ in 0..7 {
        push_u32(&mut chunk, 0);
    }
    chunk.extend_from_slice(b"tex0"); // no NUL

    let err = parse_rdef_chunk(&chunk).expect_err("unterminated name must fail");
    assert!(err.to_string().contains("null terminator"), "{err}");
}

#[test]
fn self_referential_type_record_is_rejected() {
    // A struct type whose single member points back at the enclosing type
    // record. The traversal caps must stop this, not the stack.
    let mut chunk = Vec::new();
    push_u32(&mut chunk, 1); // buffer count
    push_u32(&mut chunk, 28); // buffer offset
    push_u32(&mut chunk, 0); // binding count
    push_u32(&mut chunk, 0); // binding offset
    push_u32(&mut chunk, 0); // version
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 0); // creator offset

    // Buffer record at 28.
    push_u32(&mut chunk, 104); // name offset
    push_u32(&mut chunk, 1); // variable count
    push_u32(&mut chunk, 52); // variable offset
    push_u32(&mut chunk, 16); // size
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 0); // kind

    // Variable record at 52.
    push_u32(&mut chunk, 106); // name offset
    push_u32(&mut chunk, 0); // start offset
    push_u32(&mut chunk, 16); // size
    push_u32(&mut chunk, 0); // flags
    push_u32(&mut chunk, 76); // type offset
    push_u32(&mut chunk, 0); // default-value offset

    // Type record at 76: struct with one member.
    push_u16(&mut chunk, 5); // class (struct)
    push_u16(&mut chunk, 0); // base type
    push_u16(&mut chunk, 0); // rows
    push_u16(&mut chunk, 0); // columns
    push_u16(&mut chunk, 0); // elements
    push_u16(&mut chunk, 1); // member count
    push_u32(&mut chunk, 92); // member table offset

    // Member record at 92, pointing back at the type record.
    push_u32(&mut chunk, 108); // name offset
    push_u32(&mut chunk, 76); // type offset (cycle)
    push_u32(&mut chunk, 0); // member offset

    // Strings at 104.
    chunk.extend_from_slice(b"C\0");
    chunk.extend_from_slice(b"v\0");
    chunk.extend_from_slice(b"m\0");

    let err = parse_rdef_chunk(&chunk).expect_err("type cycle must fail");
    assert!(err.to_string().contains("nesting exceeds"), "{err}");
}

#[test]
fn container_falls_back_to_rd11_chunk_id() {
    let spec = RdefSpec::new().with_binding(BindingSpec::texture2d("tex0", 3));
    let payload = build_rdef_chunk(&spec);

    let bytes = build_container(&[(FourCC(*b"RD11"), &payload)]);
    let container = DxbcContainer::parse(&bytes).expect("container should parse");

    let rdef = container.rdef().expect("RD11 should satisfy rdef()");
    assert_eq!(rdef.bindings.len(), 1);
    assert_eq!(rdef.bindings[0].bind_point, 3);
}

#[test]
fn container_skips_malformed_duplicate_rdef_chunks() {
    let bad = [0u8; 4];
    let spec = RdefSpec::new().with_binding(BindingSpec::texture2d("tex0", 3));
    let good = build_rdef_chunk(&spec);

    let bytes = build_container(&[(FourCC(*b"RDEF"), &bad), (FourCC(*b"RDEF"), &good)]);
    let container = DxbcContainer::parse(&bytes).expect("container should parse");

    let rdef = container.rdef().expect("second RDEF should win");
    assert_eq!(rdef.bindings[0].name, "tex0");
}

#[test]
fn container_without_rdef_reports_a_missing_chunk() {
    let bytes = build_container(&[(FourCC(*b"SHEX"), &[0u8; 8])]);
    let container = DxbcContainer::parse(&bytes).expect("container should parse");
    assert!(matches!(container.rdef(), Err(DxbcError::MissingChunk(_))));
}
