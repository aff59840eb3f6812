use pretty_assertions::assert_eq;

use crate::test_utils::{build_container, build_signature_chunk};
use crate::{parse_signature_chunk, parse_signature_chunk_with_fourcc, DxbcContainer, FourCC};

#[test]
fn v0_chunk_roundtrips() {
    let chunk = build_signature_chunk(&[
        ("POSITION", 0, 0, 3, 0b0111),
        ("TEXCOORD", 1, 1, 3, 0b0011),
    ]);

    let signature = parse_signature_chunk(&chunk).expect("chunk should parse");
    assert_eq!(signature.elements.len(), 2);

    assert_eq!(signature.elements[0].semantic_name, "POSITION");
    assert_eq!(signature.elements[0].semantic_index, 0);
    assert_eq!(signature.elements[0].register, 0);
    assert_eq!(signature.elements[0].mask, 0b0111);

    assert_eq!(signature.elements[1].semantic_name, "TEXCOORD");
    assert_eq!(signature.elements[1].semantic_index, 1);
    assert_eq!(signature.elements[1].register, 1);
}

#[test]
fn empty_signature_parses() {
    let chunk = build_signature_chunk(&[]);
    let signature = parse_signature_chunk(&chunk).expect("empty chunk should parse");
    assert!(signature.elements.is_empty());
}

#[test]
fn v1_entries_parse_under_the_isg1_id() {
    // 32-byte entry layout: mask/rw-mask bytes followed by stream and
    // min-precision DWORDs.
    let mut chunk = Vec::new();
    chunk.extend_from_slice(&1u32.to_le_bytes()); // element count
    chunk.extend_from_slice(&8u32.to_le_bytes()); // element offset

    chunk.extend_from_slice(&40u32.to_le_bytes()); // name offset (after entry)
    chunk.extend_from_slice(&0u32.to_le_bytes()); // semantic index
    chunk.extend_from_slice(&0u32.to_le_bytes()); // system value
    chunk.extend_from_slice(&3u32.to_le_bytes()); // component type
    chunk.extend_from_slice(&2u32.to_le_bytes()); // register
    chunk.push(0b1111); // mask
    chunk.push(0b1111); // read/write mask
    chunk.extend_from_slice(&0u16.to_le_bytes()); // padding
    chunk.extend_from_slice(&0u32.to_le_bytes()); // stream
    chunk.extend_from_slice(&0u32.to_le_bytes()); // min precision
    chunk.extend_from_slice(b"COLOR\0");

    let signature = parse_signature_chunk_with_fourcc(FourCC(*b"ISG1"), &chunk)
        .expect("v1 chunk should parse");
    assert_eq!(signature.elements.len(), 1);
    assert_eq!(signature.elements[0].semantic_name, "COLOR");
    assert_eq!(signature.elements[0].register, 2);
    assert_eq!(signature.elements[0].mask, 0b1111);
}

#[test]
fn truncated_chunk_is_rejected() {
    let err = parse_signature_chunk(&[1, 0, 0]).expect_err("truncated chunk must fail");
    assert!(err.to_string().contains("element count"), "{err}");
}

#[test]
fn out_of_bounds_name_offset_is_rejected() {
    let mut chunk = build_signature_chunk(&[("POSITION", 0, 0, 3, 0b1111)]);
    // Corrupt the name offset to point far outside the chunk.
    chunk[8..12].copy_from_slice(&0xFFFF_u32.to_le_bytes());

    let err = parse_signature_chunk(&chunk).expect_err("bad name offset must fail");
    assert!(err.to_string().contains("semantic name"), "{err}");
}

#[test]
fn container_accepts_isg1_for_the_input_signature() {
    let chunk = build_signature_chunk(&[("POSITION", 0, 0, 3, 0b1111)]);
    let bytes = build_container(&[(FourCC(*b"ISG1"), &chunk)]);
    let container = DxbcContainer::parse(&bytes).expect("container should parse");

    let signature = container
        .input_signature()
        .expect("ISG1 should satisfy input_signature()")
        .expect("signature should parse");
    assert_eq!(signature.elements.len(), 1);
}

#[test]
fn container_without_signature_returns_none() {
    let bytes = build_container(&[(FourCC(*b"SHEX"), &[0u8; 8])]);
    let container = DxbcContainer::parse(&bytes).expect("container should parse");
    assert!(container.input_signature().is_none());
}
