//! Unit tests for SPIR-V blob validation and shader paths

use super::*;

fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

// ============================================================================
// SPIR-V PARSING
// ============================================================================

#[test]
fn test_parse_spirv_accepts_valid_header() {
    let bytes = words_to_bytes(&[SPIRV_MAGIC, 0x0001_0000, 0, 8, 0]);
    let words = parse_spirv("ok.spv", &bytes).unwrap();

    assert_eq!(words.len(), 5);
    assert_eq!(words[0], SPIRV_MAGIC);
}

#[test]
fn test_parse_spirv_accepts_byte_swapped_module() {
    let bytes: Vec<u8> = [SPIRV_MAGIC, 0x0001_0000]
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .collect();
    let words = parse_spirv("swapped.spv", &bytes).unwrap();

    assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
}

#[test]
fn test_parse_spirv_rejects_unaligned_size() {
    let mut bytes = words_to_bytes(&[SPIRV_MAGIC, 0]);
    bytes.push(0);

    assert!(matches!(parse_spirv("odd.spv", &bytes), Err(Error::InvalidResource(_))));
}

#[test]
fn test_parse_spirv_rejects_bad_magic() {
    let bytes = words_to_bytes(&[0xDEAD_BEEF, 0]);
    let err = parse_spirv("bad.spv", &bytes).unwrap_err();

    assert!(err.to_string().contains("bad SPIR-V magic"));
}

#[test]
fn test_parse_spirv_rejects_empty_blob() {
    assert!(matches!(parse_spirv("empty.spv", &[]), Err(Error::InvalidResource(_))));
}

// ============================================================================
// PATHS
// ============================================================================

#[test]
fn test_shader_paths_per_payload() {
    let dir = Path::new("shaders");

    let (vert, frag) = shader_paths(dir, Payload::TexturedQuad);
    assert_eq!(vert, Path::new("shaders/quad.vert.spv"));
    assert_eq!(frag, Path::new("shaders/quad.frag.spv"));

    let (vert, frag) = shader_paths(dir, Payload::Triangle);
    assert_eq!(vert, Path::new("shaders/triangle.vert.spv"));
    assert_eq!(frag, Path::new("shaders/triangle.frag.spv"));
}
