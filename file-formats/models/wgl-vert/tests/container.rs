//! Container-level reading and writing

use pretty_assertions::assert_eq;
use std::io::Cursor;
use wgl_vert::{LumpKind, VertexFormat, WglError, WglVertFile};

fn header(magic: &[u8; 4], version: u32, lumps: &[(&[u8; 4], u32, u32)]) -> Vec<u8> {
    let mut data = magic.to_vec();
    data.extend_from_slice(&version.to_le_bytes());
    data.extend_from_slice(&(lumps.len() as u32).to_le_bytes());
    for (tag, offset, length) in lumps {
        data.extend_from_slice(*tag);
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&length.to_le_bytes());
    }
    data
}

#[test]
fn round_trip_through_file() {
    let vertices: Vec<f32> = (0..33).map(|i| i as f32).collect();
    let file = WglVertFile::from_floats(VertexFormat::SKINNED, &vertices, &[0, 1, 2]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strip.wglvert");
    file.save(&path).unwrap();

    let loaded = WglVertFile::open(&path).unwrap();
    assert_eq!(loaded, file);
    assert_eq!(loaded.vertex_count(), 3);
    assert_eq!(loaded.vertex_floats(), vertices);
}

#[test]
fn write_to_stream_matches_to_bytes() {
    let file = WglVertFile::from_floats(VertexFormat::POSITION, &[1.0, 2.0, 3.0], &[0, 0, 0]);
    let mut out = Vec::new();
    file.write(&mut out).unwrap();
    assert_eq!(out, file.to_bytes().unwrap());

    let decoded = WglVertFile::read(&mut Cursor::new(out)).unwrap();
    assert_eq!(decoded, file);
}

#[test]
fn bad_magic_is_rejected() {
    let data = header(b"wglx", 1, &[]);
    let err = WglVertFile::from_bytes(&data).unwrap_err();
    assert!(matches!(err, WglError::InvalidMagic { ref found } if found == "wglx"));
}

#[test]
fn version_two_is_rejected() {
    let data = header(b"wglv", 2, &[]);
    assert!(matches!(
        WglVertFile::from_bytes(&data),
        Err(WglError::UnsupportedVersion(2))
    ));
}

#[test]
fn lump_past_end_is_rejected() {
    let data = header(b"wglv", 1, &[(b"vert", 24, 100)]);
    assert!(matches!(
        WglVertFile::from_bytes(&data),
        Err(WglError::LumpOutOfBounds { ref tag, .. }) if tag == "vert"
    ));
}

#[test]
fn unknown_lumps_and_reversed_order_are_accepted() {
    // indx before vert, with an unknown lump in between
    let mut data = header(
        b"wglv",
        0,
        &[(b"indx", 48, 6), (b"bone", 54, 2), (b"vert", 56, 20)],
    );
    for index in [2u16, 1, 0] {
        data.extend_from_slice(&index.to_le_bytes());
    }
    data.extend_from_slice(&[0xaa, 0xbb]);
    data.extend_from_slice(&VertexFormat::POSITION.bits().to_le_bytes());
    data.extend_from_slice(&12u32.to_le_bytes());
    for value in [1.0f32, 2.0, 3.0] {
        data.extend_from_slice(&value.to_le_bytes());
    }

    let file = WglVertFile::from_bytes(&data).unwrap();
    assert_eq!(file.version, 0);
    assert_eq!(file.indices, vec![2, 1, 0]);
    assert_eq!(file.format, VertexFormat::POSITION);
    assert_eq!(file.vertex_floats(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn missing_index_lump_is_reported() {
    let file = WglVertFile::from_floats(VertexFormat::POSITION, &[0.0; 3], &[]);
    let mut data = file.to_bytes().unwrap();
    // Rename the index lump so the reader no longer recognises it.
    let indx = file.directory().unwrap().get(LumpKind::Index).copied().unwrap();
    assert_eq!(indx.length, 0);
    data[24..28].copy_from_slice(b"junk");
    assert!(matches!(
        WglVertFile::from_bytes(&data),
        Err(WglError::MissingLump("indx"))
    ));
}
