//! Byte-level builders for UEFormat test files.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Little-endian writer for headers, sections and bodies.
#[derive(Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.write_u8(v).unwrap();
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.write_i16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32s(mut self, values: &[f32]) -> Self {
        for v in values {
            self.0.write_f32::<LittleEndian>(*v).unwrap();
        }
        self
    }

    pub fn i32s(mut self, values: &[i32]) -> Self {
        for v in values {
            self.0.write_i32::<LittleEndian>(*v).unwrap();
        }
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn string(self, s: &str) -> Self {
        self.i32(s.len() as i32).raw(s.as_bytes())
    }

    /// Section header followed by its body.
    pub fn section(self, name: &str, count: i32, body: Bytes) -> Self {
        self.string(name).i32(count).i32(body.0.len() as i32).raw(&body.0)
    }

    /// LOD entry: name, byte size, then the LOD section stream.
    pub fn lod(self, name: &str, sections: Bytes) -> Self {
        self.string(name).i32(sections.0.len() as i32).raw(&sections.0)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

/// File header.
pub fn header(identifier: &str, version: u8, object_name: &str, compressed: bool) -> Bytes {
    Bytes::new()
        .raw(b"UEFORMAT")
        .string(identifier)
        .u8(version)
        .string(object_name)
        .u8(compressed as u8)
}

/// Uncompressed model file with the given model-level sections.
pub fn model_file(sections: Bytes) -> Vec<u8> {
    header("UEMODEL", 5, "SM_Test", false).raw(&sections.0).into_vec()
}

/// One LOD with a single triangle, positions in engine units.
pub fn triangle_lod_sections() -> Bytes {
    Bytes::new()
        .section(
            "VERTICES",
            3,
            Bytes::new().f32s(&[0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 100.0, 0.0]),
        )
        .section("INDICES", 3, Bytes::new().i32s(&[0, 1, 2]))
}

/// `LODS` section holding the given LODs.
pub fn lods(entries: &[(&str, Bytes)]) -> Bytes {
    let mut body = Bytes::new();
    for (name, sections) in entries {
        body = body.lod(name, Bytes(sections.0.clone()));
    }
    Bytes::new().section("LODS", entries.len() as i32, body)
}

/// Compress a section stream with gzip.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Compressed model file: header, codec, sizes, compressed bytes.
pub fn compressed_model_file(codec: &str, sections: &[u8], compressed: &[u8]) -> Vec<u8> {
    header("UEMODEL", 5, "SM_Packed", true)
        .string(codec)
        .i32(sections.len() as i32)
        .i32(compressed.len() as i32)
        .raw(compressed)
        .into_vec()
}
