//! Compression stage for UEFormat payloads.
//!
//! A compressed file stores, right after the header:
//!
//! ```text
//! CodecName:String UncompressedSize:i32 CompressedSize:i32 CompressedBytes[CompressedSize]
//! ```
//!
//! Codecs are looked up by name in a [`CodecRegistry`]. The default registry
//! knows `GZIP` and `ZSTD`; callers can register more.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use flate2::read::GzDecoder;

use crate::archive::ArchiveReader;
use crate::util::{Error, Result};

/// Upper bound on up-front allocation for a declared uncompressed size.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// A named decompressor.
pub trait Codec: Send + Sync {
    /// Name as written in the file.
    fn name(&self) -> &str;

    /// Decompress `input`. `uncompressed_size` is the size declared by the
    /// file and may be used as a capacity hint.
    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>>;
}

/// Read at most `limit + 1` bytes so an oversized stream is detected without
/// inflating it completely.
fn read_limited(mut reader: impl Read, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(limit.min(MAX_PREALLOC));
    reader.by_ref().take(limit as u64 + 1).read_to_end(&mut out)?;
    Ok(out)
}

/// Gzip codec backed by `flate2`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn name(&self) -> &str {
        "GZIP"
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        read_limited(GzDecoder::new(input), uncompressed_size)
            .map_err(|e| Error::compression(format!("gzip: {}", e)))
    }
}

/// Zstandard codec backed by `zstd`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn name(&self) -> &str {
        "ZSTD"
    }

    fn decompress(&self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::new(input)
            .map_err(|e| Error::compression(format!("zstd: {}", e)))?;
        read_limited(decoder, uncompressed_size).map_err(|e| Error::compression(format!("zstd: {}", e)))
    }
}

/// Codecs available to a decode, keyed by name.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Registry with no codecs; every compressed file fails.
    pub fn empty() -> Self {
        Self { codecs: BTreeMap::new() }
    }

    /// Add or replace a codec under its own name.
    pub fn register(&mut self, codec: impl Codec + 'static) -> &mut Self {
        self.codecs.insert(codec.name().to_string(), Arc::new(codec));
        self
    }

    /// Look up a codec by file name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Codec>> {
        self.codecs.get(name)
    }

    /// Registered codec names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(GzipCodec).register(ZstdCodec);
        registry
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Codec name and sizes preceding a compressed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressionHeader {
    pub codec: String,
    pub uncompressed_size: usize,
    pub compressed_size: usize,
}

impl CompressionHeader {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let codec = reader.read_fstring()?;
        let uncompressed_size = reader.read_count()?;
        let compressed_size = reader.read_count()?;
        Ok(Self { codec, uncompressed_size, compressed_size })
    }
}

/// Read the compression header and payload, returning a reader over the
/// decompressed section stream.
pub fn decompress_payload(reader: &mut ArchiveReader, registry: &CodecRegistry) -> Result<ArchiveReader> {
    let header = CompressionHeader::read(reader)?;
    let codec = registry
        .get(&header.codec)
        .ok_or_else(|| Error::UnknownCodec(header.codec.clone()))?;

    let input = reader.read_slice(header.compressed_size)?;
    let data = codec.decompress(input, header.uncompressed_size)?;
    if data.len() != header.uncompressed_size {
        return Err(Error::compression(format!(
            "{} payload decompressed to {} bytes, header declares {}",
            header.codec,
            data.len(),
            header.uncompressed_size
        )));
    }

    tracing::debug!(
        codec = %header.codec,
        compressed = header.compressed_size,
        uncompressed = header.uncompressed_size,
        "decompressed payload"
    );
    if !reader.is_eof() {
        tracing::warn!(trailing = reader.remaining(), "ignoring bytes after compressed payload");
    }

    Ok(ArchiveReader::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ErrorKind;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn payload(codec: &str, uncompressed: usize, compressed: &[u8]) -> Vec<u8> {
        let mut out = (codec.len() as i32).to_le_bytes().to_vec();
        out.extend_from_slice(codec.as_bytes());
        out.extend_from_slice(&(uncompressed as i32).to_le_bytes());
        out.extend_from_slice(&(compressed.len() as i32).to_le_bytes());
        out.extend_from_slice(compressed);
        out
    }

    #[test]
    fn test_gzip_payload() {
        let original = b"section stream bytes ".repeat(20);
        let bytes = payload("GZIP", original.len(), &gzip(&original));

        let mut reader = ArchiveReader::new(bytes);
        let mut inner = decompress_payload(&mut reader, &CodecRegistry::default()).unwrap();
        assert!(reader.is_eof());
        assert_eq!(inner.read_to_end().unwrap(), original);
    }

    #[test]
    fn test_zstd_payload() {
        let original = b"zstd section stream ".repeat(20);
        let compressed = zstd::encode_all(&original[..], 3).unwrap();
        let bytes = payload("ZSTD", original.len(), &compressed);

        let mut inner = decompress_payload(&mut ArchiveReader::new(bytes), &CodecRegistry::default()).unwrap();
        assert_eq!(inner.read_to_end().unwrap(), original);
    }

    #[test]
    fn test_unknown_codec() {
        let bytes = payload("LZ4", 4, &[0, 0, 0, 0]);
        let err = decompress_payload(&mut ArchiveReader::new(bytes), &CodecRegistry::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownCodec(ref name) if name == "LZ4"));
        assert_eq!(err.kind(), ErrorKind::Compression);
    }

    #[test]
    fn test_size_mismatch() {
        let original = b"twelve bytes";
        let bytes = payload("GZIP", original.len() + 1, &gzip(original));
        let err = decompress_payload(&mut ArchiveReader::new(bytes), &CodecRegistry::default()).unwrap_err();
        assert!(matches!(err, Error::Compression(_)));
    }

    #[test]
    fn test_corrupt_stream() {
        let bytes = payload("GZIP", 16, b"not a gzip stream");
        let err = decompress_payload(&mut ArchiveReader::new(bytes), &CodecRegistry::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compression);
    }

    #[test]
    fn test_custom_codec() {
        struct Identity;

        impl Codec for Identity {
            fn name(&self) -> &str {
                "NONE"
            }

            fn decompress(&self, input: &[u8], _: usize) -> Result<Vec<u8>> {
                Ok(input.to_vec())
            }
        }

        let mut registry = CodecRegistry::empty();
        registry.register(Identity);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["NONE"]);

        let bytes = payload("NONE", 3, &[1, 2, 3]);
        let mut inner = decompress_payload(&mut ArchiveReader::new(bytes), &registry).unwrap();
        assert_eq!(inner.read_to_end().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_default_registry() {
        let registry = CodecRegistry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["GZIP", "ZSTD"]);
    }
}
