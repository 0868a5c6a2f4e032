//! Core layer - header codec, compression stage and decode configuration.
//!
//! This module provides:
//! - [`Header`] - magic, identifier, version, object name, compression flag
//! - [`CodecRegistry`] / [`Codec`] - pluggable payload decompression
//! - [`DecodeOptions`] - scale factor, section toggles, codecs, cancellation
//! - [`CancelToken`] - cooperative cancellation at section boundaries

mod cancel;
mod compression;
mod header;
mod options;

pub use cancel::CancelToken;
pub use compression::{decompress_payload, Codec, CodecRegistry, CompressionHeader, GzipCodec, ZstdCodec};
pub use header::{Header, PayloadKind};
pub use options::{DecodeOptions, DEFAULT_SCALE_FACTOR};
