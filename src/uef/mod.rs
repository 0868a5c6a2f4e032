//! File-level decoding: header, compression stage and payload dispatch.
//!
//! ```ignore
//! use ueformat::{open, Asset, DecodeOptions};
//!
//! let file = open("SK_Mannequin.uemodel", &DecodeOptions::default())?;
//! if let Asset::Model(model) = &file.asset {
//!     for lod in &model.lods {
//!         println!("{}: {} vertices", lod.name, lod.vertices.len());
//!     }
//! }
//! ```

use std::path::Path;

use rayon::prelude::*;

use crate::anim::Animation;
use crate::archive::{ArchiveReader, Buffer};
use crate::core::{decompress_payload, DecodeOptions, Header, PayloadKind};
use crate::model::Model;
use crate::util::{Error, Result};
use crate::world::World;

/// Decoded payload.
#[derive(Clone, Debug)]
pub enum Asset {
    Model(Model),
    Animation(Animation),
    World(World),
}

impl Asset {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Model(_) => PayloadKind::Model,
            Self::Animation(_) => PayloadKind::Animation,
            Self::World(_) => PayloadKind::World,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_animation(&self) -> Option<&Animation> {
        match self {
            Self::Animation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_world(&self) -> Option<&World> {
        match self {
            Self::World(w) => Some(w),
            _ => None,
        }
    }
}

/// A decoded UEFormat file.
#[derive(Clone, Debug)]
pub struct UeFile {
    pub header: Header,
    pub asset: Asset,
}

/// Decode a file held in memory.
pub fn decode(bytes: impl Into<Buffer>, options: &DecodeOptions) -> Result<UeFile> {
    decode_reader(ArchiveReader::new(bytes), options)
}

/// Open and decode a file. The file is memory-mapped when the `mmap`
/// feature is enabled.
pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<UeFile> {
    let path = path.as_ref();
    let buffer = Buffer::open(path)?;
    tracing::debug!(path = %path.display(), size = buffer.len(), mapped = buffer.is_mapped(), "opened file");
    decode(buffer, options)
}

/// Decode independent files in parallel. Results are in input order.
pub fn decode_all<P>(paths: &[P], options: &DecodeOptions) -> Vec<Result<UeFile>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(|path| open(path, options)).collect()
}

/// Decode a complete file from a reader positioned at the magic bytes.
pub fn decode_reader(mut reader: ArchiveReader, options: &DecodeOptions) -> Result<UeFile> {
    let header = Header::read(&mut reader)?;
    let kind = header
        .payload_kind()
        .ok_or_else(|| Error::UnknownIdentifier(header.identifier.clone()))?;

    tracing::debug!(
        identifier = %header.identifier,
        version = %header.version,
        object = %header.object_name,
        compressed = header.compressed,
        "read header"
    );

    let mut payload = if header.compressed {
        decompress_payload(&mut reader, &options.codecs)?
    } else {
        reader
    };

    let asset = match kind {
        PayloadKind::Model => Asset::Model(Model::read(&mut payload, options)?),
        PayloadKind::Animation => Asset::Animation(Animation::read(&mut payload, options)?),
        PayloadKind::World => Asset::World(World::read(&mut payload, options)?),
    };

    Ok(UeFile { header, asset })
}
