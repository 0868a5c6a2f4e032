//! File header: magic, identifier, version, object name and compression flag.

use crate::archive::{
    ArchiveReader, FormatVersion, ANIM_IDENTIFIER, MODEL_IDENTIFIER, UEFORMAT_MAGIC, WORLD_IDENTIFIER,
};
use crate::util::{Error, Result};

/// Entity family selected by the header identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Model,
    Animation,
    World,
}

impl PayloadKind {
    /// Map a header identifier to a payload kind.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            MODEL_IDENTIFIER => Some(Self::Model),
            ANIM_IDENTIFIER => Some(Self::Animation),
            WORLD_IDENTIFIER => Some(Self::World),
            _ => None,
        }
    }

    /// Identifier written by exporters for this kind.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Model => MODEL_IDENTIFIER,
            Self::Animation => ANIM_IDENTIFIER,
            Self::World => WORLD_IDENTIFIER,
        }
    }
}

/// Parsed file header.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// Payload identifier, e.g. `UEMODEL`.
    pub identifier: String,
    /// Format version.
    pub version: FormatVersion,
    /// Name of the exported object.
    pub object_name: String,
    /// Whether the section stream is compressed.
    pub compressed: bool,
}

impl Header {
    /// Read and validate a header, starting at the magic bytes.
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let magic = reader.read_slice(UEFORMAT_MAGIC.len())?;
        if magic != UEFORMAT_MAGIC {
            return Err(Error::InvalidMagic(magic.to_vec()));
        }

        let identifier = reader.read_fstring()?;
        let version_byte = reader.read_u8()?;
        let version = FormatVersion::from_u8(version_byte).ok_or(Error::UnsupportedVersion(version_byte))?;
        let object_name = reader.read_fstring()?;
        let compressed = reader.read_bool()?;

        Ok(Self { identifier, version, object_name, compressed })
    }

    /// Payload kind named by the identifier, if known.
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        PayloadKind::from_identifier(&self.identifier)
    }
}
