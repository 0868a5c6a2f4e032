//! UEFormat wire constants.

use std::fmt;

/// Magic bytes at the start of every UEFormat file.
pub const UEFORMAT_MAGIC: &[u8; 8] = b"UEFORMAT";

/// Payload identifier for static and skeletal meshes.
pub const MODEL_IDENTIFIER: &str = "UEMODEL";

/// Payload identifier for animation sequences.
pub const ANIM_IDENTIFIER: &str = "UEANIM";

/// Payload identifier for world actor placements.
pub const WORLD_IDENTIFIER: &str = "UEWORLD";

/// Parent index marking a root bone.
pub const ROOT_PARENT_INDEX: i32 = -1;

/// UEFormat file version, stored as a single byte after the identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FormatVersion {
    BeforeCustomVersionWasAdded = 0,
    SerializeBinormalSign = 1,
    AddMultipleVertexColors = 2,
    AddConvexCollisionGeom = 3,
    LevelOfDetailFormatRestructure = 4,
    SerializeVirtualBones = 5,
}

impl FormatVersion {
    /// Newest version this decoder understands.
    pub const LATEST: Self = Self::SerializeVirtualBones;

    /// Map a version byte to a known version.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::BeforeCustomVersionWasAdded),
            1 => Some(Self::SerializeBinormalSign),
            2 => Some(Self::AddMultipleVertexColors),
            3 => Some(Self::AddConvexCollisionGeom),
            4 => Some(Self::LevelOfDetailFormatRestructure),
            5 => Some(Self::SerializeVirtualBones),
            _ => None,
        }
    }

    /// Raw version byte.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Version name as written in exporter sources.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeCustomVersionWasAdded => "BeforeCustomVersionWasAdded",
            Self::SerializeBinormalSign => "SerializeBinormalSign",
            Self::AddMultipleVertexColors => "AddMultipleVertexColors",
            Self::AddConvexCollisionGeom => "AddConvexCollisionGeom",
            Self::LevelOfDetailFormatRestructure => "LevelOfDetailFormatRestructure",
            Self::SerializeVirtualBones => "SerializeVirtualBones",
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
