//! Animation payload (`UEANIM`): bone tracks and float curves.
//!
//! ```text
//! Animation := NumFrames:i32 FramesPerSecond:f32 Section*     TRACKS | CURVES
//! Track     := Name:String VectorKey[] QuatKey[] VectorKey[]  (position, rotation, scale)
//! Curve     := Name:String FloatKey[]
//! ```
//!
//! Every key array is length-prefixed and every key starts with an `i32`
//! frame number.

use crate::archive::{read_sections, ArchiveReader, SectionHeader, SectionKind};
use crate::core::DecodeOptions;
use crate::util::reshape::scaled;
use crate::util::{Error, Quat, Result, Vec3};

/// Animation-level sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimSection {
    Tracks,
    Curves,
}

impl SectionKind for AnimSection {
    const CONTEXT: &'static str = "animation";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "TRACKS" => Some(Self::Tracks),
            "CURVES" => Some(Self::Curves),
            _ => None,
        }
    }
}

/// A keyframe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimKey {
    Vector { frame: i32, value: Vec3 },
    Quat { frame: i32, value: Quat },
    Scalar { frame: i32, value: f32 },
}

impl AnimKey {
    /// Read a vector key, multiplying the value by `scale`.
    pub fn read_vector(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        let frame = reader.read_i32()?;
        let value = Vec3::from(scaled(reader.read_f32_array::<3>()?, scale));
        Ok(Self::Vector { frame, value })
    }

    pub fn read_quat(reader: &mut ArchiveReader) -> Result<Self> {
        let frame = reader.read_i32()?;
        let value = Quat::from_array(reader.read_f32_array::<4>()?);
        Ok(Self::Quat { frame, value })
    }

    pub fn read_scalar(reader: &mut ArchiveReader) -> Result<Self> {
        let frame = reader.read_i32()?;
        let value = reader.read_f32()?;
        Ok(Self::Scalar { frame, value })
    }

    pub fn frame(&self) -> i32 {
        match *self {
            Self::Vector { frame, .. } | Self::Quat { frame, .. } | Self::Scalar { frame, .. } => frame,
        }
    }
}

/// Keys for one bone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub name: String,
    pub position_keys: Vec<AnimKey>,
    pub rotation_keys: Vec<AnimKey>,
    pub scale_keys: Vec<AnimKey>,
}

impl Track {
    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        Ok(Self {
            name: reader.read_fstring()?,
            position_keys: reader.read_bulk_array(|r| AnimKey::read_vector(r, scale))?,
            rotation_keys: reader.read_bulk_array(AnimKey::read_quat)?,
            scale_keys: reader.read_bulk_array(|r| AnimKey::read_vector(r, 1.0))?,
        })
    }

    pub fn key_count(&self) -> usize {
        self.position_keys.len() + self.rotation_keys.len() + self.scale_keys.len()
    }
}

/// Named float curve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    pub name: String,
    pub keys: Vec<AnimKey>,
}

impl Curve {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        Ok(Self {
            name: reader.read_fstring()?,
            keys: reader.read_bulk_array(AnimKey::read_scalar)?,
        })
    }
}

/// Decoded animation sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub num_frames: usize,
    pub frames_per_second: f32,
    pub tracks: Vec<Track>,
    pub curves: Vec<Curve>,
}

impl Animation {
    pub fn read(reader: &mut ArchiveReader, options: &DecodeOptions) -> Result<Self> {
        let num_frames = reader.read_count()?;
        let frames_per_second = reader.read_f32()?;
        if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
            return Err(Error::invalid(format!("invalid frame rate {}", frames_per_second)));
        }

        let mut anim = Self { num_frames, frames_per_second, ..Self::default() };
        read_sections::<AnimSection, _>(reader, options.cancel_token(), |kind, header, body| {
            anim.read_section(kind, header, body, options)
        })?;

        tracing::debug!(
            frames = anim.num_frames,
            fps = anim.frames_per_second,
            tracks = anim.tracks.len(),
            curves = anim.curves.len(),
            "decoded animation"
        );
        Ok(anim)
    }

    fn read_section(
        &mut self,
        kind: AnimSection,
        header: &SectionHeader,
        body: &mut ArchiveReader,
        options: &DecodeOptions,
    ) -> Result<()> {
        match kind {
            AnimSection::Tracks => {
                self.tracks = body.read_array(header.element_count, |r| Track::read(r, options.scale_factor))?;
            }
            AnimSection::Curves => {
                self.curves = body.read_array(header.element_count, Curve::read)?;
            }
        }
        Ok(())
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        self.num_frames as f32 / self.frames_per_second
    }

    pub fn find_track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }
}
