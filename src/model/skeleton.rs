//! Bone hierarchy, sockets and virtual bones.

use std::collections::HashMap;

use crate::archive::{read_sections, ArchiveReader, SectionHeader, SectionKind, ROOT_PARENT_INDEX};
use crate::core::DecodeOptions;
use crate::util::reshape::scaled;
use crate::util::{Error, Quat, Result, Vec3};

/// Skeleton-level sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkeletonSection {
    Bones,
    Sockets,
    VirtualBones,
}

impl SectionKind for SkeletonSection {
    const CONTEXT: &'static str = "skeleton";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "BONES" => Some(Self::Bones),
            "SOCKETS" => Some(Self::Sockets),
            "VIRTUALBONES" => Some(Self::VirtualBones),
            _ => None,
        }
    }
}

/// A bone with its local transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone, `None` for a root.
    pub parent: Option<usize>,
    /// Local position (scaled).
    pub position: Vec3,
    pub rotation: Quat,
}

impl Bone {
    /// Read one bone. `index` is its position in the bone list; a parent
    /// must come strictly before its child, which rules out cycles.
    pub fn read(reader: &mut ArchiveReader, index: usize, scale: f32) -> Result<Self> {
        let name = reader.read_fstring()?;
        let parent_index = reader.read_i32()?;
        let position = Vec3::from(scaled(reader.read_f32_array::<3>()?, scale));
        let rotation = Quat::from_array(reader.read_f32_array::<4>()?);

        let parent = match parent_index {
            ROOT_PARENT_INDEX => None,
            p if p >= 0 && (p as usize) < index => Some(p as usize),
            p => {
                return Err(Error::invalid(format!(
                    "bone {} ({}) has parent index {}, expected -1 or below {}",
                    index, name, p, index
                )))
            }
        };

        Ok(Self { name, parent, position, rotation })
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Attachment point parented to a named bone.
#[derive(Clone, Debug, PartialEq)]
pub struct Socket {
    pub name: String,
    pub parent_name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Socket {
    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        Ok(Self {
            name: reader.read_fstring()?,
            parent_name: reader.read_fstring()?,
            position: Vec3::from(scaled(reader.read_f32_array::<3>()?, scale)),
            rotation: Quat::from_array(reader.read_f32_array::<4>()?),
            scale: Vec3::from(reader.read_f32_array::<3>()?),
        })
    }
}

/// Bone defined as the span between two existing bones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualBone {
    pub source_name: String,
    pub target_name: String,
    pub virtual_name: String,
}

impl VirtualBone {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        Ok(Self {
            source_name: reader.read_fstring()?,
            target_name: reader.read_fstring()?,
            virtual_name: reader.read_fstring()?,
        })
    }
}

/// Skeleton of a skinned model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    pub sockets: Vec<Socket>,
    pub virtual_bones: Vec<VirtualBone>,
}

impl Skeleton {
    /// Read a skeleton section stream. `reader` is bounded to the
    /// enclosing `SKELETON` body.
    pub fn read(reader: &mut ArchiveReader, options: &DecodeOptions) -> Result<Self> {
        let mut skeleton = Self::default();
        read_sections::<SkeletonSection, _>(reader, options.cancel_token(), |kind, header, body| {
            skeleton.read_section(kind, header, body, options)
        })?;
        skeleton.validate()?;

        tracing::debug!(
            bones = skeleton.bones.len(),
            sockets = skeleton.sockets.len(),
            virtual_bones = skeleton.virtual_bones.len(),
            "decoded skeleton"
        );
        Ok(skeleton)
    }

    fn read_section(
        &mut self,
        kind: SkeletonSection,
        header: &SectionHeader,
        body: &mut ArchiveReader,
        options: &DecodeOptions,
    ) -> Result<()> {
        let count = header.element_count;
        match kind {
            SkeletonSection::Bones => {
                let mut index = 0;
                self.bones = body.read_array(count, |r| {
                    let bone = Bone::read(r, index, options.scale_factor)?;
                    index += 1;
                    Ok(bone)
                })?;
            }
            SkeletonSection::Sockets if options.import_sockets => {
                self.sockets = body.read_array(count, |r| Socket::read(r, options.scale_factor))?;
            }
            SkeletonSection::VirtualBones if options.import_virtual_bones => {
                self.virtual_bones = body.read_array(count, VirtualBone::read)?;
            }
            SkeletonSection::Sockets | SkeletonSection::VirtualBones => {
                tracing::debug!(section = %header.name, "import disabled, skipping");
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.bones.is_empty() {
            return Ok(());
        }
        let names = self.name_index();
        if let Some(socket) = self.sockets.iter().find(|s| !names.contains_key(s.parent_name.as_str())) {
            return Err(Error::invalid(format!(
                "socket {} is parented to unknown bone {}",
                socket.name, socket.parent_name
            )));
        }
        Ok(())
    }

    fn name_index(&self) -> HashMap<&str, usize> {
        self.bones.iter().enumerate().map(|(i, b)| (b.name.as_str(), i)).collect()
    }

    /// Find a bone by name.
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Indices of the root bones.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones.iter().enumerate().filter(|(_, b)| b.is_root()).map(|(i, _)| i)
    }

    /// Indices of the direct children of `parent`.
    pub fn children(&self, parent: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.parent == Some(parent))
            .map(|(i, _)| i)
    }

    /// Number of ancestors of `bone`.
    pub fn depth(&self, bone: usize) -> usize {
        let mut depth = 0;
        let mut current = self.bones.get(bone).and_then(|b| b.parent);
        while let Some(p) = current {
            depth += 1;
            current = self.bones[p].parent;
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ErrorKind;

    fn fstring(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(&(s.len() as i32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }

    fn section(out: &mut Vec<u8>, name: &str, count: i32, body: &[u8]) {
        fstring(out, name);
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(body.len() as i32).to_le_bytes());
        out.extend_from_slice(body);
    }

    fn bone(out: &mut Vec<u8>, name: &str, parent: i32, position: [f32; 3]) {
        fstring(out, name);
        out.extend_from_slice(&parent.to_le_bytes());
        for v in position.iter().chain(&[0.0, 0.0, 0.0, 1.0]) {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn bones(list: &[(&str, i32)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, parent) in list {
            bone(&mut body, name, *parent, [0.0, 0.0, 100.0]);
        }
        let mut out = Vec::new();
        section(&mut out, "BONES", list.len() as i32, &body);
        out
    }

    fn decode(bytes: Vec<u8>) -> Result<Skeleton> {
        Skeleton::read(&mut ArchiveReader::new(bytes), &DecodeOptions::default())
    }

    #[test]
    fn test_hierarchy() {
        let skel = decode(bones(&[("root", -1), ("pelvis", 0), ("spine", 1), ("thigh_l", 1)])).unwrap();
        assert_eq!(skel.bones.len(), 4);
        assert_eq!(skel.bones[0].position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(skel.bones[0].rotation, Quat::IDENTITY);
        assert_eq!(skel.roots().collect::<Vec<_>>(), vec![0]);
        assert_eq!(skel.children(1).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(skel.depth(3), 2);
        assert_eq!(skel.find_bone("spine"), Some(2));
    }

    #[test]
    fn test_forward_parent_rejected() {
        let err = decode(bones(&[("root", -1), ("a", 2), ("b", 0)])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.section_path(), vec!["BONES"]);
    }

    #[test]
    fn test_self_parent_rejected() {
        let err = decode(bones(&[("root", 0)])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    fn socket_section(parent: &str) -> Vec<u8> {
        let mut body = Vec::new();
        fstring(&mut body, "hand_socket");
        fstring(&mut body, parent);
        for v in [100.0f32, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        let mut out = Vec::new();
        section(&mut out, "SOCKETS", 1, &body);
        out
    }

    #[test]
    fn test_sockets_and_virtual_bones() {
        let mut bytes = bones(&[("root", -1), ("hand_r", 0)]);
        bytes.extend(socket_section("hand_r"));
        let mut body = Vec::new();
        for s in ["root", "hand_r", "VB root_hand_r"] {
            fstring(&mut body, s);
        }
        section(&mut bytes, "VIRTUALBONES", 1, &body);

        let skel = decode(bytes).unwrap();
        assert_eq!(skel.sockets[0].parent_name, "hand_r");
        assert_eq!(skel.sockets[0].position, Vec3::X);
        assert_eq!(skel.sockets[0].scale, Vec3::ONE);
        assert_eq!(skel.virtual_bones[0].virtual_name, "VB root_hand_r");
    }

    #[test]
    fn test_socket_unknown_parent() {
        let mut bytes = bones(&[("root", -1)]);
        bytes.extend(socket_section("missing"));
        assert_eq!(decode(bytes).unwrap_err().kind(), ErrorKind::Data);
    }

    #[test]
    fn test_sockets_disabled() {
        let mut bytes = bones(&[("root", -1)]);
        bytes.extend(socket_section("missing"));
        let opts = DecodeOptions::default().with_sockets(false);
        let skel = Skeleton::read(&mut ArchiveReader::new(bytes), &opts).unwrap();
        assert!(skel.sockets.is_empty());
    }
}
