//! Model payload (`UEMODEL`): LODs, an optional skeleton and collision.
//!
//! ```text
//! Model     := Section*                      LODS | SKELETON | COLLISION
//! LODS      := (Name:String LodSize:i32 Section[LodSize])*
//! SKELETON  := Section*                      BONES | SOCKETS | VIRTUALBONES
//! COLLISION := ConvexCollision*
//! ```

mod collision;
mod lod;
mod render;
mod skeleton;

pub use collision::ConvexCollision;
pub use lod::{LodMesh, LodSection, Material, MorphTarget, MorphTargetDelta, VertexColor, VertexWeight};
pub use render::{RenderMesh, SubMesh};
pub use skeleton::{Bone, Skeleton, SkeletonSection, Socket, VirtualBone};

use crate::archive::{read_sections, ArchiveReader, SectionHeader, SectionKind};
use crate::core::DecodeOptions;
use crate::util::reshape::int_rows;
use crate::util::{Error, Result};

/// Model-level sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSection {
    Lods,
    Skeleton,
    Collision,
}

impl SectionKind for ModelSection {
    const CONTEXT: &'static str = "model";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "LODS" => Some(Self::Lods),
            "SKELETON" => Some(Self::Skeleton),
            "COLLISION" => Some(Self::Collision),
            _ => None,
        }
    }
}

/// Decoded model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    /// LODs, highest detail first.
    pub lods: Vec<LodMesh>,
    pub skeleton: Option<Skeleton>,
    pub collisions: Vec<ConvexCollision>,
}

impl Model {
    /// Read a model section stream until `reader` is exhausted.
    pub fn read(reader: &mut ArchiveReader, options: &DecodeOptions) -> Result<Self> {
        let mut model = Self::default();
        read_sections::<ModelSection, _>(reader, options.cancel_token(), |kind, header, body| {
            model.read_section(kind, header, body, options)
        })?;
        model.validate()?;

        if model.lods.is_empty() {
            tracing::warn!("model has no LODs");
        }
        Ok(model)
    }

    fn read_section(
        &mut self,
        kind: ModelSection,
        header: &SectionHeader,
        body: &mut ArchiveReader,
        options: &DecodeOptions,
    ) -> Result<()> {
        match kind {
            ModelSection::Lods => {
                let lods = body.read_array(header.element_count, |r| LodMesh::read(r, options))?;
                self.lods.extend(lods);
            }
            ModelSection::Skeleton => {
                self.skeleton = Some(Skeleton::read(body, options)?);
            }
            ModelSection::Collision if options.import_collision => {
                let hulls = body.read_array(header.element_count, |r| {
                    ConvexCollision::read(r, options.scale_factor)
                })?;
                self.collisions.extend(hulls);
            }
            ModelSection::Collision => {
                tracing::debug!("collision import disabled, skipping");
            }
        }
        Ok(())
    }

    /// Weights must reference existing bones when a skeleton is present.
    fn validate(&self) -> Result<()> {
        let Some(skeleton) = &self.skeleton else {
            return Ok(());
        };
        let bone_count = skeleton.bones.len();
        for lod in &self.lods {
            if let Some(w) = lod.weights.iter().find(|w| w.bone_index as usize >= bone_count) {
                return Err(Error::invalid(format!(
                    "LOD {}: weight references bone {} of {}",
                    lod.name, w.bone_index, bone_count
                )));
            }
        }
        Ok(())
    }

    /// Highest-detail LOD.
    pub fn lod0(&self) -> Option<&LodMesh> {
        self.lods.first()
    }

    pub fn is_skeletal(&self) -> bool {
        self.skeleton.as_ref().is_some_and(|s| !s.bones.is_empty())
    }
}

/// Reshape a flat index stream into triangles.
///
/// The count must be a multiple of 3 and every index non-negative.
pub(crate) fn to_triangles(flat: &[i32]) -> Result<Vec<[u32; 3]>> {
    if flat.len() % 3 != 0 {
        return Err(Error::invalid(format!("index count {} is not a multiple of 3", flat.len())));
    }
    if let Some(i) = flat.iter().find(|i| **i < 0) {
        return Err(Error::invalid(format!("negative vertex index {}", i)));
    }
    Ok(int_rows::<3>(flat).into_iter().map(|t| t.map(|i| i as u32)).collect())
}

/// Check that every triangle addresses `[0, vertex_count)`.
pub(crate) fn check_triangle_range(triangles: &[[u32; 3]], vertex_count: usize) -> Result<()> {
    match triangles.iter().flatten().find(|i| **i as usize >= vertex_count) {
        Some(i) => Err(Error::invalid(format!("index {} out of range for {} vertices", i, vertex_count))),
        None => Ok(()),
    }
}
