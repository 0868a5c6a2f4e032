//! World payload (`UEWORLD`): a library of hashed meshes and the actors
//! placing them.
//!
//! ```text
//! World  := Section*                        MESHES | ACTORS
//! MESHES := (Hash:i32 Size:i32 Model[Size])*
//! ACTORS := (Name:String MeshHash:String Location:f32[3] Rotation:f32[4] Scale:f32[3])*
//! ```
//!
//! Mesh bodies are kept as undecoded chunks of the source buffer and decoded
//! on demand with [`HashedMesh::resolve`].

use rayon::prelude::*;

use crate::archive::{read_sections, ArchiveReader, SectionHeader, SectionKind, UEFORMAT_MAGIC};
use crate::core::DecodeOptions;
use crate::model::Model;
use crate::uef::{decode_reader, Asset};
use crate::util::reshape::scaled;
use crate::util::{EngineToYUp, Error, Mat4, Quat, Result, Vec3};

/// World-level sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldSection {
    Meshes,
    Actors,
}

impl SectionKind for WorldSection {
    const CONTEXT: &'static str = "world";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "MESHES" => Some(Self::Meshes),
            "ACTORS" => Some(Self::Actors),
            _ => None,
        }
    }
}

/// A mesh in the world library, identified by hash.
#[derive(Clone, Debug)]
pub struct HashedMesh {
    pub hash: i32,
    data: ArchiveReader,
}

impl HashedMesh {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let hash = reader.read_i32()?;
        let size = reader.read_count()?;
        let data = reader.chunk(size)?;
        Ok(Self { hash, data })
    }

    /// Size of the undecoded mesh body.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if the body is a complete file rather than a bare section stream.
    pub fn is_embedded_file(&self) -> bool {
        self.data.peek(UEFORMAT_MAGIC.len()) == Some(&UEFORMAT_MAGIC[..])
    }

    /// Decode the mesh body.
    ///
    /// Bodies that start with the file magic are decoded as complete files
    /// and must carry a model payload; anything else is read as a model
    /// section stream.
    pub fn resolve(&self, options: &DecodeOptions) -> Result<Model> {
        let mut data = self.data.clone();
        if !self.is_embedded_file() {
            return Model::read(&mut data, options);
        }
        match decode_reader(data, options)?.asset {
            Asset::Model(model) => Ok(model),
            other => Err(Error::invalid(format!(
                "mesh {} embeds a {} payload, expected a model",
                self.hash,
                other.kind().identifier()
            ))),
        }
    }
}

/// Placed instance of a library mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub name: String,
    /// Decimal hash of the placed mesh.
    pub mesh_hash: String,
    /// Location (scaled).
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Actor {
    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        Ok(Self {
            name: reader.read_fstring()?,
            mesh_hash: reader.read_fstring()?,
            location: Vec3::from(scaled(reader.read_f32_array::<3>()?, scale)),
            rotation: Quat::from_array(reader.read_f32_array::<4>()?),
            scale: Vec3::from(reader.read_f32_array::<3>()?),
        })
    }

    /// Parse the mesh hash. Exporters write it either signed or as the
    /// unsigned reinterpretation of the same 32 bits.
    pub fn hash(&self) -> Option<i32> {
        let text = self.mesh_hash.trim();
        text.parse::<i32>()
            .ok()
            .or_else(|| text.parse::<u32>().ok().map(|h| h as i32))
    }

    /// Placement matrix in the Y-up consumer convention.
    pub fn y_up_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            EngineToYUp::vector(self.scale),
            EngineToYUp::rotation(self.rotation),
            EngineToYUp::vector(self.location),
        )
    }
}

/// Decoded world.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub meshes: Vec<HashedMesh>,
    pub actors: Vec<Actor>,
}

impl World {
    pub fn read(reader: &mut ArchiveReader, options: &DecodeOptions) -> Result<Self> {
        let mut world = Self::default();
        read_sections::<WorldSection, _>(reader, options.cancel_token(), |kind, header, body| {
            world.read_section(kind, header, body, options)
        })?;

        let unresolved = world.actors.iter().filter(|a| world.mesh_for(a).is_none()).count();
        if unresolved > 0 {
            tracing::warn!(unresolved, actors = world.actors.len(), "actors reference unknown meshes");
        }
        tracing::debug!(meshes = world.meshes.len(), actors = world.actors.len(), "decoded world");
        Ok(world)
    }

    fn read_section(
        &mut self,
        kind: WorldSection,
        header: &SectionHeader,
        body: &mut ArchiveReader,
        options: &DecodeOptions,
    ) -> Result<()> {
        match kind {
            WorldSection::Meshes => {
                self.meshes = body.read_array(header.element_count, HashedMesh::read)?;
            }
            WorldSection::Actors => {
                self.actors = body.read_array(header.element_count, |r| Actor::read(r, options.scale_factor))?;
            }
        }
        Ok(())
    }

    /// The library mesh an actor places, if present.
    pub fn mesh_for(&self, actor: &Actor) -> Option<&HashedMesh> {
        let hash = actor.hash()?;
        self.meshes.iter().find(|m| m.hash == hash)
    }

    /// Decode every library mesh in parallel, in library order.
    pub fn resolve_meshes(&self, options: &DecodeOptions) -> Result<Vec<Model>> {
        self.meshes
            .par_iter()
            .map(|mesh| {
                mesh.resolve(options)
                    .map_err(|e| e.in_section(WorldSection::CONTEXT, &format!("MESHES[{}]", mesh.hash)))
            })
            .collect()
    }
}
