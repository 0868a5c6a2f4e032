//! Level-of-detail mesh data.

use std::ops::Range;

use super::{check_triangle_range, to_triangles};
use crate::archive::{expect_consumed, read_sections, ArchiveReader, SectionHeader, SectionKind};
use crate::core::DecodeOptions;
use crate::util::reshape::{flat_len, float_rows, scaled, sub_columns};
use crate::util::{BBox3f, Error, Result, Vec2, Vec3, Vec4};

/// LOD-level sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodSection {
    Vertices,
    Indices,
    Normals,
    Tangents,
    VertexColors,
    TexCoords,
    Materials,
    Weights,
    MorphTargets,
}

impl SectionKind for LodSection {
    const CONTEXT: &'static str = "lod";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "VERTICES" => Some(Self::Vertices),
            "INDICES" => Some(Self::Indices),
            "NORMALS" => Some(Self::Normals),
            "TANGENTS" => Some(Self::Tangents),
            "VERTEXCOLORS" => Some(Self::VertexColors),
            "TEXCOORDS" => Some(Self::TexCoords),
            "MATERIALS" => Some(Self::Materials),
            "WEIGHTS" => Some(Self::Weights),
            "MORPHTARGETS" => Some(Self::MorphTargets),
            _ => None,
        }
    }
}

/// Named per-vertex color channel, normalized to `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexColor {
    pub name: String,
    pub data: Vec<Vec4>,
}

impl VertexColor {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let name = reader.read_fstring()?;
        let count = reader.read_count()?;
        let bytes = reader.read_slice(flat_len(count, 4)?)?;
        let data = bytes
            .chunks_exact(4)
            .map(|c| Vec4::new(c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32) / 255.0)
            .collect();
        Ok(Self { name, data })
    }
}

/// Material slot covering a contiguous run of triangles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Material {
    pub name: String,
    /// First entry in the flattened index list.
    pub first_index: usize,
    pub num_faces: usize,
}

impl Material {
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let name = reader.read_fstring()?;
        let first_index = reader.read_i32()?;
        let num_faces = reader.read_i32()?;
        let (Ok(first), Ok(faces)) = (usize::try_from(first_index), usize::try_from(num_faces)) else {
            return Err(Error::invalid(format!(
                "material {} has negative range (first index {}, faces {})",
                name, first_index, num_faces
            )));
        };
        Ok(Self { name, first_index: first, num_faces: faces })
    }

    /// Range of flattened indices (`3 * num_faces` long) this material covers.
    pub fn index_range(&self) -> Range<usize> {
        self.first_index..self.first_index.saturating_add(self.num_faces.saturating_mul(3))
    }
}

/// Skin weight binding one vertex to one bone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    pub bone_index: u16,
    pub vertex_index: u32,
    pub weight: f32,
}

impl VertexWeight {
    /// Encoded size: `i16` bone, `i32` vertex, `f32` weight.
    pub const SIZE: usize = 10;

    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let bone_index = reader.read_i16()?;
        let vertex_index = reader.read_i32()?;
        let weight = reader.read_f32()?;
        let (Ok(bone_index), Ok(vertex_index)) = (u16::try_from(bone_index), u32::try_from(vertex_index)) else {
            return Err(Error::invalid(format!(
                "negative weight binding (bone {}, vertex {})",
                bone_index, vertex_index
            )));
        };
        Ok(Self { bone_index, vertex_index, weight })
    }
}

/// One vertex displacement of a morph target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphTargetDelta {
    /// Position delta (scaled).
    pub position: Vec3,
    /// Normal delta.
    pub normal: Vec3,
    pub vertex_index: u32,
}

impl MorphTargetDelta {
    /// Encoded size: 3 + 3 floats and an `i32` vertex index.
    pub const SIZE: usize = 28;

    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        let position = Vec3::from(scaled(reader.read_f32_array::<3>()?, scale));
        let normal = Vec3::from(reader.read_f32_array::<3>()?);
        let vertex_index = reader.read_i32()?;
        let vertex_index = u32::try_from(vertex_index)
            .map_err(|_| Error::invalid(format!("negative morph target vertex index {}", vertex_index)))?;
        Ok(Self { position, normal, vertex_index })
    }
}

/// Named blend shape.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphTarget {
    pub name: String,
    pub deltas: Vec<MorphTargetDelta>,
}

impl MorphTarget {
    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        let name = reader.read_fstring()?;
        let deltas = reader.read_bulk_array(|r| MorphTargetDelta::read(r, scale))?;
        Ok(Self { name, deltas })
    }
}

/// One level of detail of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodMesh {
    pub name: String,
    /// Vertex positions (scaled), engine space.
    pub vertices: Vec<Vec3>,
    /// Triangles as stored. Use [`LodMesh::to_render_mesh`] for Y-up
    /// consumers, which also reverses the winding.
    pub indices: Vec<[u32; 3]>,
    /// Per-vertex normals (X, Y, Z; the stored W is dropped).
    pub normals: Vec<Vec3>,
    pub colors: Vec<VertexColor>,
    /// UV channels; channel 0 is the primary set.
    pub uvs: Vec<Vec<Vec2>>,
    pub materials: Vec<Material>,
    pub weights: Vec<VertexWeight>,
    pub morph_targets: Vec<MorphTarget>,
}

impl LodMesh {
    /// UV slots available to consumers; extra channels are reported but kept.
    pub const MAX_UV_CHANNELS: usize = 6;

    /// Read a LOD: name, `i32` byte size, then a section stream of that size.
    pub fn read(reader: &mut ArchiveReader, options: &DecodeOptions) -> Result<Self> {
        let name = reader.read_fstring()?;
        let lod_size = reader.read_count()?;
        let mut chunk = reader.chunk(lod_size)?;

        let mut lod = Self { name, ..Self::default() };
        read_sections::<LodSection, _>(&mut chunk, options.cancel_token(), |kind, header, body| {
            lod.read_section(kind, header, body, options)
        })?;
        lod.validate()?;

        tracing::debug!(
            lod = %lod.name,
            vertices = lod.vertices.len(),
            triangles = lod.indices.len(),
            uv_channels = lod.uvs.len(),
            materials = lod.materials.len(),
            weights = lod.weights.len(),
            morph_targets = lod.morph_targets.len(),
            "decoded LOD"
        );
        Ok(lod)
    }

    fn read_section(
        &mut self,
        kind: LodSection,
        header: &SectionHeader,
        body: &mut ArchiveReader,
        options: &DecodeOptions,
    ) -> Result<()> {
        let count = header.element_count;
        match kind {
            LodSection::Vertices => {
                let flat = body.read_f32_vec(flat_len(count, 3)?)?;
                self.vertices = float_rows::<Vec3, 3>(&flat, options.scale_factor);
            }
            LodSection::Indices => {
                let flat = body.read_i32_vec(count)?;
                self.indices = to_triangles(&flat)?;
            }
            LodSection::Normals => {
                let flat = body.read_f32_vec(flat_len(count, 4)?)?;
                let wxyz = float_rows::<[f32; 4], 4>(&flat, 1.0);
                if let Some(w) = wxyz.iter().map(|n| n[0]).find(|w| *w != 0.0) {
                    tracing::warn!(lod = %self.name, w, "normal with non-zero W component, dropping it");
                }
                self.normals = sub_columns::<f32, 4, 3>(&wxyz, 1).into_iter().map(Vec3::from).collect();
            }
            LodSection::Tangents => {
                // Recognized but not decoded. Framing resyncs past the body
                // whatever its declared size.
                tracing::trace!(lod = %self.name, count, "skipping tangents");
            }
            LodSection::VertexColors => {
                self.colors = body.read_array(count, VertexColor::read)?;
            }
            LodSection::TexCoords => {
                self.uvs = body.read_array(count, |r| {
                    let rows = r.read_count()?;
                    let flat = r.read_f32_vec(flat_len(rows, 2)?)?;
                    Ok(float_rows::<Vec2, 2>(&flat, 1.0))
                })?;
                if self.uvs.len() > Self::MAX_UV_CHANNELS {
                    tracing::warn!(
                        lod = %self.name,
                        channels = self.uvs.len(),
                        max = Self::MAX_UV_CHANNELS,
                        "more UV channels than available slots"
                    );
                }
            }
            LodSection::Materials => {
                self.materials = body.read_array(count, Material::read)?;
            }
            LodSection::Weights => {
                self.weights = body.read_array(count, VertexWeight::read)?;
                expect_consumed(body, header)?;
            }
            LodSection::MorphTargets => {
                if options.import_morph_targets {
                    self.morph_targets = body.read_array(count, |r| MorphTarget::read(r, options.scale_factor))?;
                    expect_consumed(body, header)?;
                }
            }
        }
        Ok(())
    }

    /// Cross-section consistency checks, run once every section is read.
    fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        let per_vertex = |what: &str, len: usize| -> Result<()> {
            if len != vertex_count {
                return Err(Error::invalid(format!(
                    "LOD {}: {} has {} entries for {} vertices",
                    self.name, what, len, vertex_count
                )));
            }
            Ok(())
        };

        check_triangle_range(&self.indices, vertex_count)
            .map_err(|e| Error::invalid(format!("LOD {}: {}", self.name, e)))?;
        if !self.normals.is_empty() {
            per_vertex("normals", self.normals.len())?;
        }
        for (i, uv) in self.uvs.iter().enumerate() {
            per_vertex(&format!("UV channel {}", i), uv.len())?;
        }
        for color in &self.colors {
            per_vertex(&format!("color channel {}", color.name), color.data.len())?;
        }

        self.validate_materials()?;

        if let Some(w) = self.weights.iter().find(|w| w.vertex_index as usize >= vertex_count) {
            return Err(Error::invalid(format!(
                "LOD {}: weight references vertex {} of {}",
                self.name, w.vertex_index, vertex_count
            )));
        }
        for morph in &self.morph_targets {
            if let Some(d) = morph.deltas.iter().find(|d| d.vertex_index as usize >= vertex_count) {
                return Err(Error::invalid(format!(
                    "LOD {}: morph target {} references vertex {} of {}",
                    self.name, morph.name, d.vertex_index, vertex_count
                )));
            }
        }
        Ok(())
    }

    /// Material ranges must fit in the index data and must not overlap.
    fn validate_materials(&self) -> Result<()> {
        let index_count = self.index_count();
        let mut ranges: Vec<(Range<usize>, &str)> = self
            .materials
            .iter()
            .map(|m| (m.index_range(), m.name.as_str()))
            .collect();
        ranges.sort_by_key(|(r, _)| (r.start, r.end));

        let mut prev_end = 0;
        let mut prev_name = "";
        for (range, name) in ranges {
            if range.end > index_count {
                return Err(Error::invalid(format!(
                    "LOD {}: material {} covers indices {:?} but only {} exist",
                    self.name, name, range, index_count
                )));
            }
            if !range.is_empty() {
                if range.start < prev_end {
                    return Err(Error::invalid(format!(
                        "LOD {}: material {} overlaps material {}",
                        self.name, name, prev_name
                    )));
                }
                prev_end = range.end;
                prev_name = name;
            }
        }
        Ok(())
    }

    /// Number of entries in the flattened index list.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len() * 3
    }

    /// Primary UV channel, if any.
    pub fn primary_uvs(&self) -> Option<&[Vec2]> {
        self.uvs.first().map(Vec::as_slice)
    }

    /// UV channels beyond [`LodMesh::MAX_UV_CHANNELS`].
    pub fn excess_uv_channels(&self) -> usize {
        self.uvs.len().saturating_sub(Self::MAX_UV_CHANNELS)
    }

    /// Check if this LOD carries skin weights.
    pub fn is_skinned(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Bounding box of the vertex positions.
    pub fn bounds(&self) -> BBox3f {
        BBox3f::from_points(&self.vertices)
    }
}
