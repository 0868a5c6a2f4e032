//! Y-up render data for consumers that build engine meshes.

use std::ops::Range;

use super::LodMesh;
use crate::util::{BBox3f, EngineToYUp, Vec2, Vec3};

/// Sub-mesh of a [`RenderMesh`], ranges into [`RenderMesh::indices`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub material: String,
    pub indices: Range<usize>,
}

/// Mesh converted to a Y-up consumer convention.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Primary UV channel, empty when the LOD has none.
    pub uvs: Vec<Vec2>,
    /// Flat triangle list with reversed winding.
    pub indices: Vec<u32>,
    pub submeshes: Vec<SubMesh>,
}

impl RenderMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> BBox3f {
        BBox3f::from_points(&self.positions)
    }
}

impl LodMesh {
    /// Convert to Y-up render data.
    ///
    /// Every vector goes through [`EngineToYUp::vector`] and every triangle
    /// through [`EngineToYUp::triangle`]; the axis swap mirrors the mesh so
    /// the winding reversal is what keeps faces pointing outward.
    pub fn to_render_mesh(&self) -> RenderMesh {
        let positions = self.vertices.iter().copied().map(EngineToYUp::vector).collect();
        let normals = self.normals.iter().copied().map(EngineToYUp::vector).collect();
        let uvs = self.primary_uvs().map(<[Vec2]>::to_vec).unwrap_or_default();
        let indices = self.indices.iter().copied().flat_map(EngineToYUp::triangle).collect();

        // Reversal happens within a triangle, so material ranges carry over.
        let submeshes = self
            .materials
            .iter()
            .map(|m| SubMesh { material: m.name.clone(), indices: m.index_range() })
            .collect();

        RenderMesh { positions, normals, uvs, indices, submeshes }
    }
}
