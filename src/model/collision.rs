//! Convex collision hulls.

use super::{check_triangle_range, to_triangles};
use crate::archive::ArchiveReader;
use crate::util::reshape::{flat_len, float_rows};
use crate::util::{BBox3f, Error, Result, Vec3};

/// A convex hull: scaled vertices and a triangle list into them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvexCollision {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
}

impl ConvexCollision {
    /// Read one hull: name, vertex count, vertices, index count, indices.
    pub fn read(reader: &mut ArchiveReader, scale: f32) -> Result<Self> {
        let name = reader.read_fstring()?;

        let vertex_count = reader.read_count()?;
        let flat = reader.read_f32_vec(flat_len(vertex_count, 3)?)?;
        let vertices = float_rows::<Vec3, 3>(&flat, scale);

        let index_count = reader.read_count()?;
        let indices = to_triangles(&reader.read_i32_vec(index_count)?)
            .and_then(|tris| check_triangle_range(&tris, vertices.len()).map(|_| tris))
            .map_err(|e| Error::invalid(format!("collision {}: {}", name, e)))?;

        Ok(Self { name, vertices, indices })
    }

    pub fn bounds(&self) -> BBox3f {
        BBox3f::from_points(&self.vertices)
    }
}
