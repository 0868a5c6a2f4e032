//! Math type re-exports and UEFormat-specific math utilities.
//!
//! This module re-exports types from `glam` and provides the bounding box
//! and the engine-to-consumer coordinate bridge.

// Re-export glam types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounding box of a point set. Empty input gives [`BBox3f::EMPTY`].
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut b = Self::EMPTY;
        for &p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

/// Bridge from engine space (Z-up) to a Y-up consumer.
///
/// Vectors are reordered (X, Y, Z) -> (X, Z, Y). Swapping two axes flips
/// handedness, so every triangle is also emitted in reverse order
/// (i2, i1, i0) to keep front faces and normals pointing outward. The two
/// halves must always be applied together; consumers relying on the
/// stored winding will render inside-out meshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineToYUp;

impl EngineToYUp {
    /// Convert a position or direction.
    #[inline]
    pub fn vector(v: Vec3) -> Vec3 {
        Vec3::new(v.x, v.z, v.y)
    }

    /// Convert a triangle's vertex order.
    #[inline]
    pub fn triangle<T: Copy>(tri: [T; 3]) -> [T; 3] {
        [tri[2], tri[1], tri[0]]
    }

    /// Convert a rotation. Mirroring across the Y=Z plane keeps the axis
    /// swap and negates the angle.
    #[inline]
    pub fn rotation(q: Quat) -> Quat {
        Quat::from_xyzw(-q.x, -q.z, -q.y, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::EMPTY;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ZERO);

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
        assert_eq!(b.size(), Vec3::ONE);
    }

    #[test]
    fn test_bbox_from_points() {
        let pts = [Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, -2.0, 3.0)];
        let b = BBox3f::from_points(&pts);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(BBox3f::from_points(&[]).is_empty());
    }

    #[test]
    fn test_bbox_pod() {
        assert_eq!(std::mem::size_of::<BBox3f>(), 24);
    }

    #[test]
    fn test_engine_to_y_up() {
        assert_eq!(EngineToYUp::vector(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(EngineToYUp::triangle([0u32, 1, 2]), [2, 1, 0]);
    }

    #[test]
    fn test_rotation_matches_vector_swap() {
        let q = Quat::from_rotation_z(0.7);
        let v = Vec3::new(1.0, 0.5, -0.25);
        let expected = EngineToYUp::vector(q * v);
        let actual = EngineToYUp::rotation(q) * EngineToYUp::vector(v);
        assert!(expected.abs_diff_eq(actual, 1e-5));
    }
}
