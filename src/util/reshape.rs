//! Geometry reshaping: flat scalar streams into fixed-width rows.
//!
//! Pure functions, no I/O. Row width is a const generic so every call site
//! states the shape it expects.

use super::{Error, Result};

/// Number of scalars in `rows` rows of `width`, checked for overflow.
pub fn flat_len(rows: usize, width: usize) -> Result<usize> {
    rows.checked_mul(width)
        .ok_or_else(|| Error::invalid(format!("{} rows of width {} overflow", rows, width)))
}

/// Reshape a flat float stream into rows of `N`, multiplying each
/// component by `scale`. Trailing values that don't fill a row are dropped.
pub fn float_rows<T, const N: usize>(flat: &[f32], scale: f32) -> Vec<T>
where
    T: From<[f32; N]>,
{
    flat.chunks_exact(N)
        .map(|chunk| {
            let mut row = [0.0f32; N];
            for (dst, src) in row.iter_mut().zip(chunk) {
                *dst = src * scale;
            }
            T::from(row)
        })
        .collect()
}

/// Reshape a flat integer stream into rows of `N`.
pub fn int_rows<const N: usize>(flat: &[i32]) -> Vec<[i32; N]> {
    flat.chunks_exact(N)
        .map(|chunk| {
            let mut row = [0i32; N];
            row.copy_from_slice(chunk);
            row
        })
        .collect()
}

/// Copy columns `start..start + M` out of every row.
///
/// # Panics
/// If `start + M > N`; the column range is fixed at the call site.
pub fn sub_columns<T: Copy + Default, const N: usize, const M: usize>(
    rows: &[[T; N]],
    start: usize,
) -> Vec<[T; M]> {
    assert!(start + M <= N, "column range {}..{} exceeds row width {}", start, start + M, N);
    rows.iter()
        .map(|row| {
            let mut out = [T::default(); M];
            out.copy_from_slice(&row[start..start + M]);
            out
        })
        .collect()
}

/// Multiply every component by `scale`.
pub fn scaled<const N: usize>(v: [f32; N], scale: f32) -> [f32; N] {
    v.map(|c| c * scale)
}
