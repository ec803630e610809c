//! Axis-aligned bounds over flat vertex buffers

/// Calculates the axis-aligned bounding box of the first `nverts` vertices
/// of a flat `[x, y, z, x, y, z, ...]` buffer.
///
/// `nverts` is clamped to the number of complete vertices in `verts`. When no
/// vertex is visited both corners are `[0.0; 3]`.
pub fn calc_bounds(verts: &[f32], nverts: usize) -> ([f32; 3], [f32; 3]) {
    let n = nverts.min(verts.len() / 3);
    if n == 0 {
        return ([0.0; 3], [0.0; 3]);
    }

    let mut bmin = [verts[0], verts[1], verts[2]];
    let mut bmax = bmin;

    for v in verts[3..n * 3].chunks_exact(3) {
        bmin[0] = bmin[0].min(v[0]);
        bmin[1] = bmin[1].min(v[1]);
        bmin[2] = bmin[2].min(v[2]);
        bmax[0] = bmax[0].max(v[0]);
        bmax[1] = bmax[1].max(v[1]);
        bmax[2] = bmax[2].max(v[2]);
    }

    (bmin, bmax)
}

/// Calculates the 2D bounds (XZ plane) of a single triangle.
///
/// Returns `([min_x, min_z], [max_x, max_z])`.
#[inline]
pub fn calc_tri_bounds_2d(v0: &[f32], v1: &[f32], v2: &[f32]) -> ([f32; 2], [f32; 2]) {
    let bmin = [v0[0].min(v1[0]).min(v2[0]), v0[2].min(v1[2]).min(v2[2])];
    let bmax = [v0[0].max(v1[0]).max(v2[0]), v0[2].max(v1[2]).max(v2[2])];
    (bmin, bmax)
}
