//! Overlap and intersection tests used by the triangle index and mesh raycasts
//!
//! 2D operations work on the XZ plane (Y-up coordinate system) and take
//! `[x, z]` pairs.

use glam::Vec3;

const SEGMENT_EPSILON: f32 = 1e-6;

/// Check if two 2D axis-aligned rectangles overlap (on XZ plane).
#[inline]
pub fn overlap_rect_2d(amin: &[f32; 2], amax: &[f32; 2], bmin: &[f32; 2], bmax: &[f32; 2]) -> bool {
    amin[0] <= bmax[0] && amax[0] >= bmin[0] && amin[1] <= bmax[1] && amax[1] >= bmin[1]
}

/// Check if the 2D segment `p`-`q` touches the rectangle `bmin`-`bmax`.
///
/// Slab test; segment components shorter than a small epsilon are treated
/// as axis-parallel.
pub fn overlap_segment_rect_2d(p: &[f32; 2], q: &[f32; 2], bmin: &[f32; 2], bmax: &[f32; 2]) -> bool {
    let mut tmin = 0.0f32;
    let mut tmax = 1.0f32;
    let d = [q[0] - p[0], q[1] - p[1]];

    for i in 0..2 {
        if d[i].abs() < SEGMENT_EPSILON {
            // Parallel to this slab
            if p[i] < bmin[i] || p[i] > bmax[i] {
                return false;
            }
        } else {
            let ood = 1.0 / d[i];
            let mut t1 = (bmin[i] - p[i]) * ood;
            let mut t2 = (bmax[i] - p[i]) * ood;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return false;
            }
        }
    }

    true
}

/// Clips the segment `sp`-`sq` against a 3D AABB.
///
/// Returns the entry and exit parameters `(tmin, tmax)` within `[0, 1]`, or
/// `None` when the segment misses the box.
pub fn intersect_segment_aabb(
    sp: &[f32; 3],
    sq: &[f32; 3],
    amin: &[f32; 3],
    amax: &[f32; 3],
) -> Option<(f32, f32)> {
    let d = [sq[0] - sp[0], sq[1] - sp[1], sq[2] - sp[2]];
    let mut tmin = 0.0f32;
    let mut tmax = 1.0f32;

    for i in 0..3 {
        if d[i].abs() < SEGMENT_EPSILON {
            if sp[i] < amin[i] || sp[i] > amax[i] {
                return None;
            }
        } else {
            let ood = 1.0 / d[i];
            let mut t1 = (amin[i] - sp[i]) * ood;
            let mut t2 = (amax[i] - sp[i]) * ood;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }
    }

    Some((tmin, tmax))
}

/// Intersects the segment `sp`-`sq` with triangle `a`, `b`, `c`.
///
/// Only front faces are hit: the triangle normal `(b - a) x (c - a)` must
/// point against the segment direction. Returns the parametric distance
/// along the segment.
pub fn intersect_segment_triangle(sp: Vec3, sq: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let ab = b - a;
    let ac = c - a;
    let qp = sp - sq;

    let norm = ab.cross(ac);

    // Segment points away from the triangle or is parallel to it
    let d = qp.dot(norm);
    if d <= 0.0 {
        return None;
    }

    let ap = sp - a;
    let t = ap.dot(norm);
    if t < 0.0 || t > d {
        return None;
    }

    // Barycentric bounds
    let e = qp.cross(ap);
    let v = ac.dot(e);
    if v < 0.0 || v > d {
        return None;
    }
    let w = -ab.dot(e);
    if w < 0.0 || v + w > d {
        return None;
    }

    Some(t / d)
}
