//! Convex volumes authored on top of the input geometry
//!
//! Convex volumes mark areas of the input mesh with an area type (water,
//! door, no-walk...) before the navigation mesh is built. A volume is a convex
//! polygon on the XZ plane extruded between a minimum and maximum height.

use glam::Vec3;

use crate::{GeomError, Result};

/// Maximum number of vertices in a convex volume
pub const MAX_CONVEXVOL_PTS: usize = 12;

/// Maximum number of convex volumes a scene can hold
pub const MAX_VOLUMES: usize = 256;

const WINDING_EPSILON: f32 = 1e-3;

/// A convex prism tagging an area of the mesh
///
/// Deserialization goes through [`ConvexVolume::new`], so a decoded volume
/// satisfies the same outline and height checks as a constructed one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConvexVolumeDef")
)]
pub struct ConvexVolume {
    /// Vertices of the convex outline (in world space)
    vertices: Vec<Vec3>,
    /// Minimum height of the volume
    pub hmin: f32,
    /// Maximum height of the volume
    pub hmax: f32,
    /// Area type applied within this volume
    pub area: u8,
}

/// Unchecked wire form of [`ConvexVolume`]
#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct ConvexVolumeDef {
    vertices: Vec<Vec3>,
    hmin: f32,
    hmax: f32,
    area: u8,
}

#[cfg(feature = "serialization")]
impl TryFrom<ConvexVolumeDef> for ConvexVolume {
    type Error = GeomError;

    fn try_from(def: ConvexVolumeDef) -> Result<Self> {
        ConvexVolume::new(def.vertices, def.hmin, def.hmax, def.area)
    }
}

impl ConvexVolume {
    /// Creates a new convex volume from its outline
    pub fn new(vertices: Vec<Vec3>, hmin: f32, hmax: f32, area: u8) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(GeomError::InvalidVolume(
                "Convex volume requires at least 3 vertices".to_string(),
            ));
        }

        if vertices.len() > MAX_CONVEXVOL_PTS {
            return Err(GeomError::InvalidVolume(format!(
                "Convex volume has too many vertices: {} (max: {})",
                vertices.len(),
                MAX_CONVEXVOL_PTS
            )));
        }

        if hmin > hmax {
            return Err(GeomError::InvalidVolume(format!(
                "Convex volume hmin {} > hmax {}",
                hmin, hmax
            )));
        }

        if !Self::is_convex(&vertices) {
            return Err(GeomError::InvalidVolume(
                "Vertices do not form a convex polygon".to_string(),
            ));
        }

        Ok(Self {
            vertices,
            hmin,
            hmax,
            area,
        })
    }

    /// Creates a box-shaped convex volume
    pub fn from_box(center: Vec3, half_extents: Vec3, area: u8) -> Result<Self> {
        let min_x = center.x - half_extents.x;
        let max_x = center.x + half_extents.x;
        let min_z = center.z - half_extents.z;
        let max_z = center.z + half_extents.z;

        let vertices = vec![
            Vec3::new(min_x, center.y, min_z),
            Vec3::new(min_x, center.y, max_z),
            Vec3::new(max_x, center.y, max_z),
            Vec3::new(max_x, center.y, min_z),
        ];

        Self::new(
            vertices,
            center.y - half_extents.y,
            center.y + half_extents.y,
            area,
        )
    }

    /// Creates a cylinder-shaped convex volume approximated by a polygon
    pub fn from_cylinder(
        center: Vec3,
        radius: f32,
        height: f32,
        segments: usize,
        area: u8,
    ) -> Result<Self> {
        if !(3..=MAX_CONVEXVOL_PTS).contains(&segments) {
            return Err(GeomError::InvalidVolume(format!(
                "Cylinder needs 3..={} segments, got {}",
                MAX_CONVEXVOL_PTS, segments
            )));
        }

        let angle_step = 2.0 * std::f32::consts::PI / segments as f32;
        let vertices = (0..segments)
            .map(|i| {
                let angle = i as f32 * angle_step;
                Vec3::new(
                    center.x + radius * angle.cos(),
                    center.y,
                    center.z + radius * angle.sin(),
                )
            })
            .collect();

        Self::new(
            vertices,
            center.y - height * 0.5,
            center.y + height * 0.5,
            area,
        )
    }

    /// The convex outline
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Number of outline vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Checks if a point is inside the volume
    pub fn contains_point(&self, point: Vec3) -> bool {
        if point.y < self.hmin || point.y > self.hmax {
            return false;
        }

        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        // Ray-casting test on the XZ plane
        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if ((vi.z > point.z) != (vj.z > point.z))
                && (point.x < (vj.x - vi.x) * (point.z - vi.z) / (vj.z - vi.z) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Axis-aligned bounds of the prism
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut bmin = Vec3::new(f32::MAX, self.hmin, f32::MAX);
        let mut bmax = Vec3::new(f32::MIN, self.hmax, f32::MIN);

        for v in &self.vertices {
            bmin.x = bmin.x.min(v.x);
            bmin.z = bmin.z.min(v.z);
            bmax.x = bmax.x.max(v.x);
            bmax.z = bmax.z.max(v.z);
        }

        (bmin, bmax)
    }

    /// Checks if the outline is a simple convex polygon on the XZ plane.
    ///
    /// Every non-zero turn must share one sign and the turns must add up to
    /// exactly one winding. Collinear runs are allowed, an outline with no
    /// turn at all is not.
    fn is_convex(vertices: &[Vec3]) -> bool {
        let n = vertices.len();
        let mut sign = 0.0f32;
        let mut winding = 0.0f32;

        for i in 0..n {
            let v1 = vertices[i];
            let v2 = vertices[(i + 1) % n];
            let v3 = vertices[(i + 2) % n];

            let (ex, ez) = (v2.x - v1.x, v2.z - v1.z);
            let (fx, fz) = (v3.x - v2.x, v3.z - v2.z);
            let cross = ex * fz - ez * fx;
            let dot = ex * fx + ez * fz;

            if cross != 0.0 {
                if sign == 0.0 {
                    sign = cross;
                } else if (cross > 0.0) != (sign > 0.0) {
                    return false;
                }
            }

            winding += cross.atan2(dot);
        }

        if sign == 0.0 {
            return false;
        }

        (winding.abs() - std::f32::consts::TAU).abs() < WINDING_EPSILON
    }
}

/// Ordered, bounded store of convex volumes
#[derive(Debug, Clone, Default)]
pub struct ConvexVolumeRegistry {
    volumes: Vec<ConvexVolume>,
}

impl ConvexVolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a volume, returning its index.
    ///
    /// Fails with [`GeomError::CapacityExceeded`] once [`MAX_VOLUMES`] volumes
    /// are stored; the registry is left unchanged.
    pub fn add(&mut self, volume: ConvexVolume) -> Result<usize> {
        if self.volumes.len() >= MAX_VOLUMES {
            return Err(GeomError::CapacityExceeded {
                kind: "convex volumes",
                max: MAX_VOLUMES,
            });
        }

        self.volumes.push(volume);
        Ok(self.volumes.len() - 1)
    }

    /// Removes the volume at `index`, keeping the order of the others
    pub fn remove(&mut self, index: usize) -> Result<ConvexVolume> {
        if index >= self.volumes.len() {
            return Err(GeomError::InvalidIndex {
                index,
                count: self.volumes.len(),
            });
        }
        Ok(self.volumes.remove(index))
    }

    pub fn clear(&mut self) {
        self.volumes.clear();
    }

    /// Active volumes in insertion order
    pub fn volumes(&self) -> &[ConvexVolume] {
        &self.volumes
    }

    pub fn count(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConvexVolume> {
        self.volumes.get(index)
    }

    /// Area type at `point`; later volumes override earlier ones
    pub fn area_at_point(&self, point: Vec3, default_area: u8) -> u8 {
        self.volumes
            .iter()
            .rev()
            .find(|volume| volume.contains_point(point))
            .map_or(default_area, |volume| volume.area)
    }
}
