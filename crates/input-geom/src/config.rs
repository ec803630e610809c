//! Build settings attached to an input geometry scene

use crate::{GeomError, Result};

/// Region partitioning strategy used by the downstream build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PartitionType {
    /// Watershed partitioning, best quality, slowest
    #[default]
    Watershed,
    /// Monotone partitioning, fastest, may produce long thin polygons
    Monotone,
    /// Layer partitioning, good for tiled builds with small tiles
    Layers,
}

/// Voxelization and meshing parameters, plus an explicit navmesh bounding box
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BuildSettings {
    /// Cell size in world units
    pub cell_size: f32,
    /// Cell height in world units
    pub cell_height: f32,
    /// Agent height in world units
    pub agent_height: f32,
    /// Agent radius in world units
    pub agent_radius: f32,
    /// Agent max climb in world units
    pub agent_max_climb: f32,
    /// Agent max slope in degrees
    pub agent_max_slope: f32,
    /// Region minimum size in voxels (sqrt of the minimum region area)
    pub region_min_size: f32,
    /// Region merge size in voxels (sqrt of the merge region area)
    pub region_merge_size: f32,
    /// Edge max length in world units
    pub edge_max_len: f32,
    /// Edge max error in voxels
    pub edge_max_error: f32,
    /// Max vertices per polygon
    pub verts_per_poly: f32,
    /// Detail sample distance in voxels
    pub detail_sample_dist: f32,
    /// Detail sample max error in voxel heights
    pub detail_sample_max_error: f32,
    /// Region partitioning strategy
    pub partition_type: PartitionType,
    /// Minimum corner of the area to mesh
    pub nav_mesh_bmin: [f32; 3],
    /// Maximum corner of the area to mesh
    pub nav_mesh_bmax: [f32; 3],
    /// Size of the tiles in voxels
    pub tile_size: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cell_size: 0.3,
            cell_height: 0.2,
            agent_height: 2.0,
            agent_radius: 0.6,
            agent_max_climb: 0.9,
            agent_max_slope: 45.0,
            region_min_size: 8.0,
            region_merge_size: 20.0,
            edge_max_len: 12.0,
            edge_max_error: 1.3,
            verts_per_poly: 6.0,
            detail_sample_dist: 6.0,
            detail_sample_max_error: 1.0,
            partition_type: PartitionType::Watershed,
            nav_mesh_bmin: [0.0; 3],
            nav_mesh_bmax: [0.0; 3],
            tile_size: 32.0,
        }
    }
}

impl BuildSettings {
    /// Creates settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the navmesh bounding box override
    pub fn with_nav_mesh_bounds(mut self, bmin: [f32; 3], bmax: [f32; 3]) -> Self {
        self.nav_mesh_bmin = bmin;
        self.nav_mesh_bmax = bmax;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32, cell_height: f32) -> Self {
        self.cell_size = cell_size;
        self.cell_height = cell_height;
        self
    }

    pub fn with_agent(mut self, height: f32, radius: f32, max_climb: f32, max_slope: f32) -> Self {
        self.agent_height = height;
        self.agent_radius = radius;
        self.agent_max_climb = max_climb;
        self.agent_max_slope = max_slope;
        self
    }

    pub fn with_partition_type(mut self, partition_type: PartitionType) -> Self {
        self.partition_type = partition_type;
        self
    }

    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// The navmesh bounding box override as `(bmin, bmax)`
    pub fn nav_mesh_bounds(&self) -> ([f32; 3], [f32; 3]) {
        (self.nav_mesh_bmin, self.nav_mesh_bmax)
    }

    /// Validates the parameters
    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0.0 || self.cell_height <= 0.0 {
            return Err(GeomError::InvalidSettings(
                "Invalid cell size or height".to_string(),
            ));
        }

        if !(0.0..=90.0).contains(&self.agent_max_slope) {
            return Err(GeomError::InvalidSettings(
                "Invalid agent max slope".to_string(),
            ));
        }

        if self.agent_height < 0.0 || self.agent_radius < 0.0 || self.agent_max_climb < 0.0 {
            return Err(GeomError::InvalidSettings(
                "Agent dimensions must not be negative".to_string(),
            ));
        }

        if self.verts_per_poly < 3.0 {
            return Err(GeomError::InvalidSettings(
                "Too few vertices per polygon".to_string(),
            ));
        }

        if (0..3).any(|i| self.nav_mesh_bmin[i] > self.nav_mesh_bmax[i]) {
            return Err(GeomError::InvalidSettings(format!(
                "Navmesh bounds are inverted: min={:?}, max={:?}",
                self.nav_mesh_bmin, self.nav_mesh_bmax
            )));
        }

        Ok(())
    }
}

#[cfg(feature = "serialization")]
impl BuildSettings {
    /// Parses settings from JSON; missing fields take their default values
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GeomError::InvalidSettings(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GeomError::InvalidSettings(e.to_string()))
    }

    /// Loads settings from a JSON file
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GeomError::InvalidSettings(format!("could not read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Saves settings to a JSON file
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?).map_err(|e| {
            GeomError::InvalidSettings(format!("could not write '{}': {}", path.display(), e))
        })
    }
}
