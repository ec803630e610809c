//! Input geometry staging for navigation mesh generation
//!
//! A [`GeometryScene`] collects everything a navmesh build consumes besides
//! the build algorithm itself: the triangle mesh loaded from disk, a chunky
//! triangle index over it, designer-authored convex volumes and off-mesh
//! connections, and optional [`BuildSettings`].
//!
//! # Example
//!
//! ```no_run
//! use input_geom::{BuildContext, BuildSettings, ConvexVolume, GeometryScene};
//! use glam::Vec3;
//!
//! # fn example() -> input_geom::Result<()> {
//! let mut ctx = BuildContext::new();
//! let mut scene = GeometryScene::new();
//! scene.load(&mut ctx, "level.obj")?;
//!
//! // Mark a pool as water (area 2)
//! scene.add_convex_volume(ConvexVolume::from_box(
//!     Vec3::new(4.0, 0.0, 4.0),
//!     Vec3::new(2.0, 1.0, 2.0),
//!     2,
//! )?)?;
//!
//! // Without settings the navmesh covers the whole mesh
//! assert_eq!(scene.nav_mesh_bounds(), scene.mesh_bounds());
//!
//! scene.set_build_settings(
//!     BuildSettings::new().with_nav_mesh_bounds([0.0, -1.0, 0.0], [8.0, 4.0, 8.0]),
//! );
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod convex_volume;
mod error;
mod format;
mod geometry_scene;
mod off_mesh;

#[cfg(test)]
mod geometry_scene_tests;

pub use config::{BuildSettings, PartitionType};
pub use context::{BuildContext, LogEntry, LogLevel, TimerCategory, TimerEntry};
pub use convex_volume::{ConvexVolume, ConvexVolumeRegistry, MAX_CONVEXVOL_PTS, MAX_VOLUMES};
pub use error::{GeomError, Result};
pub use format::GeometryFormat;
pub use geometry_scene::{GeometryScene, TRIS_PER_CHUNK};
pub use off_mesh::{
    OffMeshConnection, OffMeshConnectionRegistry, OffMeshDirection, OffMeshFlags,
    MAX_OFFMESH_CONNECTIONS,
};

pub use recast_common::{ChunkyTriMesh, ChunkyTriMeshNode, MeshSource, ObjMeshSource, TriMesh};
