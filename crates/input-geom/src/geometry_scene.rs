//! Input geometry scene: the mesh, its chunky triangle index and the
//! annotations authored on top of it
//!
//! The scene is the single object the navmesh build reads its input from.
//! Loading a mesh replaces the mesh, its bounds and its spatial index as one
//! unit and clears all annotations, since volumes and off-mesh connections
//! are placed relative to a specific mesh.

use std::path::{Path, PathBuf};

use glam::Vec3;
use recast_common::{
    intersect_segment_aabb, intersect_segment_triangle, ChunkyTriMesh, MeshSource, ObjMeshSource,
    TriMesh,
};

use crate::{
    BuildContext, BuildSettings, ConvexVolume, ConvexVolumeRegistry, GeomError, GeometryFormat,
    OffMeshConnection, OffMeshConnectionRegistry, Result, TimerCategory,
};

/// Maximum number of triangles per leaf of the chunky triangle index
pub const TRIS_PER_CHUNK: usize = 256;

const STAGE_LOAD: &str = "load";
const STAGE_LOAD_MESH: &str = "load_mesh";
const STAGE_SPATIAL_INDEX: &str = "spatial_index";

/// A mesh together with everything derived from it
#[derive(Debug)]
struct LoadedMesh {
    mesh: TriMesh,
    bmin: [f32; 3],
    bmax: [f32; 3],
    chunky_mesh: ChunkyTriMesh,
}

/// Aggregate of the input mesh, its spatial index, convex volumes, off-mesh
/// connections and optional build settings
#[derive(Debug, Default)]
pub struct GeometryScene {
    loaded: Option<LoadedMesh>,
    volumes: ConvexVolumeRegistry,
    off_mesh_connections: OffMeshConnectionRegistry,
    build_settings: Option<BuildSettings>,
}

impl GeometryScene {
    /// Creates an empty scene: no mesh, no index, no annotations, no settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads input geometry from `path`, choosing the loader by extension.
    ///
    /// Only `.obj` meshes are supported. Any other extension fails with
    /// [`GeomError::UnsupportedFormat`] and leaves the scene untouched. Once
    /// the mesh loader is entered the previous mesh and all annotations are
    /// discarded, so any later failure leaves the scene without a mesh.
    pub fn load<P: AsRef<Path>>(&mut self, ctx: &mut BuildContext, path: P) -> Result<()> {
        self.load_with(ctx, &mut ObjMeshSource, path)
    }

    /// Same as [`GeometryScene::load`] with a caller-provided mesh source
    pub fn load_with<S, P>(&mut self, ctx: &mut BuildContext, source: &mut S, path: P) -> Result<()>
    where
        S: MeshSource + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        let format = GeometryFormat::from_path(path);
        if !format.is_supported() {
            let message = match format {
                GeometryFormat::GeomSet => {
                    format!("gset input geometry not implemented: '{}'", path.display())
                }
                _ => format!("Unrecognized input geometry format: '{}'", path.display()),
            };
            ctx.log_error_with_category(message, STAGE_LOAD);
            return Err(GeomError::UnsupportedFormat {
                path: path.to_path_buf(),
                format,
            });
        }

        ctx.start_timer(TimerCategory::Total);
        let result = self.load_mesh_from(ctx, source, path);
        ctx.stop_timer(TimerCategory::Total);
        result
    }

    /// Installs an already parsed mesh, as if it had been loaded from `name`.
    ///
    /// Annotations are cleared and the chunky mesh is rebuilt exactly as in
    /// [`GeometryScene::load`].
    pub fn load_mesh<P: AsRef<Path>>(
        &mut self,
        ctx: &mut BuildContext,
        mesh: TriMesh,
        name: P,
    ) -> Result<()> {
        self.reset_for_load();
        self.install_mesh(ctx, mesh, name.as_ref())
    }

    fn load_mesh_from<S>(&mut self, ctx: &mut BuildContext, source: &mut S, path: &Path) -> Result<()>
    where
        S: MeshSource + ?Sized,
    {
        self.reset_for_load();

        ctx.start_timer(TimerCategory::LoadMesh);
        let loaded = source.load(path);
        ctx.stop_timer(TimerCategory::LoadMesh);

        let mesh = match loaded {
            Ok(mesh) => mesh,
            Err(recast_common::Error::OutOfMemory(reason)) => {
                ctx.log_error_with_category(
                    format!("Out of memory loading '{}': {}", path.display(), reason),
                    STAGE_LOAD_MESH,
                );
                return Err(GeomError::AllocationFailure {
                    path: path.to_path_buf(),
                    reason,
                });
            }
            Err(err) => {
                ctx.log_error_with_category(
                    format!("Could not load '{}': {}", path.display(), err),
                    STAGE_LOAD_MESH,
                );
                return Err(GeomError::ParseFailure {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        self.install_mesh(ctx, mesh, path)
    }

    /// Drops the current mesh and index and clears the annotations
    fn reset_for_load(&mut self) {
        self.loaded = None;
        self.volumes.clear();
        self.off_mesh_connections.clear();
    }

    /// Computes bounds and the chunky mesh, then installs all three together
    fn install_mesh(&mut self, ctx: &mut BuildContext, mesh: TriMesh, path: &Path) -> Result<()> {
        let (bmin, bmax) = mesh.calculate_bounds();

        ctx.start_timer(TimerCategory::SpatialIndex);
        let chunky_mesh =
            ChunkyTriMesh::build(&mesh.vertices, &mesh.indices, mesh.tri_count, TRIS_PER_CHUNK);
        ctx.stop_timer(TimerCategory::SpatialIndex);

        let chunky_mesh = match chunky_mesh {
            Ok(chunky_mesh) => chunky_mesh,
            Err(source) => {
                ctx.log_error_with_category(
                    format!("Failed to build chunky mesh for '{}': {}", path.display(), source),
                    STAGE_SPATIAL_INDEX,
                );
                return Err(GeomError::IndexBuildFailure {
                    path: PathBuf::from(path),
                    source,
                });
            }
        };

        ctx.log_info_with_category(
            format!(
                "Loaded '{}': {} vertices, {} triangles, {} chunks",
                path.display(),
                mesh.vert_count,
                mesh.tri_count,
                chunky_mesh.node_count()
            ),
            STAGE_LOAD_MESH,
        );

        self.loaded = Some(LoadedMesh {
            mesh,
            bmin: bmin.to_array(),
            bmax: bmax.to_array(),
            chunky_mesh,
        });
        Ok(())
    }

    /// The loaded mesh, if any
    pub fn mesh(&self) -> Option<&TriMesh> {
        self.loaded.as_ref().map(|loaded| &loaded.mesh)
    }

    pub fn has_mesh(&self) -> bool {
        self.loaded.is_some()
    }

    /// Bounds computed from the loaded mesh's vertices
    pub fn mesh_bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        self.loaded.as_ref().map(|loaded| (loaded.bmin, loaded.bmax))
    }

    /// Bounds the navmesh should be built over.
    ///
    /// The build settings' explicit box when settings are attached, the mesh
    /// bounds otherwise. Evaluated on every call.
    pub fn nav_mesh_bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        match &self.build_settings {
            Some(settings) => Some(settings.nav_mesh_bounds()),
            None => self.mesh_bounds(),
        }
    }

    /// The chunky triangle index over the loaded mesh, if any
    pub fn chunky_mesh(&self) -> Option<&ChunkyTriMesh> {
        self.loaded.as_ref().map(|loaded| &loaded.chunky_mesh)
    }

    pub fn build_settings(&self) -> Option<&BuildSettings> {
        self.build_settings.as_ref()
    }

    /// Attaches build settings, returning the previous ones
    pub fn set_build_settings(&mut self, settings: BuildSettings) -> Option<BuildSettings> {
        self.build_settings.replace(settings)
    }

    pub fn clear_build_settings(&mut self) -> Option<BuildSettings> {
        self.build_settings.take()
    }

    /// Active convex volumes in insertion order
    pub fn convex_volumes(&self) -> &[ConvexVolume] {
        self.volumes.volumes()
    }

    pub fn convex_volume_count(&self) -> usize {
        self.volumes.count()
    }

    pub fn convex_volume_registry(&self) -> &ConvexVolumeRegistry {
        &self.volumes
    }

    pub fn convex_volume_registry_mut(&mut self) -> &mut ConvexVolumeRegistry {
        &mut self.volumes
    }

    pub fn add_convex_volume(&mut self, volume: ConvexVolume) -> Result<usize> {
        self.volumes.add(volume)
    }

    pub fn delete_convex_volume(&mut self, index: usize) -> Result<ConvexVolume> {
        self.volumes.remove(index)
    }

    /// Active off-mesh connections in insertion order
    pub fn off_mesh_connections(&self) -> &[OffMeshConnection] {
        self.off_mesh_connections.connections()
    }

    pub fn off_mesh_connection_count(&self) -> usize {
        self.off_mesh_connections.count()
    }

    pub fn off_mesh_connection_registry(&self) -> &OffMeshConnectionRegistry {
        &self.off_mesh_connections
    }

    pub fn off_mesh_connection_registry_mut(&mut self) -> &mut OffMeshConnectionRegistry {
        &mut self.off_mesh_connections
    }

    pub fn add_off_mesh_connection(&mut self, connection: OffMeshConnection) -> Result<usize> {
        self.off_mesh_connections.add(connection)
    }

    pub fn delete_off_mesh_connection(&mut self, index: usize) -> Result<OffMeshConnection> {
        self.off_mesh_connections.remove(index)
    }

    /// Casts the segment `src`-`dst` against the mesh.
    ///
    /// Returns the parametric distance of the nearest front-facing hit in
    /// `[0, 1)`, or `None` without a mesh or a hit.
    pub fn raycast_mesh(&self, src: Vec3, dst: Vec3) -> Option<f32> {
        let loaded = self.loaded.as_ref()?;

        // Prune the segment to the mesh bounds
        let (btmin, btmax) =
            intersect_segment_aabb(&src.to_array(), &dst.to_array(), &loaded.bmin, &loaded.bmax)?;
        let dir = dst - src;
        let p = [src.x + dir.x * btmin, src.z + dir.z * btmin];
        let q = [src.x + dir.x * btmax, src.z + dir.z * btmax];

        let mut tmin = 1.0f32;
        let mut hit = false;

        for id in loaded.chunky_mesh.chunks_overlapping_segment(&p, &q) {
            for tri in loaded.chunky_mesh.node_tris(id).chunks_exact(3) {
                let a = loaded.mesh.vertex(tri[0] as usize);
                let b = loaded.mesh.vertex(tri[1] as usize);
                let c = loaded.mesh.vertex(tri[2] as usize);

                if let Some(t) = intersect_segment_triangle(src, dst, a, b, c) {
                    if t < tmin {
                        tmin = t;
                        hit = true;
                    }
                }
            }
        }

        hit.then_some(tmin)
    }
}
