//! Scene-level tests: loading, reset semantics, bounds and raycasts

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use glam::Vec3;
    use recast_common::{MeshSource, TriMesh};
    use tempfile::NamedTempFile;

    use crate::{
        BuildContext, BuildSettings, ConvexVolume, GeomError, GeometryFormat, GeometryScene,
        LogLevel, OffMeshConnection, OffMeshDirection, OffMeshFlags, TimerCategory,
        MAX_OFFMESH_CONNECTIONS, MAX_VOLUMES,
    };

    /// 10x10 quad on the y = 0 plane, wound to face +Y
    const QUAD_OBJ: &str = r#"
# ground quad
v 0.0 0.0 0.0
v 10.0 0.0 0.0
v 10.0 0.0 10.0
v 0.0 0.0 10.0
f 1 4 2
f 2 4 3
"#;

    /// Quad with a raised step covering x in [0, 5]
    const STEP_OBJ: &str = r#"
v 0.0 0.0 0.0
v 10.0 0.0 0.0
v 10.0 0.0 10.0
v 0.0 0.0 10.0
v 0.0 2.0 0.0
v 5.0 2.0 0.0
v 5.0 2.0 10.0
v 0.0 2.0 10.0
f 1 4 2
f 2 4 3
f 5 8 6
f 6 8 7
"#;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn loaded_scene(ctx: &mut BuildContext, content: &str) -> (GeometryScene, NamedTempFile) {
        let file = write_temp(".obj", content);
        let mut scene = GeometryScene::new();
        scene.load(ctx, file.path()).unwrap();
        (scene, file)
    }

    fn jump(user_id: u32) -> OffMeshConnection {
        OffMeshConnection::new(
            [1.0, 0.0, 1.0],
            [3.0, 0.0, 1.0],
            0.5,
            OffMeshDirection::OneWay,
            1,
            OffMeshFlags::JUMP,
            user_id,
        )
    }

    fn water() -> ConvexVolume {
        ConvexVolume::from_box(Vec3::new(5.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 1.0), 2).unwrap()
    }

    /// Mesh source that always runs out of memory
    struct ExhaustedSource;

    impl MeshSource for ExhaustedSource {
        fn load(&mut self, _path: &Path) -> recast_common::Result<TriMesh> {
            Err(recast_common::Error::OutOfMemory(
                "vertex buffer reservation failed".to_string(),
            ))
        }
    }

    /// Mesh source that serves a fixed mesh regardless of the path
    struct FixedSource(TriMesh);

    impl MeshSource for FixedSource {
        fn load(&mut self, _path: &Path) -> recast_common::Result<TriMesh> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene = GeometryScene::new();

        assert!(!scene.has_mesh());
        assert!(scene.mesh().is_none());
        assert!(scene.chunky_mesh().is_none());
        assert!(scene.mesh_bounds().is_none());
        assert!(scene.nav_mesh_bounds().is_none());
        assert!(scene.build_settings().is_none());
        assert_eq!(scene.convex_volume_count(), 0);
        assert_eq!(scene.off_mesh_connection_count(), 0);
    }

    #[test]
    fn test_load_obj() {
        let mut ctx = BuildContext::new();
        let (scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        let mesh = scene.mesh().unwrap();
        assert_eq!(mesh.vert_count, 4);
        assert_eq!(mesh.tri_count, 2);

        assert_eq!(
            scene.mesh_bounds(),
            Some(([0.0, 0.0, 0.0], [10.0, 0.0, 10.0]))
        );

        let chunky = scene.chunky_mesh().unwrap();
        assert_eq!(chunky.tri_count(), 2);
        assert_eq!(chunky.node_count(), 1);
        assert!(!ctx.has_errors());
        assert_eq!(ctx.get_logs_by_category("load_mesh").len(), 1);
    }

    #[test]
    fn test_load_uppercase_extension() {
        let mut ctx = BuildContext::new();
        let file = write_temp(".OBJ", QUAD_OBJ);
        let mut scene = GeometryScene::new();

        scene.load(&mut ctx, file.path()).unwrap();
        assert!(scene.has_mesh());
    }

    #[test]
    fn test_load_records_timers() {
        let mut ctx = BuildContext::new();
        let (_scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        assert_eq!(ctx.get_timer_count(&TimerCategory::Total), 1);
        assert_eq!(ctx.get_timer_count(&TimerCategory::LoadMesh), 1);
        assert_eq!(ctx.get_timer_count(&TimerCategory::SpatialIndex), 1);
        assert!(ctx.get_timer_duration(&TimerCategory::Total).is_some());
    }

    #[test]
    fn test_geomset_is_unsupported() {
        let mut ctx = BuildContext::new();
        let file = write_temp(".gset", "f test.obj\n");
        let mut scene = GeometryScene::new();

        let err = scene.load(&mut ctx, file.path()).unwrap_err();
        assert!(matches!(
            err,
            GeomError::UnsupportedFormat {
                format: GeometryFormat::GeomSet,
                ..
            }
        ));
        assert!(!scene.has_mesh());
        assert!(scene.chunky_mesh().is_none());

        let errors = ctx.get_logs_by_level(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category.as_deref(), Some("load"));
        assert!(errors[0].message.contains("gset"));
    }

    #[test]
    fn test_unsupported_format_keeps_previous_scene() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);
        scene.add_convex_volume(water()).unwrap();
        scene.add_off_mesh_connection(jump(7)).unwrap();

        let err = scene.load(&mut ctx, "level.gset").unwrap_err();
        assert!(matches!(err, GeomError::UnsupportedFormat { .. }));

        let err = scene.load(&mut ctx, "level.fbx").unwrap_err();
        assert!(matches!(
            err,
            GeomError::UnsupportedFormat {
                format: GeometryFormat::Unknown,
                ..
            }
        ));

        // Dispatch failed before the mesh loader ran
        assert!(scene.has_mesh());
        assert_eq!(scene.mesh().unwrap().tri_count, 2);
        assert_eq!(scene.convex_volume_count(), 1);
        assert_eq!(scene.off_mesh_connection_count(), 1);
        assert_eq!(ctx.get_logs_by_category("load").len(), 2);
    }

    #[test]
    fn test_missing_extension_is_unsupported() {
        let mut ctx = BuildContext::new();
        let mut scene = GeometryScene::new();

        let err = scene.load(&mut ctx, "level").unwrap_err();
        assert!(matches!(
            err,
            GeomError::UnsupportedFormat {
                format: GeometryFormat::Unknown,
                ..
            }
        ));
        assert_eq!(ctx.get_timer_count(&TimerCategory::LoadMesh), 0);
    }

    #[test]
    fn test_parse_failure_clears_scene() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);
        scene.add_convex_volume(water()).unwrap();
        scene.add_off_mesh_connection(jump(1)).unwrap();

        let broken = write_temp(".obj", "v 0.0 0.0\nf 1 2 3\n");
        let err = scene.load(&mut ctx, broken.path()).unwrap_err();

        match err {
            GeomError::ParseFailure { path, source } => {
                assert_eq!(path, broken.path());
                assert!(source.to_string().contains("line 1"));
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }

        assert!(!scene.has_mesh());
        assert!(scene.chunky_mesh().is_none());
        assert!(scene.mesh_bounds().is_none());
        assert_eq!(scene.convex_volume_count(), 0);
        assert_eq!(scene.off_mesh_connection_count(), 0);
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_missing_file_is_parse_failure() {
        let mut ctx = BuildContext::new();
        let dir = tempfile::tempdir().unwrap();
        let mut scene = GeometryScene::new();

        let err = scene
            .load(&mut ctx, dir.path().join("missing.obj"))
            .unwrap_err();
        assert!(matches!(
            err,
            GeomError::ParseFailure {
                source: recast_common::Error::Io(_),
                ..
            }
        ));
        assert!(!scene.has_mesh());
    }

    #[test]
    fn test_allocation_failure() {
        let mut ctx = BuildContext::new();
        let mut scene = GeometryScene::new();

        let err = scene
            .load_with(&mut ctx, &mut ExhaustedSource, "huge.obj")
            .unwrap_err();
        match err {
            GeomError::AllocationFailure { reason, .. } => {
                assert!(reason.contains("reservation"));
            }
            other => panic!("expected AllocationFailure, got {:?}", other),
        }

        assert!(!scene.has_mesh());
        assert_eq!(ctx.get_logs_by_category("load_mesh").len(), 1);
    }

    #[test]
    fn test_out_of_range_face_is_parse_failure() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        // Face references a vertex that does not exist
        let bad = write_temp(".obj", "v 0 0 0\nv 1 0 0\nv 0 0 1\nf 1 2 9\n");
        let err = scene.load(&mut ctx, bad.path()).unwrap_err();

        match err {
            GeomError::ParseFailure { source, .. } => {
                assert!(source.to_string().contains("line 4"));
            }
            other => panic!("expected ParseFailure, got {:?}", other),
        }
        assert!(!scene.has_mesh());
        assert!(scene.chunky_mesh().is_none());
    }

    #[test]
    fn test_index_build_failure() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        // A source handing over buffers whose indices point past the vertices
        let mesh = TriMesh::from_buffers(vec![0.0; 9], vec![0, 1, 9]).unwrap();
        let err = scene
            .load_with(&mut ctx, &mut FixedSource(mesh), "broken.obj")
            .unwrap_err();

        assert!(matches!(err, GeomError::IndexBuildFailure { .. }));
        assert!(!scene.has_mesh());
        assert!(scene.mesh().is_none());
        assert!(scene.chunky_mesh().is_none());

        let errors = ctx.get_logs_by_category("spatial_index");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].level, LogLevel::Error);
    }

    #[test]
    fn test_load_with_custom_source() {
        let mut ctx = BuildContext::new();
        let mesh = TriMesh::from_obj_str(STEP_OBJ).unwrap();
        let mut source = FixedSource(mesh);
        let mut scene = GeometryScene::new();

        scene
            .load_with(&mut ctx, &mut source, "virtual/step.obj")
            .unwrap();
        assert_eq!(scene.mesh().unwrap().tri_count, 4);
        assert_eq!(
            scene.mesh_bounds(),
            Some(([0.0, 0.0, 0.0], [10.0, 2.0, 10.0]))
        );

        // The extension still decides whether the source is consulted
        let err = scene
            .load_with(&mut ctx, &mut source, "virtual/step.gset")
            .unwrap_err();
        assert!(matches!(err, GeomError::UnsupportedFormat { .. }));
        assert!(scene.has_mesh());
    }

    #[test]
    fn test_load_mesh_directly() {
        let mut ctx = BuildContext::new();
        let mut scene = GeometryScene::new();
        scene.add_off_mesh_connection(jump(3)).unwrap();

        let mesh =
            TriMesh::from_buffers(vec![0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 4.0, 1.0, 0.0], vec![0, 1, 2])
                .unwrap();
        scene.load_mesh(&mut ctx, mesh, "generated").unwrap();

        assert!(scene.has_mesh());
        assert_eq!(scene.chunky_mesh().unwrap().tri_count(), 1);
        assert_eq!(
            scene.mesh_bounds(),
            Some(([0.0, 1.0, 0.0], [4.0, 1.0, 4.0]))
        );
        assert_eq!(scene.off_mesh_connection_count(), 0);
    }

    #[test]
    fn test_reload_resets_annotations() {
        let mut ctx = BuildContext::new();
        let (mut scene, file) = loaded_scene(&mut ctx, QUAD_OBJ);

        scene.add_convex_volume(water()).unwrap();
        scene.add_convex_volume(water()).unwrap();
        scene.add_off_mesh_connection(jump(1)).unwrap();
        scene.set_build_settings(BuildSettings::new());

        scene.load(&mut ctx, file.path()).unwrap();

        assert!(scene.has_mesh());
        assert_eq!(scene.convex_volume_count(), 0);
        assert_eq!(scene.off_mesh_connection_count(), 0);
        // Settings are not tied to a mesh
        assert!(scene.build_settings().is_some());
    }

    #[test]
    fn test_index_present_iff_mesh_present() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, STEP_OBJ);
        assert_eq!(scene.has_mesh(), scene.chunky_mesh().is_some());

        let _ = scene.load(&mut ctx, "broken.obj");
        assert_eq!(scene.has_mesh(), scene.chunky_mesh().is_some());
        assert!(!scene.has_mesh());
    }

    #[test]
    fn test_nav_mesh_bounds_falls_back_to_mesh() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        assert_eq!(scene.nav_mesh_bounds(), scene.mesh_bounds());

        let settings =
            BuildSettings::new().with_nav_mesh_bounds([2.0, -1.0, 2.0], [8.0, 3.0, 8.0]);
        assert!(scene.set_build_settings(settings).is_none());
        assert_eq!(
            scene.nav_mesh_bounds(),
            Some(([2.0, -1.0, 2.0], [8.0, 3.0, 8.0]))
        );
        // Mesh bounds are unaffected by the override
        assert_eq!(
            scene.mesh_bounds(),
            Some(([0.0, 0.0, 0.0], [10.0, 0.0, 10.0]))
        );

        let previous = scene.clear_build_settings().unwrap();
        assert_eq!(previous.nav_mesh_bmin, [2.0, -1.0, 2.0]);
        assert_eq!(scene.nav_mesh_bounds(), scene.mesh_bounds());
    }

    #[test]
    fn test_zero_bounds_settings_still_override() {
        let mut ctx = BuildContext::new();
        let (mut scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        scene.set_build_settings(BuildSettings::new());
        assert_eq!(
            scene.nav_mesh_bounds(),
            Some(([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn test_nav_mesh_bounds_without_mesh() {
        let mut scene = GeometryScene::new();
        scene.set_build_settings(
            BuildSettings::new().with_nav_mesh_bounds([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
        );

        assert!(scene.mesh_bounds().is_none());
        assert_eq!(
            scene.nav_mesh_bounds(),
            Some(([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]))
        );
    }

    #[test]
    fn test_scene_volume_capacity() {
        let mut scene = GeometryScene::new();

        for i in 0..MAX_VOLUMES {
            assert_eq!(scene.add_convex_volume(water()).unwrap(), i);
        }
        assert!(matches!(
            scene.add_convex_volume(water()),
            Err(GeomError::CapacityExceeded { max: MAX_VOLUMES, .. })
        ));
        assert_eq!(scene.convex_volume_count(), MAX_VOLUMES);

        scene.delete_convex_volume(0).unwrap();
        assert!(scene.add_convex_volume(water()).is_ok());
    }

    #[test]
    fn test_scene_off_mesh_capacity() {
        let mut scene = GeometryScene::new();

        for i in 0..MAX_OFFMESH_CONNECTIONS {
            scene.add_off_mesh_connection(jump(i as u32)).unwrap();
        }
        assert!(matches!(
            scene.add_off_mesh_connection(jump(999)),
            Err(GeomError::CapacityExceeded { .. })
        ));

        let removed = scene.delete_off_mesh_connection(10).unwrap();
        assert_eq!(removed.user_id, 10);
        assert_eq!(scene.off_mesh_connections()[10].user_id, 11);
        assert!(matches!(
            scene.delete_off_mesh_connection(MAX_OFFMESH_CONNECTIONS),
            Err(GeomError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_raycast_hit() {
        let mut ctx = BuildContext::new();
        let (scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        let t = scene
            .raycast_mesh(Vec3::new(5.0, 10.0, 5.0), Vec3::new(5.0, -10.0, 5.0))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-5);

        let t = scene
            .raycast_mesh(Vec3::new(1.0, 4.0, 1.0), Vec3::new(9.0, -4.0, 9.0))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_nearest_hit() {
        let mut ctx = BuildContext::new();
        let (scene, _file) = loaded_scene(&mut ctx, STEP_OBJ);

        // The step at y = 2 is hit before the ground
        let t = scene
            .raycast_mesh(Vec3::new(2.0, 10.0, 5.0), Vec3::new(2.0, 0.0, 5.0))
            .unwrap();
        assert!((t - 0.8).abs() < 1e-5);

        // Past the step only the ground is below
        let t = scene
            .raycast_mesh(Vec3::new(8.0, 10.0, 5.0), Vec3::new(8.0, -10.0, 5.0))
            .unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_miss() {
        let mut ctx = BuildContext::new();
        let (scene, _file) = loaded_scene(&mut ctx, QUAD_OBJ);

        // Outside the mesh footprint
        assert!(scene
            .raycast_mesh(Vec3::new(20.0, 10.0, 5.0), Vec3::new(20.0, -10.0, 5.0))
            .is_none());
        // Stops above the surface
        assert!(scene
            .raycast_mesh(Vec3::new(5.0, 10.0, 5.0), Vec3::new(5.0, 1.0, 5.0))
            .is_none());
        // Back faces are ignored
        assert!(scene
            .raycast_mesh(Vec3::new(5.0, -10.0, 5.0), Vec3::new(5.0, 10.0, 5.0))
            .is_none());
    }

    #[test]
    fn test_raycast_without_mesh() {
        let scene = GeometryScene::new();
        assert!(scene
            .raycast_mesh(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_area_at_point_through_registry() {
        let mut scene = GeometryScene::new();
        scene.add_convex_volume(water()).unwrap();

        let registry = scene.convex_volume_registry();
        assert_eq!(registry.area_at_point(Vec3::new(5.0, 0.5, 5.0), 63), 2);
        assert_eq!(registry.area_at_point(Vec3::new(0.0, 0.5, 0.0), 63), 63);

        scene.convex_volume_registry_mut().clear();
        assert_eq!(scene.convex_volume_count(), 0);
    }
}
