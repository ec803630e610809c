//! CLI utility for inspecting navmesh input geometry

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::{Path, PathBuf};

use input_geom::{BuildContext, BuildSettings, GeometryScene, LogLevel, TimerCategory};

/// A CLI utility for loading and inspecting navmesh input geometry
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load input geometry and print a summary of the scene
    Inspect {
        /// Input geometry file (.obj)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Build settings file (JSON)
        #[clap(long, value_parser)]
        settings: Option<PathBuf>,

        /// Segment to cast against the mesh (sx,sy,sz:ex,ey,ez)
        #[clap(long, value_parser = parse_segment)]
        raycast: Option<Segment>,

        /// Print debug messages and stage timings
        #[clap(long)]
        verbose: bool,
    },

    /// Write default build settings to a JSON file
    DefaultSettings {
        /// Output settings file
        #[clap(long, value_parser)]
        output: PathBuf,
    },
}

/// A segment given on the command line
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: Vec3,
    end: Vec3,
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();

    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].trim().parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

/// Parse a segment written as two vectors separated by a colon
fn parse_segment(s: &str) -> Result<Segment, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| "Segment must be written as sx,sy,sz:ex,ey,ez".to_string())?;

    Ok(Segment {
        start: parse_vector(start)?,
        end: parse_vector(end)?,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Inspect {
            input,
            settings,
            raycast,
            verbose,
        } => inspect(&input, settings.as_deref(), raycast, verbose),
        Commands::DefaultSettings { output } => write_default_settings(&output),
    }
}

/// Load input geometry and print what the scene holds
fn inspect(
    input: &Path,
    settings_path: Option<&Path>,
    raycast: Option<Segment>,
    verbose: bool,
) -> Result<()> {
    let mut ctx = BuildContext::new();
    if verbose {
        ctx.set_log_level(LogLevel::Debug);
    }

    let mut scene = GeometryScene::new();

    if let Some(path) = settings_path {
        let settings = BuildSettings::load_json(path)
            .with_context(|| format!("Failed to read build settings from {}", path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid build settings: {}", e))?;
        scene.set_build_settings(settings);
    }

    println!("Loading input geometry from {}...", input.display());

    if let Err(e) = scene.load(&mut ctx, input) {
        ctx.print_logs();
        return Err(anyhow!("Failed to load input geometry: {}", e));
    }

    let mesh = scene
        .mesh()
        .ok_or_else(|| anyhow!("Scene has no mesh after loading"))?;
    println!(
        "Mesh loaded: {} vertices, {} triangles",
        mesh.vert_count, mesh.tri_count
    );

    if let Some(chunky) = scene.chunky_mesh() {
        println!(
            "Chunky mesh: {} nodes, {} triangles, max {} per chunk",
            chunky.node_count(),
            chunky.tri_count(),
            chunky.max_tris_per_chunk()
        );
    }

    if let Some((bmin, bmax)) = scene.mesh_bounds() {
        println!("Mesh bounds: min={:?}, max={:?}", bmin, bmax);
    }

    match (scene.build_settings(), scene.nav_mesh_bounds()) {
        (Some(settings), Some((bmin, bmax))) => {
            println!(
                "Build settings: cell size {}, cell height {}, partition {:?}",
                settings.cell_size, settings.cell_height, settings.partition_type
            );
            println!("Navmesh bounds (from settings): min={:?}, max={:?}", bmin, bmax);
        }
        (None, Some((bmin, bmax))) => {
            println!("Navmesh bounds (from mesh): min={:?}, max={:?}", bmin, bmax);
        }
        _ => {}
    }

    if let Some(segment) = raycast {
        ctx.start_timer(TimerCategory::Raycast);
        let hit = scene.raycast_mesh(segment.start, segment.end);
        ctx.stop_timer(TimerCategory::Raycast);

        match hit {
            Some(t) => {
                let point = segment.start.lerp(segment.end, t);
                println!("Raycast hit at t={:.4}: {:?}", t, point);
            }
            None => println!("Raycast missed the mesh"),
        }
    }

    if verbose {
        ctx.print_logs();
        ctx.print_timer_summary();
    }

    Ok(())
}

/// Write default build settings to a JSON file
fn write_default_settings(output: &Path) -> Result<()> {
    BuildSettings::new()
        .save_json(output)
        .with_context(|| format!("Failed to write build settings to {}", output.display()))?;

    println!("Saved default build settings to {}", output.display());
    Ok(())
}
