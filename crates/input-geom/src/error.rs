//! Errors reported by the input geometry scene

use std::path::PathBuf;

use crate::GeometryFormat;

/// Failure outcomes of scene loading and annotation editing
#[derive(thiserror::Error, Debug)]
pub enum GeomError {
    #[error("unsupported input geometry format {format:?} for '{}'", path.display())]
    UnsupportedFormat {
        path: PathBuf,
        format: GeometryFormat,
    },

    #[error("out of memory while loading '{}': {reason}", path.display())]
    AllocationFailure { path: PathBuf, reason: String },

    #[error("could not load '{}': {source}", path.display())]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: recast_common::Error,
    },

    #[error("failed to build chunky mesh for '{}': {source}", path.display())]
    IndexBuildFailure {
        path: PathBuf,
        #[source]
        source: recast_common::Error,
    },

    #[error("too many {kind} (max: {max})")]
    CapacityExceeded { kind: &'static str, max: usize },

    #[error("index {index} out of range (count: {count})")]
    InvalidIndex { index: usize, count: usize },

    #[error("invalid convex volume: {0}")]
    InvalidVolume(String),

    #[error("invalid build settings: {0}")]
    InvalidSettings(String),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, GeomError>;
