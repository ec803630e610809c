//! Common utilities and data structures shared by the input geometry layer
//!
//! This crate holds the collaborators the scene aggregate is built on: the
//! triangle mesh reader, the bounds calculator and the chunked triangle index.

mod bounds;
mod chunky_tri_mesh;
mod geometry;
mod mesh;

pub use bounds::*;
pub use chunky_tri_mesh::*;
pub use geometry::*;
pub use mesh::*;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input mesh: {0}")]
    InvalidMesh(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory(err.to_string())
    }
}

/// Result type for mesh and index operations
pub type Result<T> = std::result::Result<T, Error>;
