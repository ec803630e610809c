//! Input geometry formats recognized by the scene loader

use std::fmt;
use std::path::Path;

/// Loader strategy selected from a file path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFormat {
    /// Wavefront OBJ triangle mesh (`.obj`)
    Obj,
    /// Pre-aggregated geometry set (`.gset`), not implemented
    GeomSet,
    /// Any other extension, or none
    Unknown,
}

impl GeometryFormat {
    /// Resolves the format from the extension of `path` (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("obj") => GeometryFormat::Obj,
            Some("gset") => GeometryFormat::GeomSet,
            _ => GeometryFormat::Unknown,
        }
    }

    /// True when the scene can load this format
    pub fn is_supported(self) -> bool {
        matches!(self, GeometryFormat::Obj)
    }
}

impl fmt::Display for GeometryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryFormat::Obj => write!(f, "obj"),
            GeometryFormat::GeomSet => write!(f, "gset"),
            GeometryFormat::Unknown => write!(f, "unknown"),
        }
    }
}
