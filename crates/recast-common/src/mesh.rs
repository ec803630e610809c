//! Triangle mesh buffers and the mesh sources that fill them

use crate::{calc_bounds, Error, Result};
use glam::Vec3;

#[cfg(feature = "std")]
use std::path::Path;

/// A simple triangle mesh
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    /// The vertices of the mesh as a flat array of [x, y, z] coordinates
    pub vertices: Vec<f32>,
    /// The indices of the mesh, 3 per triangle
    pub indices: Vec<i32>,
    /// The number of vertices in the mesh
    pub vert_count: usize,
    /// The number of triangles in the mesh
    pub tri_count: usize,
}

impl TriMesh {
    /// Creates a new empty triangle mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from flat vertex and index buffers
    pub fn from_buffers(vertices: Vec<f32>, indices: Vec<i32>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(
                "Vertex array length must be a multiple of 3".to_string(),
            ));
        }
        if indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(
                "Index array length must be a multiple of 3".to_string(),
            ));
        }

        let vert_count = vertices.len() / 3;
        let tri_count = indices.len() / 3;
        Ok(Self {
            vertices,
            indices,
            vert_count,
            tri_count,
        })
    }

    /// Loads a mesh from an OBJ file
    ///
    /// This method is only available when the `std` feature is enabled.
    #[cfg(feature = "std")]
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_obj_str(&content)
    }

    /// Parses OBJ content from a string
    ///
    /// Vertex and index buffers are reserved up front; a failed reservation is
    /// reported as [`Error::OutOfMemory`] instead of aborting.
    ///
    /// # Example
    ///
    /// ```
    /// use recast_common::TriMesh;
    ///
    /// let obj_content = r#"
    /// v 0.0 0.0 0.0
    /// v 1.0 0.0 0.0
    /// v 0.5 1.0 0.0
    /// f 1 2 3
    /// "#;
    ///
    /// let mesh = TriMesh::from_obj_str(obj_content).unwrap();
    /// assert_eq!(mesh.vert_count, 3);
    /// assert_eq!(mesh.tri_count, 1);
    /// ```
    pub fn from_obj_str(content: &str) -> Result<Self> {
        let mut mesh = Self::new();

        let (nverts, nfaces) = content
            .lines()
            .fold((0usize, 0usize), |(v, f), line| match line.split_whitespace().next() {
                Some("v") => (v + 1, f),
                Some("f") => (v, f + 1),
                _ => (v, f),
            });
        mesh.vertices.try_reserve_exact(nverts * 3)?;
        mesh.indices.try_reserve(nfaces * 3)?;

        for (line_no, line) in content.lines().enumerate() {
            mesh.parse_obj_line(line)
                .map_err(|e| match e {
                    Error::InvalidMesh(msg) => {
                        Error::InvalidMesh(format!("line {}: {}", line_no + 1, msg))
                    }
                    other => other,
                })?;
        }

        Ok(mesh)
    }

    /// Parses a single line from an OBJ file
    fn parse_obj_line(&mut self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0f32; 3];
                for (axis, coord) in ["x", "y", "z"].iter().zip(coords.iter_mut()) {
                    *coord = tokens
                        .next()
                        .ok_or_else(|| {
                            Error::InvalidMesh(format!("Invalid vertex: missing {} coordinate", axis))
                        })?
                        .parse::<f32>()
                        .map_err(|_| {
                            Error::InvalidMesh(format!(
                                "Invalid vertex: {} coordinate is not a number",
                                axis
                            ))
                        })?;
                }

                self.vertices.extend_from_slice(&coords);
                self.vert_count += 1;
            }
            Some("f") => {
                let mut face_indices = Vec::new();

                for token in tokens {
                    let index_str = token.split('/').next().unwrap_or_default();
                    let index = index_str.parse::<i32>().map_err(|_| {
                        Error::InvalidMesh("Invalid face: vertex index is not a number".to_string())
                    })?;

                    face_indices.push(self.resolve_obj_index(index)?);
                }

                if face_indices.len() < 3 {
                    return Err(Error::InvalidMesh(
                        "Invalid face: less than 3 vertices".to_string(),
                    ));
                }

                // Fan triangulation for polygons
                for i in 1..(face_indices.len() - 1) {
                    self.indices.push(face_indices[0]);
                    self.indices.push(face_indices[i]);
                    self.indices.push(face_indices[i + 1]);
                    self.tri_count += 1;
                }
            }
            _ => {
                // Skip other lines (normals, texture coordinates, comments, etc.)
            }
        }

        Ok(())
    }

    /// Converts a 1-based (or negative, relative) OBJ index to a 0-based one.
    ///
    /// Faces may only reference vertices declared before them.
    fn resolve_obj_index(&self, index: i32) -> Result<i32> {
        let resolved = match index {
            0 => {
                return Err(Error::InvalidMesh(
                    "Invalid face: vertex index 0 is not allowed".to_string(),
                ))
            }
            i if i > 0 => i64::from(i) - 1,
            i => self.vert_count as i64 + i64::from(i),
        };

        if resolved < 0 || resolved >= self.vert_count as i64 {
            return Err(Error::InvalidMesh(format!(
                "Invalid face: vertex index {} out of range ({} vertices declared)",
                index, self.vert_count
            )));
        }

        Ok(resolved as i32)
    }

    /// Calculates the axis-aligned bounding box of the mesh
    pub fn calculate_bounds(&self) -> (Vec3, Vec3) {
        let (bmin, bmax) = calc_bounds(&self.vertices, self.vert_count);
        (Vec3::from_array(bmin), Vec3::from_array(bmax))
    }

    /// Returns the vertex at `index` as a `Vec3`
    #[inline]
    pub fn vertex(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[index * 3..index * 3 + 3])
    }
}

/// Produces triangle meshes from files on disk
#[cfg(feature = "std")]
pub trait MeshSource {
    /// Reads and parses the mesh at `path`
    fn load(&mut self, path: &Path) -> Result<TriMesh>;
}

/// Wavefront OBJ mesh source
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjMeshSource;

#[cfg(feature = "std")]
impl MeshSource for ObjMeshSource {
    fn load(&mut self, path: &Path) -> Result<TriMesh> {
        TriMesh::from_obj(path)
    }
}
