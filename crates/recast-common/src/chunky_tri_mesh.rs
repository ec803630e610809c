//! Chunked triangle index for fast area queries over large input meshes
//!
//! Triangles are split recursively along the longest XZ axis until each leaf
//! chunk holds at most `tris_per_chunk` triangles. Nodes are stored in
//! depth-first order; an internal node stores the negated size of its subtree
//! so a query can skip the whole subtree when its bounds miss.

use crate::{calc_tri_bounds_2d, overlap_rect_2d, overlap_segment_rect_2d, Error, Result};

/// Node of the chunky triangle index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkyTriMeshNode {
    /// Minimum XZ bounds of all triangles below this node
    pub bmin: [f32; 2],
    /// Maximum XZ bounds of all triangles below this node
    pub bmax: [f32; 2],
    /// First triangle of a leaf, or negated escape offset of an internal node
    pub i: i32,
    /// Number of triangles in a leaf (0 for internal nodes)
    pub n: i32,
}

impl ChunkyTriMeshNode {
    /// Returns true when this node stores triangles
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.i >= 0
    }

    /// Number of nodes to skip to leave this node's subtree
    #[inline]
    fn escape_offset(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            (-self.i) as usize
        }
    }
}

/// Per-triangle XZ bounds used while partitioning
#[derive(Debug, Clone, Copy)]
struct BoundsItem {
    bmin: [f32; 2],
    bmax: [f32; 2],
    tri: usize,
}

/// Spatial index partitioning a triangle buffer into spatially coherent chunks
#[derive(Debug, Clone, Default)]
pub struct ChunkyTriMesh {
    nodes: Vec<ChunkyTriMeshNode>,
    /// Triangle indices reordered so each leaf's triangles are contiguous
    tris: Vec<i32>,
    ntris: usize,
    max_tris_per_chunk: usize,
}

impl ChunkyTriMesh {
    /// Builds the index over `ntris` triangles of `tris` referencing `verts`.
    ///
    /// Fails when `tris_per_chunk` is zero, when the buffers are shorter than
    /// the counts claim, when a triangle references a vertex outside `verts`,
    /// or when the node and triangle buffers cannot be reserved.
    pub fn build(verts: &[f32], tris: &[i32], ntris: usize, tris_per_chunk: usize) -> Result<Self> {
        if tris_per_chunk == 0 {
            return Err(Error::InvalidMesh(
                "Triangles per chunk must be at least 1".to_string(),
            ));
        }
        if tris.len() < ntris * 3 {
            return Err(Error::InvalidMesh(format!(
                "Triangle buffer holds {} indices, {} triangles need {}",
                tris.len(),
                ntris,
                ntris * 3
            )));
        }

        let nverts = verts.len() / 3;
        let mut items = Vec::new();
        items.try_reserve_exact(ntris)?;

        for (tri, t) in tris[..ntris * 3].chunks_exact(3).enumerate() {
            let mut corners = [0usize; 3];
            for (corner, &index) in corners.iter_mut().zip(t) {
                if index < 0 || index as usize >= nverts {
                    return Err(Error::InvalidMesh(format!(
                        "Triangle {} references vertex {} (vertex count: {})",
                        tri, index, nverts
                    )));
                }
                *corner = index as usize * 3;
            }

            let (bmin, bmax) = calc_tri_bounds_2d(
                &verts[corners[0]..corners[0] + 3],
                &verts[corners[1]..corners[1] + 3],
                &verts[corners[2]..corners[2] + 3],
            );
            items.push(BoundsItem { bmin, bmax, tri });
        }

        let nchunks = ntris.div_ceil(tris_per_chunk);
        let mut mesh = Self {
            nodes: Vec::new(),
            tris: Vec::new(),
            ntris,
            max_tris_per_chunk: 0,
        };
        mesh.nodes.try_reserve(nchunks * 4)?;
        mesh.tris.try_reserve_exact(ntris * 3)?;

        if ntris > 0 {
            mesh.subdivide(&mut items, tris, tris_per_chunk);
        }

        mesh.max_tris_per_chunk = mesh
            .nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.n as usize)
            .max()
            .unwrap_or(0);

        log::debug!(
            "chunky mesh: {} triangles in {} nodes, at most {} per chunk",
            ntris,
            mesh.nodes.len(),
            mesh.max_tris_per_chunk
        );

        Ok(mesh)
    }

    /// Recursively partitions `items`, appending nodes in depth-first order
    fn subdivide(&mut self, items: &mut [BoundsItem], src_tris: &[i32], tris_per_chunk: usize) {
        let (bmin, bmax) = calc_extents(items);
        let node_index = self.nodes.len();
        self.nodes.push(ChunkyTriMeshNode {
            bmin,
            bmax,
            i: 0,
            n: 0,
        });

        if items.len() <= tris_per_chunk {
            // Leaf
            let first_tri = self.tris.len() / 3;
            for item in items.iter() {
                self.tris
                    .extend_from_slice(&src_tris[item.tri * 3..item.tri * 3 + 3]);
            }
            let node = &mut self.nodes[node_index];
            node.i = first_tri as i32;
            node.n = items.len() as i32;
            return;
        }

        // Split along the longest axis at the median
        let axis = longest_axis(bmax[0] - bmin[0], bmax[1] - bmin[1]);
        items.sort_by(|a, b| a.bmin[axis].total_cmp(&b.bmin[axis]));

        let split = items.len() / 2;
        let (left, right) = items.split_at_mut(split);
        self.subdivide(left, src_tris, tris_per_chunk);
        self.subdivide(right, src_tris, tris_per_chunk);

        let escape = self.nodes.len() - node_index;
        self.nodes[node_index].i = -(escape as i32);
    }

    /// All nodes in depth-first order
    pub fn nodes(&self) -> &[ChunkyTriMeshNode] {
        &self.nodes
    }

    /// Number of nodes in the index
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of indexed triangles
    pub fn tri_count(&self) -> usize {
        self.ntris
    }

    /// Largest number of triangles stored in a single leaf
    pub fn max_tris_per_chunk(&self) -> usize {
        self.max_tris_per_chunk
    }

    /// The reordered triangle index triples of leaf `node_id`.
    ///
    /// Internal nodes and unknown ids yield an empty slice.
    pub fn node_tris(&self, node_id: usize) -> &[i32] {
        match self.nodes.get(node_id) {
            Some(node) if node.is_leaf() => {
                let start = node.i as usize * 3;
                let end = start + node.n as usize * 3;
                &self.tris[start..end]
            }
            _ => &[],
        }
    }

    /// Returns ids of leaf chunks whose XZ bounds overlap the rectangle.
    pub fn chunks_overlapping_rect(&self, bmin: &[f32; 2], bmax: &[f32; 2]) -> Vec<usize> {
        self.traverse(|node| overlap_rect_2d(bmin, bmax, &node.bmin, &node.bmax))
    }

    /// Returns ids of leaf chunks whose XZ bounds touch the segment `p`-`q`.
    pub fn chunks_overlapping_segment(&self, p: &[f32; 2], q: &[f32; 2]) -> Vec<usize> {
        self.traverse(|node| overlap_segment_rect_2d(p, q, &node.bmin, &node.bmax))
    }

    fn traverse(&self, mut overlaps: impl FnMut(&ChunkyTriMeshNode) -> bool) -> Vec<usize> {
        let mut ids = Vec::new();
        let mut i = 0;

        while i < self.nodes.len() {
            let node = &self.nodes[i];
            let overlap = overlaps(node);
            let is_leaf = node.is_leaf();

            if is_leaf && overlap {
                ids.push(i);
            }

            if overlap || is_leaf {
                i += 1;
            } else {
                i += node.escape_offset();
            }
        }

        ids
    }
}

fn calc_extents(items: &[BoundsItem]) -> ([f32; 2], [f32; 2]) {
    let mut bmin = [f32::MAX; 2];
    let mut bmax = [f32::MIN; 2];

    for item in items {
        bmin[0] = bmin[0].min(item.bmin[0]);
        bmin[1] = bmin[1].min(item.bmin[1]);
        bmax[0] = bmax[0].max(item.bmax[0]);
        bmax[1] = bmax[1].max(item.bmax[1]);
    }

    (bmin, bmax)
}

#[inline]
fn longest_axis(x: f32, y: f32) -> usize {
    if y > x {
        1
    } else {
        0
    }
}
