//! Off-mesh connections authored on top of the input geometry
//!
//! Off-mesh connections link two points that the walkable surface does not
//! connect (jumps, ladders, teleporters). They are stored here as authored and
//! handed to the navmesh builder unchanged.

use bitflags::bitflags;

use crate::{GeomError, Result};

/// Maximum number of off-mesh connections a scene can hold
pub const MAX_OFFMESH_CONNECTIONS: usize = 256;

bitflags! {
    /// Behavior flags of an off-mesh connection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
    pub struct OffMeshFlags: u16 {
        /// Ability to walk (ground, grass, road)
        const WALK = 0x01;
        /// Ability to swim (water)
        const SWIM = 0x02;
        /// Ability to move through doors
        const DOOR = 0x04;
        /// Ability to jump
        const JUMP = 0x08;
        /// Disabled connection
        const DISABLED = 0x10;
    }
}

/// Which way an off-mesh connection may be traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum OffMeshDirection {
    /// Start to end only
    OneWay,
    /// Both ways
    #[default]
    Bidirectional,
}

/// A link between two points of the input geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OffMeshConnection {
    /// Connection endpoints \[sx,sy,sz,ex,ey,ez\]
    pub pos: [f32; 6],
    /// Connection radius
    pub radius: f32,
    pub direction: OffMeshDirection,
    /// Area ID
    pub area: u8,
    pub flags: OffMeshFlags,
    /// Caller-assigned identifier
    pub user_id: u32,
}

impl OffMeshConnection {
    pub fn new(
        start: [f32; 3],
        end: [f32; 3],
        radius: f32,
        direction: OffMeshDirection,
        area: u8,
        flags: OffMeshFlags,
        user_id: u32,
    ) -> Self {
        Self {
            pos: [start[0], start[1], start[2], end[0], end[1], end[2]],
            radius,
            direction,
            area,
            flags,
            user_id,
        }
    }

    pub fn start(&self) -> [f32; 3] {
        [self.pos[0], self.pos[1], self.pos[2]]
    }

    pub fn end(&self) -> [f32; 3] {
        [self.pos[3], self.pos[4], self.pos[5]]
    }

    pub fn is_bidirectional(&self) -> bool {
        self.direction == OffMeshDirection::Bidirectional
    }

    /// True if the connection may be traversed from `start` to `end`, or
    /// the reverse when `reverse` is set
    pub fn allows_traversal(&self, reverse: bool) -> bool {
        !reverse || self.is_bidirectional()
    }
}

/// Ordered, bounded store of off-mesh connections
#[derive(Debug, Clone, Default)]
pub struct OffMeshConnectionRegistry {
    connections: Vec<OffMeshConnection>,
}

impl OffMeshConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a connection, returning its index.
    ///
    /// Fails with [`GeomError::CapacityExceeded`] once
    /// [`MAX_OFFMESH_CONNECTIONS`] connections are stored.
    pub fn add(&mut self, connection: OffMeshConnection) -> Result<usize> {
        if self.connections.len() >= MAX_OFFMESH_CONNECTIONS {
            return Err(GeomError::CapacityExceeded {
                kind: "off-mesh connections",
                max: MAX_OFFMESH_CONNECTIONS,
            });
        }

        self.connections.push(connection);
        Ok(self.connections.len() - 1)
    }

    /// Removes the connection at `index`, keeping the order of the others
    pub fn remove(&mut self, index: usize) -> Result<OffMeshConnection> {
        if index >= self.connections.len() {
            return Err(GeomError::InvalidIndex {
                index,
                count: self.connections.len(),
            });
        }
        Ok(self.connections.remove(index))
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }

    /// Active connections in insertion order
    pub fn connections(&self) -> &[OffMeshConnection] {
        &self.connections
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OffMeshConnection> {
        self.connections.get(index)
    }

    /// Index of the first connection carrying `user_id`
    pub fn find_by_user_id(&self, user_id: u32) -> Option<usize> {
        self.connections.iter().position(|c| c.user_id == user_id)
    }
}
