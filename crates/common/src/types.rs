use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edge length, in cells, of one square tile. One tile is covered by exactly
/// one compute workgroup.
pub const TILE_SIZE: u32 = 32;

/// Dimensions of the cell field, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: u32,
    pub height: u32,
}

impl FieldSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of whole tiles along X (integer division).
    pub fn tiles_x(&self) -> u32 {
        self.width / TILE_SIZE
    }

    /// Number of whole tiles along Y (integer division).
    pub fn tiles_y(&self) -> u32 {
        self.height / TILE_SIZE
    }

    /// Total number of cells, i.e. the length of one grid buffer.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether both dimensions are whole multiples of [`TILE_SIZE`].
    pub fn is_tile_aligned(&self) -> bool {
        self.width % TILE_SIZE == 0 && self.height % TILE_SIZE == 0
    }

    /// Workgroup grid covering the whole field, one group per tile.
    pub fn full_dispatch(&self) -> WorkgroupCount {
        WorkgroupCount::new(self.tiles_x(), self.tiles_y(), 1)
    }

    /// Field extent as a float vector, for pointer mapping.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for FieldSize {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

impl std::fmt::Display for FieldSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Three-dimensional workgroup count handed to a compute dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkgroupCount {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorkgroupCount {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total number of workgroups launched.
    pub fn total(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::fmt::Display for WorkgroupCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Which of the two state grids a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridLabel {
    A,
    B,
}

impl GridLabel {
    /// The other grid of the pair.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "grid_a",
            Self::B => "grid_b",
        }
    }
}

impl std::fmt::Display for GridLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}
