//! Shared types for the ringlife workspace: field geometry, workgroup extents,
//! grid labels, and the on-disk configuration format.
//!
//! # Invariants
//! - Field dimensions handed to the kernel are multiples of [`TILE_SIZE`].
//! - Configuration is validated once, at load time, never per tick.

mod config;
mod types;

pub use config::{AutomatonConfig, BrushConfig, ConfigError, KernelSize};
pub use types::{FieldSize, GridLabel, TILE_SIZE, WorkgroupCount};
