//! Simulation core: kernel construction, double-buffered grid roles, the
//! per-tick dispatch protocol, and tile-aligned paint regions.
//!
//! # Invariants
//! - Exactly one grid is the read source at any instant; the role flips once per tick.
//! - Noise fill is issued once, before the first convolution.
//! - Paint is issued after the convolution of the same tick and before render.
//! - Grids and the kernel buffer are released exactly once, on drop.

pub mod automaton;
pub mod conv;
pub mod engine;
pub mod grid;
pub mod region;
pub mod trace;

pub use automaton::{Automaton, Brush, FrameReport};
pub use conv::ConvolutionKernel;
pub use engine::{ComputeEngine, EngineError, FieldParams, PaintParams};
pub use grid::{BufferRoles, GridPair, Role};
pub use region::{PaintRegion, paint_region};
pub use trace::{RecordingEngine, ResourceKind, TraceEvent, TraceLog};
