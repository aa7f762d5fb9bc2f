//! Developer tooling: kernel and trace inspection, frame timing.
//!
//! # Invariants
//! - Tools only read automaton state; they never issue engine calls.

pub mod inspector;
pub mod timer;

pub use inspector::{AutomatonSummary, KernelSummary, TraceSummary};
pub use timer::FrameTimer;
