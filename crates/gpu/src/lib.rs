//! wgpu backend for the automaton core.
//!
//! Implements [`ringlife_kernel::ComputeEngine`] with four compute entry
//! points (noise fill, iterate, render, cursor draw) in a single WGSL module,
//! plus a full-screen presenter for the render target.
//!
//! # Invariants
//! - Every dispatch is submitted immediately, so queue order is call order.
//! - Grid and kernel buffers are destroyed when their handles drop.
//! - The render target lives exactly as long as the engine.

mod context;
mod engine;
mod present;
mod shaders;

pub use context::{GpuContext, GpuError};
pub use engine::{GpuGrid, GpuKernel, WgpuEngine};
pub use present::Presenter;
