//! Desktop input: window events reduced to actions, and cursor positions
//! mapped into field space.

pub mod action;
pub mod pointer;

pub use action::{Action, PaintState, adjust_radius};
pub use pointer::{PLANE_EXTENT, PointerMapping, plane_to_field};
