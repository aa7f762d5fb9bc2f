use crate::conv::ConvolutionKernel;
use ringlife_common::{FieldSize, GridLabel, WorkgroupCount};
use serde::{Deserialize, Serialize};

/// Errors an engine can report while acquiring resources.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: String, reason: String },
}

/// Scalars set once at startup and read by every pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    pub field_width: u32,
    pub field_height: u32,
    pub kernel_width: u32,
    pub kernel_height: u32,
    pub kernel_mult: f32,
    /// Seed for the noise fill.
    pub seed: u32,
}

impl FieldParams {
    pub fn new(size: FieldSize, kernel: &ConvolutionKernel, seed: u32) -> Self {
        Self {
            field_width: size.width,
            field_height: size.height,
            kernel_width: kernel.width(),
            kernel_height: kernel.height(),
            kernel_mult: kernel.mult(),
            seed,
        }
    }
}

/// Per-edit scalars for the cursor-draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintParams {
    /// Squared brush radius for the per-cell distance test.
    pub cursor_rad_sqr: f32,
    pub cursor_fill: f32,
    pub cursor_x: i32,
    pub cursor_y: i32,
    /// Absolute cell origin of the dispatched rectangle.
    pub draw_offset_x: u32,
    pub draw_offset_y: u32,
}

/// The parallel executor the core schedules work on.
///
/// Implementations own the per-cell rule; the core only decides which grid
/// each pass reads and writes, and how many tiles it covers. Handles returned
/// by `create_grid` and `upload_kernel` release their resources on drop.
///
/// Dispatches are fire-and-forget: passes submitted in order take effect in
/// order, and none of these calls may block on completion.
pub trait ComputeEngine {
    /// Owned handle to one `width * height` grid of f32 cells.
    type Grid;
    /// Owned handle to the uploaded, read-only kernel weights.
    type Kernel;

    /// Set the startup scalars shared by all passes.
    fn configure(&mut self, params: &FieldParams);

    fn create_grid(&mut self, label: GridLabel, size: FieldSize)
    -> Result<Self::Grid, EngineError>;

    fn upload_kernel(&mut self, kernel: &ConvolutionKernel) -> Result<Self::Kernel, EngineError>;

    /// Noise-fill entry point.
    fn seed(&mut self, target: &Self::Grid, groups: WorkgroupCount);

    /// Iterate entry point: convolve `from` with `kernel` into `to`.
    fn step(
        &mut self,
        from: &Self::Grid,
        to: &Self::Grid,
        kernel: &Self::Kernel,
        groups: WorkgroupCount,
    );

    /// Render entry point: map `source` into the engine's render target.
    fn render(&mut self, source: &Self::Grid, groups: WorkgroupCount);

    /// Cursor-draw entry point: modify `target` inside the dispatched rectangle.
    fn paint(&mut self, target: &Self::Grid, params: &PaintParams, groups: WorkgroupCount);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_params_from_kernel() {
        let kernel = ConvolutionKernel::ring(25, 25);
        let params = FieldParams::new(FieldSize::new(320, 640), &kernel, 3);
        assert_eq!(params.field_width, 320);
        assert_eq!(params.field_height, 640);
        assert_eq!(params.kernel_width, 25);
        assert_eq!(params.kernel_height, 25);
        assert_eq!(params.kernel_mult, 1.0 / 625.0);
        assert_eq!(params.seed, 3);
    }

    #[test]
    fn allocation_error_message() {
        let err = EngineError::Allocation {
            what: "grid_a".into(),
            reason: "out of memory".into(),
        };
        assert_eq!(err.to_string(), "failed to allocate grid_a: out of memory");
    }
}
