use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Inhibitory bands: rows/columns whose cells weigh -1.
const INHIBIT_BANDS: [RangeInclusive<u32>; 2] = [0..=2, 22..=24];
/// Excitatory bands: rows/columns whose cells weigh +1, unless already inhibitory.
const EXCITE_BANDS: [RangeInclusive<u32>; 2] = [5..=9, 15..=19];

/// Fixed-weight convolution kernel consumed by the engine's iterate pass.
///
/// Weights form concentric square rings around the center: an outer ring of
/// inhibition and a middle ring of excitation. Cells outside both rings,
/// including the gaps between them, weigh zero. Built once at startup and
/// never modified.
///
/// Layout is row-major: the weight at column `i`, row `j` lives at
/// `i + j * width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvolutionKernel {
    width: u32,
    height: u32,
    weights: Vec<f32>,
}

impl ConvolutionKernel {
    /// Build the ring kernel for the given extent.
    ///
    /// Band indices are absolute, so the default 25x25 kernel is symmetric.
    /// Each cell checks the inhibitory bands first, so any overlap at other
    /// sizes resolves to -1.
    pub fn ring(width: u32, height: u32) -> Self {
        let mut weights = vec![0.0_f32; width as usize * height as usize];
        for j in 0..height {
            for i in 0..width {
                weights[(i + j * width) as usize] = band_weight(i, j);
            }
        }
        tracing::debug!(width, height, "built ring kernel");
        Self {
            width,
            height,
            weights,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at column `i`, row `j`, or `None` outside the kernel.
    pub fn weight(&self, i: u32, j: u32) -> Option<f32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        self.weights.get((i + j * self.width) as usize).copied()
    }

    /// Normalization factor passed alongside the weights: `1 / (width * height)`.
    pub fn mult(&self) -> f32 {
        1.0 / (self.width * self.height) as f32
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Number of cells carrying exactly `value`.
    pub fn count(&self, value: f32) -> usize {
        self.weights.iter().filter(|w| **w == value).count()
    }
}

fn in_any(bands: &[RangeInclusive<u32>], v: u32) -> bool {
    bands.iter().any(|b| b.contains(&v))
}

fn band_weight(i: u32, j: u32) -> f32 {
    if in_any(&INHIBIT_BANDS, i) || in_any(&INHIBIT_BANDS, j) {
        -1.0
    } else if in_any(&EXCITE_BANDS, i) || in_any(&EXCITE_BANDS, j) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kernel_band_counts() {
        let k = ConvolutionKernel::ring(25, 25);
        assert_eq!(k.weights().len(), 625);
        assert_eq!(k.count(-1.0), 264);
        assert_eq!(k.count(1.0), 280);
        assert_eq!(k.count(0.0), 81);
    }

    #[test]
    fn default_kernel_sum_is_fixed() {
        let k = ConvolutionKernel::ring(25, 25);
        assert_eq!(k.sum(), 16.0);
        // Rebuilding gives identical weights.
        assert_eq!(k, ConvolutionKernel::ring(25, 25));
    }

    #[test]
    fn mult_is_reciprocal_cell_count() {
        let k = ConvolutionKernel::ring(25, 25);
        assert_eq!(k.mult(), 1.0 / 625.0);
        let k = ConvolutionKernel::ring(8, 4);
        assert_eq!(k.mult(), 1.0 / 32.0);
    }

    #[test]
    fn outer_ring_is_inhibitory() {
        let k = ConvolutionKernel::ring(25, 25);
        for v in 0..25 {
            for edge in [0, 1, 2, 22, 23, 24] {
                assert_eq!(k.weight(edge, v), Some(-1.0));
                assert_eq!(k.weight(v, edge), Some(-1.0));
            }
        }
    }

    #[test]
    fn gaps_between_rings_stay_zero() {
        let k = ConvolutionKernel::ring(25, 25);
        let gaps = [3, 4, 10, 11, 12, 13, 14, 20, 21];
        for &i in &gaps {
            for &j in &gaps {
                assert_eq!(k.weight(i, j), Some(0.0), "({i}, {j})");
            }
        }
        // Center is a gap cell.
        assert_eq!(k.weight(12, 12), Some(0.0));
    }

    #[test]
    fn middle_ring_is_excitatory() {
        let k = ConvolutionKernel::ring(25, 25);
        assert_eq!(k.weight(5, 12), Some(1.0));
        assert_eq!(k.weight(12, 19), Some(1.0));
        assert_eq!(k.weight(15, 3), Some(1.0));
    }

    #[test]
    fn row_major_layout() {
        let k = ConvolutionKernel::ring(25, 25);
        // column 5, row 12 is excitatory; column 12, row 3 is a gap
        assert_eq!(k.weights()[5 + 12 * 25], 1.0);
        assert_eq!(k.weights()[12 + 3 * 25], 0.0);
    }

    #[test]
    fn weight_out_of_range_is_none() {
        let k = ConvolutionKernel::ring(25, 25);
        assert_eq!(k.weight(25, 0), None);
        assert_eq!(k.weight(0, 25), None);
    }

    #[test]
    fn inhibition_wins_on_overlap() {
        // Row 5 is excitatory, column 1 inhibitory: inhibition takes priority.
        let k = ConvolutionKernel::ring(10, 10);
        assert_eq!(k.weight(1, 5), Some(-1.0));
        assert_eq!(k.weight(5, 5), Some(1.0));
    }
}
