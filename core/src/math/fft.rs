use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Helper that wraps the `rustfft` planner for a forward/inverse pair of one size.
pub struct FftHelper {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            forward,
            inverse,
            size,
        }
    }

    /// Spectrum of a real sequence, zero-padded or truncated to the plan size.
    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());
        self.forward.process(&mut buffer);
        buffer
    }

    /// Unnormalized inverse transform; callers apply their own scale.
    pub fn inverse(&self, spectrum: &mut [Complex64]) {
        self.inverse.process(spectrum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_helper_returns_same_length() {
        let helper = FftHelper::new(4);
        let output = helper.forward_real(&[1.0, 0.0, -1.0, 0.0]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn inverse_recovers_input_scaled_by_size() {
        let helper = FftHelper::new(4);
        let mut spectrum = helper.forward_real(&[1.0, 2.0, 3.0, 4.0]);
        helper.inverse(&mut spectrum);
        let recovered: Vec<f64> = spectrum.iter().map(|c| c.re / 4.0).collect();
        for (got, want) in recovered.iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }
}
