use crate::math::fft::FftHelper;
use crate::prelude::{
    ConversionError, ConversionResult, ProcessingStage, StageConfig, StageInput, StageMetadata,
    StageOutput,
};
use crate::telemetry::log::LogManager;
use num_complex::Complex64;
use rustfft::num_traits::Zero;

/// Number of samples a sequence of `input_len` samples occupies at the target rate.
///
/// Rounds half up and never returns 0 for a non-empty input.
pub fn resampled_len(input_len: usize, source_rate: u32, target_rate: u32) -> usize {
    if input_len == 0 || source_rate == 0 {
        return 0;
    }
    let numerator = input_len as u128 * target_rate as u128;
    let source = source_rate as u128;
    let rounded = (numerator + source / 2) / source;
    (rounded as usize).max(1)
}

fn check_rate(kind: &'static str, rate: u32) -> ConversionResult<()> {
    if rate == 0 {
        return Err(ConversionError::InvalidRate { kind, rate });
    }
    Ok(())
}

/// Upper bound on the samples mirrored onto each edge before the FFT.
const EDGE_PAD_LIMIT: usize = 8192;

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Extends both edges by point reflection about the end samples.
///
/// The extension continues the local slope, so a drifting signal has no jump
/// where the data ends. Indices past the opposite edge clamp to it.
fn reflect_pad(samples: &[f64], pad: usize) -> Vec<f64> {
    let last = samples.len() - 1;
    let first_value = samples[0];
    let last_value = samples[last];

    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.extend((1..=pad).rev().map(|k| 2.0 * first_value - samples[k.min(last)]));
    padded.extend_from_slice(samples);
    padded.extend((1..=pad).map(|k| 2.0 * last_value - samples[last - k.min(last)]));
    padded
}

/// Circular spectral resize of `samples` to `output_len` points.
fn spectral_resize(samples: &[f64], output_len: usize) -> Vec<f64> {
    let input_len = samples.len();
    let spectrum = FftHelper::new(input_len).forward_real(samples);
    let mut resized = vec![Complex64::zero(); output_len];

    let keep = input_len.min(output_len);
    let paired = (keep - 1) / 2;
    resized[0] = spectrum[0];
    for k in 1..=paired {
        resized[k] = spectrum[k];
        resized[output_len - k] = spectrum[input_len - k];
    }

    // The shorter length has a lone Nyquist bin when it is even.
    if keep % 2 == 0 {
        let nyquist = keep / 2;
        if output_len < input_len {
            resized[nyquist] = spectrum[nyquist] + spectrum[input_len - nyquist];
        } else {
            let split = spectrum[nyquist] * 0.5;
            resized[nyquist] = split;
            resized[output_len - nyquist] = split;
        }
    }

    FftHelper::new(output_len).inverse(&mut resized);
    let scale = 1.0 / input_len as f64;
    resized.iter().map(|c| c.re * scale).collect()
}

/// Band-limited resampling of a real sequence by spectral truncation or zero-padding.
///
/// The spectrum is cut (downsampling) or padded (upsampling) at the lower of
/// the two Nyquist frequencies, which acts as an ideal anti-aliasing low-pass.
/// Both edges are reflect-padded first so the transform's wrap-around lands in
/// the padding, and the padding length is a whole number of samples at both
/// rates so the crop lines up exactly.
///
/// An empty input resamples to an empty output; equal rates return a copy.
/// Empty channels are rejected earlier, by `source::extract_channel`.
pub fn resample(samples: &[f64], source_rate: u32, target_rate: u32) -> ConversionResult<Vec<f64>> {
    check_rate("source", source_rate)?;
    check_rate("target", target_rate)?;

    if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ConversionError::NonFiniteSample { index, value });
    }

    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let input_len = samples.len();
    let output_len = resampled_len(input_len, source_rate, target_rate);
    if output_len == input_len {
        return Ok(samples.to_vec());
    }

    let divisor = gcd(source_rate, target_rate);
    let step = (source_rate / divisor) as usize;
    let pad = input_len.min(EDGE_PAD_LIMIT).div_ceil(step) * step;
    let offset = pad / step * (target_rate / divisor) as usize;

    let padded = reflect_pad(samples, pad);
    let padded_len = resampled_len(padded.len(), source_rate, target_rate);
    let resized = spectral_resize(&padded, padded_len);
    Ok(resized[offset..offset + output_len].to_vec())
}

/// Waveform stage converting a channel to the configured target rate.
pub struct ResampleStage {
    config: Option<StageConfig>,
    logger: LogManager,
}

impl ResampleStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("resample"),
        }
    }
}

impl Default for ResampleStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for ResampleStage {
    fn initialize(&mut self, config: &StageConfig) -> ConversionResult<()> {
        check_rate("target", config.target_rate)?;
        self.config = Some(*config);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> ConversionResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| ConversionError::Internal("stage not initialized".into()))?;

        let samples = resample(&input.samples, input.sample_rate, config.target_rate)?;
        let note = format!(
            "resampled {} samples at {} Hz to {} samples at {} Hz",
            input.samples.len(),
            input.sample_rate,
            samples.len(),
            config.target_rate
        );
        self.logger.detail(&note);

        Ok(StageOutput {
            samples,
            sample_rate: config.target_rate,
            metadata: StageMetadata {
                notes: vec![note],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
