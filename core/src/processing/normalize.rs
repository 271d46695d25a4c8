use crate::math::stats::StatsHelper;
use crate::prelude::{
    ConversionResult, ProcessingStage, StageConfig, StageInput, StageMetadata, StageOutput,
};
use crate::telemetry::log::LogManager;

/// Global statistics applied by [`normalize_in_place`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Mean subtracted from every sample.
    pub mean: f64,
    /// Peak absolute value of the centered buffer; 0.0 means no scaling happened.
    pub peak: f64,
}

/// Zero-centers the buffer and scales it so the largest magnitude is 1.
///
/// Both passes need the whole buffer. A constant buffer (including all-zero
/// and empty) is only centered, never divided.
pub fn normalize_in_place(samples: &mut [f64]) -> Normalization {
    let mean = StatsHelper::mean(samples);
    for value in samples.iter_mut() {
        *value -= mean;
    }

    let peak = StatsHelper::max_abs(samples);
    if peak > 0.0 {
        for value in samples.iter_mut() {
            *value /= peak;
        }
    }

    Normalization { mean, peak }
}

/// Waveform stage applying [`normalize_in_place`] to the whole channel.
pub struct NormalizeStage {
    logger: LogManager,
}

impl NormalizeStage {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("normalize"),
        }
    }
}

impl Default for NormalizeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for NormalizeStage {
    fn initialize(&mut self, _config: &StageConfig) -> ConversionResult<()> {
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> ConversionResult<StageOutput> {
        let mut samples = input.samples;
        let stats = normalize_in_place(&mut samples);

        if stats.peak == 0.0 && !samples.is_empty() {
            self.logger
                .warn("constant signal: centered values left unscaled");
        }
        let note = format!("mean {:.6e}, peak {:.6e}", stats.mean, stats.peak);
        self.logger.detail(&note);

        Ok(StageOutput {
            samples,
            sample_rate: input.sample_rate,
            metadata: StageMetadata {
                mean: Some(stats.mean),
                peak: Some(stats.peak),
                notes: vec![note],
            },
        })
    }

    fn cleanup(&mut self) {}
}
