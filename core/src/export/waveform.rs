use crate::export::artifact::Artifact;
use crate::prelude::StageOutput;
use serde::{Deserialize, Serialize};

/// Normalized channel at the consumer's fixed sample rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformArtifact {
    pub sample_rate: u32,
    pub values: Vec<f64>,
}

impl WaveformArtifact {
    pub fn new(sample_rate: u32, values: Vec<f64>) -> Self {
        Self {
            sample_rate,
            values,
        }
    }
}

impl From<StageOutput> for WaveformArtifact {
    fn from(output: StageOutput) -> Self {
        Self::new(output.sample_rate, output.samples)
    }
}

impl Artifact for WaveformArtifact {
    const KIND: &'static str = "waveform";

    fn summary(&self) -> String {
        format!("{} samples at {} Hz", self.values.len(), self.sample_rate)
    }
}
