use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Shared configuration for each waveform processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub target_rate: u32,
}

/// Input payload for a processing stage: one channel at a known rate.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    pub metadata: StageMetadata,
}

impl StageOutput {
    /// Re-wraps the output as the input of the next stage.
    pub fn into_input(self) -> StageInput {
        StageInput {
            samples: self.samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub mean: Option<f64>,
    pub peak: Option<f64>,
    pub notes: Vec<String>,
}

/// Every way a conversion can fail. None of these are retried.
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("invalid {kind} sample rate {rate} Hz: rate must be positive")]
    InvalidRate { kind: &'static str, rate: u32 },
    #[error("channel {channel} has no samples")]
    EmptySignal { channel: usize },
    #[error("non-finite sample {value} at index {index}")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("channel {index} out of range: recording has {count} channel(s)")]
    ChannelOutOfRange { index: usize, count: usize },
    #[error("annotation {index} is invalid: {reason}")]
    InvalidAnnotation { index: usize, reason: String },
    #[error("no annotation matched a sleep stage; unmapped labels: {}", format_labels(.unmapped))]
    NoSegments { unmapped: BTreeSet<String> },
    #[error("failed to read source: {0}")]
    SourceRead(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("internal failure: {0}")]
    Internal(String),
}

fn format_labels(labels: &BTreeSet<String>) -> String {
    if labels.is_empty() {
        return "(none)".to_string();
    }
    labels
        .iter()
        .map(|label| format!("{:?}", label))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Trait describing the waveform pipeline's processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &StageConfig) -> ConversionResult<()>;
    fn execute(&mut self, input: StageInput) -> ConversionResult<StageOutput>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_segments_message_lists_unmapped_labels() {
        let unmapped: BTreeSet<String> = ["Sleep stage ?", "Lights off"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let message = ConversionError::NoSegments { unmapped }.to_string();
        assert!(message.contains("\"Lights off\", \"Sleep stage ?\""));
    }

    #[test]
    fn no_segments_message_handles_empty_annotation_list() {
        let message = ConversionError::NoSegments {
            unmapped: BTreeSet::new(),
        }
        .to_string();
        assert!(message.ends_with("(none)"));
    }

    #[test]
    fn invalid_rate_message_names_rate() {
        let err = ConversionError::InvalidRate {
            kind: "target",
            rate: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid target sample rate 0 Hz: rate must be positive"
        );
    }
}
