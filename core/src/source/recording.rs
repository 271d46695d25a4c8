use crate::prelude::{ConversionError, ConversionResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Multi-channel waveform provider consumed by the waveform pipeline.
pub trait RecordingSource {
    fn sample_rate(&self) -> u32;
    fn channel_count(&self) -> usize;
    fn channel_names(&self) -> &[String];
    fn channel(&self, index: usize) -> ConversionResult<Vec<f64>>;
}

/// Copies one channel out of `source`, rejecting a channel without samples.
pub fn extract_channel(source: &dyn RecordingSource, index: usize) -> ConversionResult<Vec<f64>> {
    let samples = source.channel(index)?;
    if samples.is_empty() {
        return Err(ConversionError::EmptySignal { channel: index });
    }
    Ok(samples)
}

/// On-disk layout of a recording dump: one row of samples per channel.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordingDump {
    sample_rate: u32,
    #[serde(default)]
    channel_names: Vec<String>,
    data: Vec<Vec<f64>>,
}

/// In-memory recording, channels by samples.
#[derive(Debug, Clone)]
pub struct Recording {
    sample_rate: u32,
    channel_names: Vec<String>,
    data: Array2<f64>,
}

impl Recording {
    /// Builds a recording from channel rows. Missing names default to `ch<index>`.
    pub fn from_rows(
        sample_rate: u32,
        channel_names: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> ConversionResult<Self> {
        if sample_rate == 0 {
            return Err(ConversionError::SourceRead(
                "recording sample rate must be positive".into(),
            ));
        }

        let channels = rows.len();
        let channel_names = if channel_names.is_empty() {
            (0..channels).map(|i| format!("ch{}", i)).collect()
        } else if channel_names.len() == channels {
            channel_names
        } else {
            return Err(ConversionError::SourceRead(format!(
                "{} channel name(s) for {} channel(s)",
                channel_names.len(),
                channels
            )));
        };

        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ConversionError::SourceRead(format!(
                "channel {} has {} samples, expected {}",
                index,
                row.len(),
                width
            )));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((channels, width), flat)
            .map_err(|e| ConversionError::SourceRead(format!("shaping channel data: {}", e)))?;

        Ok(Self {
            sample_rate,
            channel_names,
            data,
        })
    }

    pub fn from_json_str(contents: &str) -> ConversionResult<Self> {
        let dump: RecordingDump = serde_json::from_str(contents)
            .map_err(|e| ConversionError::SourceRead(format!("parsing recording: {}", e)))?;
        Self::from_rows(dump.sample_rate, dump.channel_names, dump.data)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConversionResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConversionError::SourceRead(format!("reading recording {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents).map_err(|e| match e {
            ConversionError::SourceRead(reason) => {
                ConversionError::SourceRead(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> ConversionResult<String> {
        let dump = RecordingDump {
            sample_rate: self.sample_rate,
            channel_names: self.channel_names.clone(),
            data: self.data.outer_iter().map(|row| row.to_vec()).collect(),
        };
        Ok(serde_json::to_string(&dump)?)
    }

    pub fn samples_per_channel(&self) -> usize {
        self.data.ncols()
    }
}

impl RecordingSource for Recording {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.data.nrows()
    }

    fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    fn channel(&self, index: usize) -> ConversionResult<Vec<f64>> {
        if index >= self.channel_count() {
            return Err(ConversionError::ChannelOutOfRange {
                index,
                count: self.channel_count(),
            });
        }
        Ok(self.data.row(index).to_vec())
    }
}
