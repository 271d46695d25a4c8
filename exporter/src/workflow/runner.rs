use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use hypnocore::annotation::{StageMapper, Timeline, TimelineBuilder};
use hypnocore::export::{JsonSink, WaveformArtifact};
use hypnocore::prelude::{ConversionError, ProcessingStage, StageInput};
use hypnocore::processing::{NormalizeStage, ResampleStage};
use hypnocore::source::{extract_channel, AnnotationSet, Recording, RecordingSource};
use log::{info, warn};
use std::path::Path;

#[derive(Debug)]
pub struct WaveformResult {
    pub artifact: WaveformArtifact,
    pub channel_name: String,
    pub source_rate: u32,
    pub source_samples: usize,
    /// Mean removed before scaling.
    pub mean: f64,
    /// Peak magnitude divided out; 0.0 for a constant channel.
    pub peak: f64,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    mapper: StageMapper,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            mapper: StageMapper::new(),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Channel extraction, resampling and normalization for the configured channel.
    pub fn convert_waveform(&self, source: &dyn RecordingSource) -> anyhow::Result<WaveformResult> {
        let channel = self.config.channel;
        let stage_config = self.config.to_stage_config();

        let samples = extract_channel(source, channel)
            .with_context(|| format!("extracting channel {}", channel))?;
        let channel_name = source
            .channel_names()
            .get(channel)
            .cloned()
            .unwrap_or_else(|| format!("ch{}", channel));
        let source_samples = samples.len();
        info!(
            "channel {} ({}): {} samples at {} Hz",
            channel,
            channel_name,
            source_samples,
            source.sample_rate()
        );

        let mut resample_stage = ResampleStage::new();
        resample_stage
            .initialize(&stage_config)
            .context("initializing resample stage")?;
        let resampled = resample_stage
            .execute(StageInput {
                samples,
                sample_rate: source.sample_rate(),
            })
            .with_context(|| {
                format!(
                    "resampling channel {} from {} Hz to {} Hz",
                    channel,
                    source.sample_rate(),
                    stage_config.target_rate
                )
            })?;
        resample_stage.cleanup();
        for note in &resampled.metadata.notes {
            info!("{}", note);
        }

        let mut normalize_stage = NormalizeStage::new();
        normalize_stage
            .initialize(&stage_config)
            .context("initializing normalize stage")?;
        let normalized = normalize_stage
            .execute(resampled.into_input())
            .with_context(|| format!("normalizing channel {}", channel))?;
        normalize_stage.cleanup();
        for note in &normalized.metadata.notes {
            info!("{}", note);
        }

        let mean = normalized.metadata.mean.unwrap_or(0.0);
        let peak = normalized.metadata.peak.unwrap_or(0.0);
        Ok(WaveformResult {
            artifact: WaveformArtifact::from(normalized),
            channel_name,
            source_rate: source.sample_rate(),
            source_samples,
            mean,
            peak,
        })
    }

    /// Label mapping, ordering and coverage check over a full hypnogram.
    pub fn convert_stages(&self, annotations: &AnnotationSet) -> anyhow::Result<Timeline> {
        if annotations.is_empty() {
            warn!("hypnogram has no annotations");
        }
        info!("number of annotations in hypnogram: {}", annotations.len());
        info!("unique labels: {:?}", annotations.unique_labels());

        TimelineBuilder::new(&self.mapper)
            .build(&annotations.events())
            .map_err(|err| {
                let hint = matches!(err, ConversionError::NoSegments { .. });
                let err = anyhow::Error::new(err);
                if hint {
                    err.context("building stage timeline (run `hypnoexport labels` to inspect the vocabulary)")
                } else {
                    err.context("building stage timeline")
                }
            })
    }

    /// Loads a recording dump, converts it and writes the waveform artifact.
    pub fn run_waveform(&self, recording_path: &Path) -> anyhow::Result<WaveformResult> {
        let recording = Recording::from_json_file(recording_path)
            .with_context(|| format!("loading recording {}", recording_path.display()))?;
        let result = self.convert_waveform(&recording)?;
        JsonSink::new(self.config.pretty)
            .write(&result.artifact, &self.config.waveform_output)
            .with_context(|| {
                format!(
                    "writing waveform artifact {}",
                    self.config.waveform_output.display()
                )
            })?;
        Ok(result)
    }

    /// Loads a hypnogram dump, builds the timeline and writes the timeline artifact.
    pub fn run_stages(&self, hypnogram_path: &Path) -> anyhow::Result<Timeline> {
        let annotations = AnnotationSet::from_json_file(hypnogram_path)
            .with_context(|| format!("loading hypnogram {}", hypnogram_path.display()))?;
        let timeline = self.convert_stages(&annotations)?;
        JsonSink::new(self.config.pretty)
            .write(&timeline, &self.config.stages_output)
            .with_context(|| {
                format!(
                    "writing timeline artifact {}",
                    self.config.stages_output.display()
                )
            })?;
        Ok(timeline)
    }
}
