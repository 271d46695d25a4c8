use anyhow::Context;
use hypnocore::annotation::AnnotationEvent;
use hypnocore::source::{AnnotationSet, Recording, RecordingSource};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

/// Hypnogram epochs cycle through this sequence; the final epoch is left unscored.
const EPOCH_CYCLE: &[&str] = &[
    "Sleep stage W",
    "Sleep stage 1",
    "Sleep stage 2",
    "Sleep stage 3",
    "Sleep stage 4",
    "Sleep stage 2",
    "Movement time",
    "Sleep stage R",
];

const UNSCORED: &str = "Sleep stage ?";

/// Configuration for generating a synthetic recording and hypnogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seconds: u32,
    pub sample_rate: u32,
    pub channels: usize,
    /// Base tone in Hz; channel `c` runs at `frequency * (1 + c / 2)`.
    pub frequency: f64,
    /// Amplitude in volts, matching what EDF readers report for EEG.
    pub amplitude: f64,
    pub noise: f64,
    pub seed: u64,
    pub epoch_sec: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seconds: 300,
            sample_rate: 100,
            channels: 2,
            frequency: 10.0,
            amplitude: 50e-6,
            noise: 5e-6,
            seed: 0,
            epoch_sec: 30,
        }
    }
}

impl GeneratorConfig {
    fn normalized_rate(&self) -> u32 {
        self.sample_rate.max(1)
    }

    fn normalized_epoch(&self) -> u32 {
        self.epoch_sec.max(1)
    }
}

pub fn build_recording(config: &GeneratorConfig) -> anyhow::Result<Recording> {
    let rate = config.normalized_rate();
    let sample_count = (config.seconds as usize)
        .checked_mul(rate as usize)
        .context("overflow computing sample count for generator")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows = Vec::with_capacity(config.channels);
    let mut names = Vec::with_capacity(config.channels);

    for channel in 0..config.channels {
        let frequency = config.frequency * (1.0 + channel as f64 / 2.0);
        let offset = config.amplitude * 0.2 * (channel as f64 + 1.0);
        let mut row = Vec::with_capacity(sample_count);
        for index in 0..sample_count {
            let t = index as f64 / rate as f64;
            let envelope = 0.6 + 0.4 * (2.0 * PI * t / config.seconds.max(1) as f64).cos();
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            row.push(offset + config.amplitude * envelope * (2.0 * PI * frequency * t).sin() + jitter);
        }
        rows.push(row);
        names.push(format!("EEG synthetic {}", channel));
    }

    Recording::from_rows(rate, names, rows).context("assembling synthetic recording")
}

pub fn build_hypnogram(config: &GeneratorConfig) -> AnnotationSet {
    let epoch = config.normalized_epoch();
    let epochs = (config.seconds / epoch) as usize;

    let events: Vec<AnnotationEvent> = (0..epochs)
        .map(|index| {
            let label = if epochs > 1 && index == epochs - 1 {
                UNSCORED
            } else {
                EPOCH_CYCLE[index % EPOCH_CYCLE.len()]
            };
            AnnotationEvent::new((index as u32 * epoch) as f64, epoch as f64, label)
        })
        .collect();

    AnnotationSet::from_events(&events)
}

/// Writes `recording.json` and `hypnogram.json` into `dir`.
pub fn write_fixtures(config: &GeneratorConfig, dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let recording_path = dir.join("recording.json");
    let recording = build_recording(config)?;
    info!(
        "synthetic recording: {} channel(s) x {} samples at {} Hz",
        recording.channel_count(),
        recording.samples_per_channel(),
        recording.sample_rate()
    );
    fs::write(&recording_path, recording.to_json()?)
        .with_context(|| format!("writing {}", recording_path.display()))?;

    let hypnogram_path = dir.join("hypnogram.json");
    fs::write(&hypnogram_path, build_hypnogram(config).to_json()?)
        .with_context(|| format!("writing {}", hypnogram_path.display()))?;

    Ok((recording_path, hypnogram_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generator_builds_expected_sample_count() {
        let recording = build_recording(&GeneratorConfig::default()).unwrap();
        assert_eq!(recording.channel_count(), 2);
        assert_eq!(recording.samples_per_channel(), 300 * 100);
        assert_eq!(recording.sample_rate(), 100);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            seconds: 2,
            seed: 13,
            ..Default::default()
        };
        let a = build_recording(&config).unwrap();
        let b = build_recording(&config).unwrap();
        assert_eq!(a.channel(1).unwrap(), b.channel(1).unwrap());
    }

    #[test]
    fn zero_noise_is_allowed() {
        let config = GeneratorConfig {
            seconds: 1,
            noise: 0.0,
            ..Default::default()
        };
        assert!(build_recording(&config).is_ok());
    }

    #[test]
    fn hypnogram_ends_with_unscored_epoch() {
        let set = build_hypnogram(&GeneratorConfig::default());
        assert_eq!(set.len(), 10);
        assert_eq!(set.description.last().map(String::as_str), Some(UNSCORED));
        assert_eq!(set.onset[9], 270.0);
    }

    #[test]
    fn fixtures_land_in_directory() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig {
            seconds: 60,
            ..Default::default()
        };
        let (recording, hypnogram) = write_fixtures(&config, dir.path()).unwrap();
        assert!(recording.exists());
        assert_eq!(AnnotationSet::from_json_file(hypnogram).unwrap().len(), 2);
    }
}
