use anyhow::Context;
use hypnocore::prelude::StageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Invocation-wide settings. Fixed once a command starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Output rate of the waveform artifact, in Hz.
    pub target_rate: u32,
    /// Index of the recording channel to export.
    pub channel: usize,
    pub waveform_output: PathBuf,
    pub stages_output: PathBuf,
    pub pretty: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            target_rate: 50,
            channel: 0,
            waveform_output: PathBuf::from("brainwave_runner_data.json"),
            stages_output: PathBuf::from("brainwave_stages.json"),
            pretty: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_stage_config(&self) -> StageConfig {
        StageConfig {
            target_rate: self.target_rate,
        }
    }
}
