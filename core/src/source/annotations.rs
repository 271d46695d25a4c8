use crate::annotation::event::AnnotationEvent;
use crate::prelude::{ConversionError, ConversionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Hypnogram annotations as parallel onset/duration/description arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub onset: Vec<f64>,
    pub duration: Vec<f64>,
    pub description: Vec<String>,
}

impl AnnotationSet {
    pub fn from_events(events: &[AnnotationEvent]) -> Self {
        Self {
            onset: events.iter().map(|e| e.onset).collect(),
            duration: events.iter().map(|e| e.duration).collect(),
            description: events.iter().map(|e| e.label.clone()).collect(),
        }
    }

    pub fn from_json_str(contents: &str) -> ConversionResult<Self> {
        let set: AnnotationSet = serde_json::from_str(contents)
            .map_err(|e| ConversionError::SourceRead(format!("parsing annotations: {}", e)))?;
        set.check_lengths()?;
        Ok(set)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConversionResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConversionError::SourceRead(format!("reading annotations {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents).map_err(|e| match e {
            ConversionError::SourceRead(reason) => {
                ConversionError::SourceRead(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> ConversionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn check_lengths(&self) -> ConversionResult<()> {
        let len = self.onset.len();
        if self.duration.len() != len || self.description.len() != len {
            return Err(ConversionError::SourceRead(format!(
                "annotation arrays differ in length: {} onsets, {} durations, {} descriptions",
                len,
                self.duration.len(),
                self.description.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.onset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.onset.is_empty()
    }

    /// Events in source order.
    pub fn events(&self) -> Vec<AnnotationEvent> {
        self.onset
            .iter()
            .zip(&self.duration)
            .zip(&self.description)
            .map(|((&onset, &duration), label)| AnnotationEvent::new(onset, duration, label.clone()))
            .collect()
    }

    pub fn unique_labels(&self) -> BTreeSet<&str> {
        self.description.iter().map(String::as_str).collect()
    }
}
