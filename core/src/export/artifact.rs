use crate::annotation::timeline::Timeline;
use serde::Serialize;

/// A finished pipeline result ready for the JSON sink.
pub trait Artifact: Serialize {
    const KIND: &'static str;

    /// One-line description for progress output.
    fn summary(&self) -> String;
}

impl Artifact for Timeline {
    const KIND: &'static str = "timeline";

    fn summary(&self) -> String {
        format!(
            "{} segments, total duration {} s",
            self.segments.len(),
            self.total_duration_sec
        )
    }
}
