//! Adapters standing in for the recording container reader.
//!
//! The pipelines only see [`RecordingSource`] and plain annotation events;
//! the JSON dumps here are one concrete way to feed them.

pub mod annotations;
pub mod recording;

pub use annotations::AnnotationSet;
pub use recording::{extract_channel, Recording, RecordingSource};
