pub mod artifact;
pub mod sink;
pub mod waveform;

pub use artifact::Artifact;
pub use sink::JsonSink;
pub use waveform::WaveformArtifact;
