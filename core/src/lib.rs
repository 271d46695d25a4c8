//! Core conversion pipelines for the sleep-stage interchange exporter.
//!
//! Two independent pipelines share one output contract: the waveform path
//! (channel extraction, resampling, normalization) and the annotation path
//! (label mapping, ordering, coverage). Both emit plain serde data that the
//! `export` module writes as JSON artifacts.

pub mod annotation;
pub mod export;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod source;
pub mod telemetry;

pub use prelude::{
    ConversionError, ConversionResult, ProcessingStage, StageConfig, StageInput, StageOutput,
};
