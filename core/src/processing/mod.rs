pub mod normalize;
pub mod resample;

pub use normalize::{normalize_in_place, NormalizeStage, Normalization};
pub use resample::{resample, resampled_len, ResampleStage};
