pub mod event;
pub mod stage;
pub mod timeline;

pub use event::AnnotationEvent;
pub use stage::{LabelStatus, StageCode, StageMapper, SLEEP_EDF_STAGES};
pub use timeline::{StageSegment, Timeline, TimelineBuilder};
