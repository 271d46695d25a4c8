use crate::annotation::event::AnnotationEvent;
use crate::annotation::stage::{StageCode, StageMapper};
use crate::prelude::{ConversionError, ConversionResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A mapped annotation placed on the recording's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSegment {
    pub t: f64,
    pub stage: StageCode,
}

/// Ordered stage segments plus the full annotated span of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub total_duration_sec: f64,
    pub segments: Vec<StageSegment>,
}

/// Maps, orders and validates a hypnogram's events into a [`Timeline`].
pub struct TimelineBuilder<'a> {
    mapper: &'a StageMapper,
    logger: LogManager,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(mapper: &'a StageMapper) -> Self {
        Self {
            mapper,
            logger: LogManager::new("timeline"),
        }
    }

    pub fn build(&self, events: &[AnnotationEvent]) -> ConversionResult<Timeline> {
        for (index, event) in events.iter().enumerate() {
            if let Some(reason) = event.validate() {
                return Err(ConversionError::InvalidAnnotation { index, reason });
            }
        }

        let mut unmapped = BTreeSet::new();
        let mut segments = Vec::with_capacity(events.len());
        for event in events {
            match self.mapper.map(&event.label) {
                Some(stage) => segments.push(StageSegment {
                    t: event.onset,
                    stage,
                }),
                None => {
                    unmapped.insert(event.label.clone());
                }
            }
        }

        if segments.is_empty() {
            return Err(ConversionError::NoSegments { unmapped });
        }

        // Stable: equal onsets keep source order.
        segments.sort_by(|a, b| a.t.total_cmp(&b.t));

        // `max_by` keeps the later of equal onsets.
        let total_duration_sec = events
            .iter()
            .max_by(|a, b| a.onset.total_cmp(&b.onset))
            .map(AnnotationEvent::end)
            .unwrap_or_default();

        let dropped = events.len() - segments.len();
        if dropped > 0 {
            self.logger.record(&format!(
                "dropped {} unmapped annotation(s): {:?}",
                dropped, unmapped
            ));
        }
        self.logger.record(&format!(
            "{} segment(s) spanning {:.1} s",
            segments.len(),
            total_duration_sec
        ));

        Ok(Timeline {
            total_duration_sec,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(onset: f64, duration: f64, label: &str) -> AnnotationEvent {
        AnnotationEvent::new(onset, duration, label)
    }

    #[test]
    fn trailing_unscored_epoch_counts_toward_duration() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(0.0, 30.0, "Sleep stage W"),
            ev(30.0, 30.0, "Sleep stage 1"),
            ev(60.0, 30.0, "Sleep stage ?"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        assert_eq!(
            timeline.segments,
            vec![
                StageSegment {
                    t: 0.0,
                    stage: StageCode::W
                },
                StageSegment {
                    t: 30.0,
                    stage: StageCode::N1
                },
            ]
        );
        assert_eq!(timeline.total_duration_sec, 90.0);
    }

    #[test]
    fn unordered_events_are_sorted_with_stable_ties() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(60.0, 30.0, "Sleep stage 2"),
            ev(0.0, 30.0, "Sleep stage W"),
            ev(30.0, 0.0, "Sleep stage R"),
            ev(30.0, 30.0, "Sleep stage 1"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        let stages: Vec<_> = timeline.segments.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![StageCode::W, StageCode::Rem, StageCode::N1, StageCode::N2]
        );
        assert!(timeline.segments.windows(2).all(|w| w[0].t <= w[1].t));
    }

    #[test]
    fn total_duration_uses_last_event_by_onset_not_longest() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(0.0, 1000.0, "Sleep stage W"),
            ev(100.0, 30.0, "Sleep stage 2"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        assert_eq!(timeline.total_duration_sec, 130.0);
    }

    #[test]
    fn equal_last_onsets_use_later_event() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(60.0, 30.0, "Sleep stage W"),
            ev(60.0, 10.0, "Sleep stage ?"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        assert_eq!(timeline.total_duration_sec, 70.0);

        let reversed: Vec<_> = events.into_iter().rev().collect();
        let timeline = TimelineBuilder::new(&mapper).build(&reversed).unwrap();
        assert_eq!(timeline.total_duration_sec, 90.0);
    }

    #[test]
    fn last_event_may_precede_in_source_order() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(120.0, 30.0, "Movement time"),
            ev(0.0, 30.0, "Sleep stage W"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        assert_eq!(timeline.total_duration_sec, 150.0);
        assert_eq!(timeline.segments.len(), 1);
    }

    #[test]
    fn unknown_labels_never_become_stages() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(0.0, 30.0, "Sleep stage W"),
            ev(30.0, 30.0, "Arousal"),
            ev(60.0, 30.0, "Movement time"),
            ev(90.0, 30.0, "Sleep stage ?"),
        ];
        let timeline = TimelineBuilder::new(&mapper).build(&events).unwrap();
        assert_eq!(timeline.segments.len(), 1);
        assert_eq!(timeline.segments[0].stage, StageCode::W);
    }

    #[test]
    fn all_unmapped_fails_with_distinct_labels() {
        let mapper = StageMapper::new();
        let events = vec![
            ev(0.0, 30.0, "Stage W"),
            ev(30.0, 30.0, "Stage W"),
            ev(60.0, 30.0, "Sleep stage ?"),
        ];
        let err = TimelineBuilder::new(&mapper).build(&events).unwrap_err();
        match err {
            ConversionError::NoSegments { unmapped } => {
                let labels: Vec<_> = unmapped.into_iter().collect();
                assert_eq!(labels, vec!["Sleep stage ?", "Stage W"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_annotation_list_has_no_segments() {
        let mapper = StageMapper::new();
        let err = TimelineBuilder::new(&mapper).build(&[]).unwrap_err();
        assert!(matches!(err, ConversionError::NoSegments { .. }));
    }

    #[test]
    fn negative_onset_is_rejected_with_index() {
        let mapper = StageMapper::new();
        let events = vec![ev(0.0, 30.0, "Sleep stage W"), ev(-5.0, 30.0, "Sleep stage 1")];
        let err = TimelineBuilder::new(&mapper).build(&events).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidAnnotation { index: 1, .. }));
    }

    #[test]
    fn timeline_serializes_with_camel_case_keys() {
        let timeline = Timeline {
            total_duration_sec: 90.0,
            segments: vec![StageSegment {
                t: 0.0,
                stage: StageCode::Rem,
            }],
        };
        let json = serde_json::to_string(&timeline).unwrap();
        assert_eq!(
            json,
            r#"{"totalDurationSec":90.0,"segments":[{"t":0.0,"stage":"REM"}]}"#
        );
    }
}
