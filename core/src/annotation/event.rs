use serde::{Deserialize, Serialize};

/// One timed, labeled interval read from a hypnogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    /// Seconds since recording start.
    pub onset: f64,
    pub duration: f64,
    pub label: String,
}

impl AnnotationEvent {
    pub fn new(onset: f64, duration: f64, label: impl Into<String>) -> Self {
        Self {
            onset,
            duration,
            label: label.into(),
        }
    }

    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }

    /// Reason this event cannot sit on the recording's time axis, if any.
    pub fn validate(&self) -> Option<String> {
        if !self.onset.is_finite() || self.onset < 0.0 {
            return Some(format!("onset {} must be a non-negative number", self.onset));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Some(format!(
                "duration {} must be a non-negative number",
                self.duration
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_adds_duration() {
        assert_eq!(AnnotationEvent::new(30.0, 30.0, "Sleep stage W").end(), 60.0);
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        assert!(AnnotationEvent::new(-1.0, 30.0, "x").validate().is_some());
        assert!(AnnotationEvent::new(0.0, f64::NAN, "x").validate().is_some());
        assert!(AnnotationEvent::new(0.0, 0.0, "x").validate().is_none());
    }
}
