use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Closed set of stage codes the downstream consumer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageCode {
    W,
    N1,
    N2,
    N3,
    N4,
    #[serde(rename = "REM")]
    Rem,
}

impl StageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageCode::W => "W",
            StageCode::N1 => "N1",
            StageCode::N2 => "N2",
            StageCode::N3 => "N3",
            StageCode::N4 => "N4",
            StageCode::Rem => "REM",
        }
    }
}

impl fmt::Display for StageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sleep-EDF hypnogram vocabulary. `None` marks labels that are known but
/// deliberately not emitted.
///
/// Stages 3 and 4 stay distinct; they are not merged into a single N3.
pub const SLEEP_EDF_STAGES: &[(&str, Option<StageCode>)] = &[
    ("Sleep stage W", Some(StageCode::W)),
    ("Sleep stage 1", Some(StageCode::N1)),
    ("Sleep stage 2", Some(StageCode::N2)),
    ("Sleep stage 3", Some(StageCode::N3)),
    ("Sleep stage 4", Some(StageCode::N4)),
    ("Sleep stage R", Some(StageCode::Rem)),
    ("Sleep stage ?", None),
    ("Movement time", None),
];

/// How a raw label resolves against the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStatus {
    Stage(StageCode),
    /// Listed in the table with no stage.
    Ignored,
    /// Absent from the table.
    Unknown,
}

impl LabelStatus {
    pub fn stage(&self) -> Option<StageCode> {
        match self {
            LabelStatus::Stage(code) => Some(*code),
            LabelStatus::Ignored | LabelStatus::Unknown => None,
        }
    }
}

impl fmt::Display for LabelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelStatus::Stage(code) => write!(f, "{}", code),
            LabelStatus::Ignored => f.write_str("unmapped (ignored)"),
            LabelStatus::Unknown => f.write_str("unmapped (unknown)"),
        }
    }
}

/// Exact-match lookup from annotation text to a stage code.
///
/// Anything outside the table is unmapped; lookups never fail.
#[derive(Debug, Clone)]
pub struct StageMapper {
    table: HashMap<String, Option<StageCode>>,
}

impl StageMapper {
    pub fn new() -> Self {
        Self::from_entries(SLEEP_EDF_STAGES.iter().copied())
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<StageCode>)>,
        S: Into<String>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(label, code)| (label.into(), code))
                .collect(),
        }
    }

    pub fn classify(&self, label: &str) -> LabelStatus {
        match self.table.get(label) {
            Some(Some(code)) => LabelStatus::Stage(*code),
            Some(None) => LabelStatus::Ignored,
            None => LabelStatus::Unknown,
        }
    }

    /// Stage code for `label`, or `None` when the label is unmapped.
    pub fn map(&self, label: &str) -> Option<StageCode> {
        self.classify(label).stage()
    }
}

impl Default for StageMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_edf_labels_map_to_codes() {
        let mapper = StageMapper::new();
        assert_eq!(mapper.map("Sleep stage W"), Some(StageCode::W));
        assert_eq!(mapper.map("Sleep stage 1"), Some(StageCode::N1));
        assert_eq!(mapper.map("Sleep stage 2"), Some(StageCode::N2));
        assert_eq!(mapper.map("Sleep stage 3"), Some(StageCode::N3));
        assert_eq!(mapper.map("Sleep stage 4"), Some(StageCode::N4));
        assert_eq!(mapper.map("Sleep stage R"), Some(StageCode::Rem));
    }

    #[test]
    fn ignored_and_unknown_labels_are_unmapped() {
        let mapper = StageMapper::new();
        assert_eq!(mapper.classify("Sleep stage ?"), LabelStatus::Ignored);
        assert_eq!(mapper.classify("Movement time"), LabelStatus::Ignored);
        assert_eq!(mapper.classify("Lights off"), LabelStatus::Unknown);
        assert_eq!(mapper.map("sleep stage w"), None);
        assert_eq!(mapper.map(""), None);
    }

    #[test]
    fn custom_entries_extend_vocabulary() {
        let mapper = StageMapper::from_entries(vec![("Stage N3", Some(StageCode::N3))]);
        assert_eq!(mapper.map("Stage N3"), Some(StageCode::N3));
        assert_eq!(mapper.map("Sleep stage 3"), None);
    }

    #[test]
    fn rem_serializes_as_uppercase() {
        assert_eq!(serde_json::to_string(&StageCode::Rem).unwrap(), "\"REM\"");
        assert_eq!(serde_json::to_string(&StageCode::N2).unwrap(), "\"N2\"");
        assert_eq!(StageCode::Rem.to_string(), "REM");
    }
}
