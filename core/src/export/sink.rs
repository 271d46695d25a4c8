use crate::export::artifact::Artifact;
use crate::prelude::{ConversionError, ConversionResult};
use crate::telemetry::log::LogManager;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes artifacts as UTF-8 JSON, all or nothing.
pub struct JsonSink {
    pretty: bool,
    logger: LogManager,
}

impl JsonSink {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            logger: LogManager::new("sink"),
        }
    }

    pub fn render<A: Artifact>(&self, artifact: &A) -> ConversionResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(artifact)?
        } else {
            serde_json::to_string(artifact)?
        };
        Ok(json)
    }

    /// Serializes `artifact` and atomically replaces `path` with it.
    ///
    /// The bytes go to a temporary file next to `path` first, so a failure
    /// never leaves a truncated artifact behind.
    pub fn write<A: Artifact, P: AsRef<Path>>(&self, artifact: &A, path: P) -> ConversionResult<()> {
        let path = path.as_ref();
        let json = self.render(artifact)?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| ConversionError::Io(e.error))?;

        self.logger.record(&format!(
            "wrote {} artifact {} ({})",
            A::KIND,
            path.display(),
            artifact.summary()
        ));
        Ok(())
    }
}

impl Default for JsonSink {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::waveform::WaveformArtifact;
    use tempfile::tempdir;

    #[test]
    fn write_creates_parent_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("wave.json");
        JsonSink::default()
            .write(&WaveformArtifact::new(50, vec![1.0, -1.0]), &path)
            .unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, r#"{"sampleRate":50,"values":[1.0,-1.0]}"#);
    }

    #[test]
    fn write_leaves_no_stray_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wave.json");
        JsonSink::new(true)
            .write(&WaveformArtifact::new(50, vec![0.0]), &path)
            .unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn pretty_render_spans_lines() {
        let json = JsonSink::new(true)
            .render(&WaveformArtifact::new(50, vec![0.0]))
            .unwrap();
        assert!(json.contains('\n'));
    }
}
