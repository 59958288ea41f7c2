//! Segment sources: where aligned transcript segments come from.

use super::TranscriptSegment;
use crate::error::{Result, SporreError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Trait for loading transcript segments for a video.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Load the segments for the given video title.
    ///
    /// Falls back to a default source when no per-video source exists, and
    /// fails with `TranscriptNotFound` when there is no source at all.
    async fn load(&self, video_title: Option<&str>) -> Result<Vec<TranscriptSegment>>;
}

/// Segment source backed by aligned-segment JSON files in a directory.
///
/// Looks for `aligned_segments_{title}.json` first, then falls back to the
/// shared `aligned_segments.json`.
pub struct JsonSegmentSource {
    dir: PathBuf,
}

impl JsonSegmentSource {
    /// Create a source reading from the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn resolve(&self, video_title: Option<&str>) -> Option<PathBuf> {
        if let Some(title) = video_title.filter(|t| !t.is_empty()) {
            let per_video = self.dir.join(format!("aligned_segments_{}.json", title));
            if per_video.exists() {
                return Some(per_video);
            }
        }

        let default = self.dir.join("aligned_segments.json");
        default.exists().then_some(default)
    }
}

#[async_trait]
impl SegmentSource for JsonSegmentSource {
    async fn load(&self, video_title: Option<&str>) -> Result<Vec<TranscriptSegment>> {
        let path = self.resolve(video_title).ok_or_else(|| {
            SporreError::TranscriptNotFound(
                video_title.unwrap_or("default").to_string(),
            )
        })?;

        debug!("Loading segments from {}", path.display());

        let content = tokio::fs::read_to_string(&path).await?;
        let segments: Vec<TranscriptSegment> = serde_json::from_str(&content)?;
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_segments(dir: &std::path::Path, name: &str, texts: &[&str]) {
        let segments: Vec<TranscriptSegment> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| TranscriptSegment::new(i as f64, (i + 1) as f64, *t))
            .collect();
        std::fs::write(dir.join(name), serde_json::to_string(&segments).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_per_video_file_preferred() {
        let dir = tempfile::tempdir().unwrap();
        write_segments(dir.path(), "aligned_segments.json", &["shared"]);
        write_segments(dir.path(), "aligned_segments_demo.json", &["demo only"]);

        let source = JsonSegmentSource::new(dir.path());
        let segments = source.load(Some("demo")).await.unwrap();
        assert_eq!(segments[0].text, "demo only");
    }

    #[tokio::test]
    async fn test_falls_back_to_default_file() {
        let dir = tempfile::tempdir().unwrap();
        write_segments(dir.path(), "aligned_segments.json", &["shared"]);

        let source = JsonSegmentSource::new(dir.path());
        let segments = source.load(Some("missing")).await.unwrap();
        assert_eq!(segments[0].text, "shared");
    }

    #[tokio::test]
    async fn test_not_found_when_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonSegmentSource::new(dir.path());

        let err = source.load(None).await.unwrap_err();
        assert!(matches!(err, SporreError::TranscriptNotFound(_)));
    }
}
