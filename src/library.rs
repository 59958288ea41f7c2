//! Video library listing.
//!
//! Enumerates video files in a directory by extension. Transcripts and
//! answers never depend on the media files themselves; the listing only
//! feeds the `/videos` endpoint and the `videos` CLI command.

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// A video available for questioning.
#[derive(Debug, Clone, Serialize)]
pub struct VideoEntry {
    pub title: String,
    pub file: String,
    pub thumbnail: String,
    pub duration: String,
    pub description: String,
}

/// List video files in `dir` matching the given extensions.
///
/// A missing directory yields an empty list rather than an error; the
/// library is optional.
pub fn list_videos(dir: &Path, extensions: &[String]) -> Result<Vec<VideoEntry>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut videos = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        let matches_ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
            });
        if !matches_ext {
            continue;
        }

        let title = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
            .to_string();

        videos.push(VideoEntry {
            title,
            file: format!("/{}", name),
            thumbnail: format!("/{}", name),
            duration: String::new(),
            description: "Uploaded video".to_string(),
        });
    }

    videos.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(videos)
}
