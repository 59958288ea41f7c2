//! Transcript segment model and segment sources.
//!
//! A transcript is an ordered list of timestamped segments, optionally
//! attributed to speakers. Segments arrive pre-aligned from an external
//! transcription step; this crate only consumes them.

mod source;

pub use source::{JsonSegmentSource, SegmentSource};

use serde::{Deserialize, Serialize};

/// A single timestamped span of transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label, when diarization was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcribed text content.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            speaker: None,
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Speaker label for display, defaulting to "Unknown".
    pub fn speaker_or_unknown(&self) -> &str {
        self.speaker.as_deref().unwrap_or("Unknown")
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
