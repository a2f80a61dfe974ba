// transcription/types.rs
//
// Transcript data types and formatting utilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One transcribed chunk, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub sequence_id: u64,
    pub text: String,
    /// Seconds from session start when the segment arrived
    pub session_time: f64,
    pub received_at: DateTime<Utc>,
}

impl TranscriptSegment {
    /// Display form, e.g. "[01:05] Today we look at fractions."
    pub fn display(&self) -> String {
        format!("{} {}", format_session_time(self.session_time), self.text)
    }
}

/// Format session-relative time as [MM:SS]
pub fn format_session_time(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0).floor() as u64;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;

    format!("[{:02}:{:02}]", minutes, secs)
}

/// Join segments into the running transcript text
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
