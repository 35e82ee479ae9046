//! Transcript rendering
//!
//! Renders segment sets into the timestamped text block stored on the
//! meeting record and exported to `{id}_transcript.txt`. The analysis
//! pipeline later strips the bracketed prefixes back off through
//! [`meetbrief_core::utils::extract_plain_text`].

use meetbrief_core::utils::format_timestamp;
use meetbrief_core::{MergedSegment, TranscriptSegment};

/// Render segments without speaker tags: `[a --> b] text`
#[must_use]
pub fn format_plain_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            format!(
                "[{} --> {}] {}",
                format_timestamp(segment.start),
                format_timestamp(segment.end),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render speaker-annotated segments: `[a --> b] [speaker] text`
#[must_use]
pub fn format_tagged_transcript(segments: &[MergedSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            format!(
                "[{} --> {}] [{}] {}",
                format_timestamp(segment.start),
                format_timestamp(segment.end),
                segment.speaker,
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
