//! Transcript / speaker-turn alignment
//!
//! The recognizer and the diarizer segment the same timeline independently;
//! their boundaries never line up. Each transcript segment is assigned the
//! speaker with the largest accumulated overlap, so a segment spanning a
//! speaker change goes to whoever held most of it. Segments no turn overlaps
//! at all (VAD gaps, dropped backchannels) fall back to the nearest turn by
//! midpoint distance, and when there are no turns to consult the previous
//! segment's speaker carries forward.

use indexmap::IndexMap;
use meetbrief_core::{MergedSegment, SpeakerSegment, TranscriptSegment};
use std::collections::HashSet;

/// Label assigned when no speaker can be derived at all
pub const FALLBACK_SPEAKER: &str = "Speaker 1";

/// Merge transcript segments with speaker turns
///
/// Pure function: one output per input transcript segment, in input order;
/// `start`, `end` and `text` pass through unchanged, only `speaker` is
/// added. Equal-overlap and equal-distance ties resolve to the first
/// speaker segment encountered, so the result is stable for a given input
/// order.
#[must_use]
pub fn merge_transcript_with_speakers(
    transcript_segments: &[TranscriptSegment],
    speaker_segments: &[SpeakerSegment],
) -> Vec<MergedSegment> {
    let mut result = Vec::with_capacity(transcript_segments.len());
    let mut last_known_speaker: Option<String> = None;

    for t_seg in transcript_segments {
        // Accumulate overlap per speaker; insertion order is first-seen
        // order, and only a strictly larger total displaces the leader.
        let mut overlap: IndexMap<&str, f64> = IndexMap::new();
        for s_seg in speaker_segments {
            let overlap_start = t_seg.start.max(s_seg.start);
            let overlap_end = t_seg.end.min(s_seg.end);
            if overlap_start < overlap_end {
                *overlap.entry(s_seg.speaker.as_str()).or_insert(0.0) +=
                    overlap_end - overlap_start;
            }
        }

        let mut speaker = overlap
            .iter()
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .map(|(name, _)| (*name).to_string());

        // No turn overlaps this segment: take the nearest turn by the
        // distance from the segment midpoint to the turn's closer edge.
        if speaker.is_none() {
            let midpoint = f64::midpoint(t_seg.start, t_seg.end);
            let mut min_distance = f64::INFINITY;
            for s_seg in speaker_segments {
                let distance = if midpoint < s_seg.start {
                    s_seg.start - midpoint
                } else if midpoint > s_seg.end {
                    midpoint - s_seg.end
                } else {
                    0.0
                };
                if distance < min_distance {
                    min_distance = distance;
                    speaker = Some(s_seg.speaker.clone());
                }
            }
        }

        // No turns at all: carry the previous assignment forward.
        let speaker = speaker.unwrap_or_else(|| {
            last_known_speaker
                .clone()
                .unwrap_or_else(|| FALLBACK_SPEAKER.to_string())
        });

        last_known_speaker = Some(speaker.clone());

        result.push(MergedSegment {
            start: t_seg.start,
            end: t_seg.end,
            text: t_seg.text.clone(),
            speaker,
        });
    }

    result
}

/// Number of distinct speaker labels in a merged segment set
#[must_use]
pub fn distinct_speaker_count(segments: &[MergedSegment]) -> usize {
    segments
        .iter()
        .filter(|s| !s.speaker.is_empty())
        .map(|s| s.speaker.as_str())
        .collect::<HashSet<_>>()
        .len()
}
