//! Utility functions for `MeetBrief`

/// Format a time offset in seconds as a transcript timestamp
///
/// Produces `HH:MM:SS` when the offset reaches a full hour, `MM:SS`
/// otherwise. Fractional seconds are truncated; negative or non-finite
/// inputs clamp to zero.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Recover plain text from a formatted transcript
///
/// Each transcript line carries bracketed prefixes
/// (`[MM:SS --> MM:SS] [speaker] text`); everything up to and including the
/// last `]` is stripped. Lines without a `]`, or with nothing after it, are
/// dropped.
#[must_use]
pub fn extract_plain_text(transcript: &str) -> String {
    transcript
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.rsplit_once(']')?;
            let text = rest.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
