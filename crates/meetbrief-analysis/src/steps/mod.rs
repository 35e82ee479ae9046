//! Concrete pipeline steps

mod actions;
mod decisions;
mod speakers;
mod summary;

pub use actions::ActionsStep;
pub use decisions::DecisionsStep;
pub use speakers::SpeakersStep;
pub use summary::SummaryStep;

/// Unwrap a reply that the model fenced as a ```json block
///
/// Returns the fenced payload when present, otherwise the trimmed input.
pub(crate) fn extract_json_block(reply: &str) -> &str {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    trimmed
}

/// Truncate to at most `max_chars` characters, on a character boundary
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
