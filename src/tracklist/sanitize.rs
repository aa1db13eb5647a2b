//! Track label sanitization.

use crate::constants::tracklist::{INVALID_LABEL_CHARS, TRIMMED_LABEL_CHARS, UNTITLED_LABEL};

/// Sanitize a free-text track name for use as a filename.
///
/// Strips characters that are invalid in filenames across platforms, then
/// trims dots and spaces from both ends. Falls back to `"Untitled"` when
/// nothing is left.
pub fn sanitize_label(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !INVALID_LABEL_CHARS.contains(c))
        .collect();

    let trimmed = stripped.trim_matches(TRIMMED_LABEL_CHARS);

    if trimmed.is_empty() {
        UNTITLED_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}
