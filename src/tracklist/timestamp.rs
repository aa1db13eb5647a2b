//! Clock timestamp parsing and formatting.

use crate::constants::time::{MS_PER_SECOND, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::error::{Error, Result};

/// Parse an `H:MM:SS`, `HH:MM:SS` or `MM:SS` timestamp into milliseconds.
///
/// Minutes and seconds are not range-checked, so `"75:99"` is accepted as
/// 75 minutes and 99 seconds.
pub fn parse_timestamp(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let invalid = || Error::InvalidTimestamp {
        value: trimmed.to_string(),
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (parse_component(h), parse_component(m), parse_component(s)),
        [m, s] => (Some(0), parse_component(m), parse_component(s)),
        _ => return Err(invalid()),
    };

    let (Some(hours), Some(minutes), Some(seconds)) = (hours, minutes, seconds) else {
        return Err(invalid());
    };

    hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|h| minutes.checked_mul(SECONDS_PER_MINUTE)?.checked_add(h))
        .and_then(|hm| hm.checked_add(seconds))
        .and_then(|total| total.checked_mul(MS_PER_SECOND))
        .ok_or_else(invalid)
}

/// Parse a single clock component: one or more ASCII digits, no sign.
fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Format milliseconds as `H:MM:SS`, or `M:SS` when under an hour.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / MS_PER_SECOND;
    let hours = total_secs / SECONDS_PER_HOUR;
    let minutes = (total_secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_secs % SECONDS_PER_MINUTE;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
