//! Tracklist text parsing.
//!
//! Turns hand-typed `<timestamp> <sep> <label>` lines into a [`Tracklist`].
//! Bad lines never abort the parse; they are skipped and reported as
//! [`ParseWarning`]s next to the result.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::tracklist::{COMMENT_MARKER, UTF8_BOM};
use crate::error::{Error, Result};

use super::{CutPoint, ParseWarning, ParsedTracklist, Tracklist, parse_timestamp};

/// Leading timestamp, a separator (`-`, `–`, `—`, `|` or `:`) and the label.
// Pattern is hardcoded and known to be valid
#[allow(clippy::expect_used)]
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}(?::\d{2})?)\s*[-–—|:]\s*(.+)").expect("valid line pattern")
});

/// Parse tracklist lines.
///
/// Lines are numbered from 1 in warnings. Empty lines and lines starting with
/// `#` are ignored.
///
/// # Errors
///
/// Returns [`Error::NoTracksFound`] if no line yields a valid entry.
pub fn parse_lines<I, S>(lines: I) -> Result<ParsedTracklist>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cut_points = Vec::new();
    let mut warnings = Vec::new();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_number = idx + 1;
        let line = raw.as_ref().trim();

        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }

        let Some(captures) = LINE_PATTERN.captures(line) else {
            warnings.push(ParseWarning::LineNotRecognized {
                line: line_number,
                content: line.to_string(),
            });
            continue;
        };

        let timestamp = &captures[1];
        let label = captures[2].trim();

        match parse_timestamp(timestamp) {
            Ok(offset_ms) => cut_points.push(CutPoint::new(offset_ms, label)),
            Err(_) => warnings.push(ParseWarning::InvalidTimestamp {
                line: line_number,
                timestamp: timestamp.to_string(),
            }),
        }
    }

    let tracklist = Tracklist::new(cut_points)?;
    warnings.extend(
        tracklist
            .duplicate_offsets()
            .map(|offset_ms| ParseWarning::DuplicateTimestamp { offset_ms }),
    );

    Ok(ParsedTracklist {
        tracklist,
        warnings,
    })
}

/// Parse tracklist text, accepting `\n` or `\r\n` line endings and a leading
/// byte order mark.
pub fn parse_str(text: &str) -> Result<ParsedTracklist> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    parse_lines(text.lines())
}

/// Read and parse a tracklist file.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist ([`Error::TracklistNotFound`])
/// - The file cannot be read or is not UTF-8 ([`Error::TracklistRead`])
/// - No line yields a valid entry ([`Error::NoTracksFound`])
pub fn parse_tracklist_file(path: &Path) -> Result<ParsedTracklist> {
    if !path.exists() {
        return Err(Error::TracklistNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::TracklistRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_str(&contents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn offsets(parsed: &ParsedTracklist) -> Vec<u64> {
        parsed.tracklist.iter().map(CutPoint::offset_ms).collect()
    }

    fn labels(parsed: &ParsedTracklist) -> Vec<&str> {
        parsed.tracklist.iter().map(CutPoint::label).collect()
    }

    #[test]
    fn test_parse_basic_tracklist() {
        let parsed = parse_lines([
            "0:00:00 - Intro",
            "0:03:45 - Song 2",
            "# this is a comment",
            "0:07:30 | Outro",
        ])
        .unwrap();

        assert_eq!(offsets(&parsed), [0, 225_000, 450_000]);
        assert_eq!(labels(&parsed), ["Intro", "Song 2", "Outro"]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_all_separators() {
        let parsed = parse_lines([
            "0:00 - Dash",
            "0:10 – En dash",
            "0:20 — Em dash",
            "0:30 | Pipe",
            "0:40: Colon",
            "0:50-Tight",
        ])
        .unwrap();

        assert_eq!(
            labels(&parsed),
            ["Dash", "En dash", "Em dash", "Pipe", "Colon", "Tight"]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_sorts_and_flags_duplicates() {
        let parsed = parse_lines([
            "0:05 - Five",
            "0:03 - Three A",
            "0:03 - Three B",
            "0:09 - Nine",
        ])
        .unwrap();

        assert_eq!(offsets(&parsed), [3000, 3000, 5000, 9000]);
        assert_eq!(labels(&parsed), ["Three A", "Three B", "Five", "Nine"]);
        assert_eq!(
            parsed.warnings,
            [ParseWarning::DuplicateTimestamp { offset_ms: 3000 }]
        );
    }

    #[test]
    fn test_parse_records_unrecognized_lines() {
        let parsed = parse_lines(["0:00 - Intro", "just some text", "", "1:00 Song"]).unwrap();

        assert_eq!(parsed.tracklist.len(), 1);
        assert_eq!(
            parsed.warnings,
            [
                ParseWarning::LineNotRecognized {
                    line: 2,
                    content: "just some text".to_string()
                },
                ParseWarning::LineNotRecognized {
                    line: 4,
                    content: "1:00 Song".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_non_ascii_digits_are_bad_timestamps_not_unrecognized() {
        let parsed = parse_lines(["0:00 - Intro", "١:٠٠ - Arabic digits"]).unwrap();

        assert_eq!(parsed.tracklist.len(), 1);
        assert_eq!(
            parsed.warnings,
            [ParseWarning::InvalidTimestamp {
                line: 2,
                timestamp: "١:٠٠".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_optional_seconds_group_backs_off() {
        // "12:34:5x" is not H:MM:SS, so the ":" acts as the separator
        let parsed = parse_lines(["12:34:5x - odd"]).unwrap();
        assert_eq!(offsets(&parsed), [754_000]);
        assert_eq!(labels(&parsed), ["5x - odd"]);
    }

    #[test]
    fn test_parse_sanitizes_labels() {
        let parsed = parse_lines(["0:00 - AC/DC: Back in Black?", "1:00 - ..."]).unwrap();
        assert_eq!(labels(&parsed), ["ACDC Back in Black", "Untitled"]);
    }

    #[test]
    fn test_parse_comment_only_input_fails() {
        let result = parse_lines(["# header", "", "   ", "# footer"]);
        assert!(matches!(result, Err(Error::NoTracksFound)));
    }

    #[test]
    fn test_parse_str_handles_bom_and_crlf() {
        let parsed = parse_str("\u{FEFF}0:00 - Intro\r\n1:00 - Outro\r\n").unwrap();
        assert_eq!(labels(&parsed), ["Intro", "Outro"]);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_tracklist_file_missing() {
        let result = parse_tracklist_file(Path::new("/nonexistent/tracks.txt"));
        assert!(matches!(result, Err(Error::TracklistNotFound { .. })));
    }
}
