//! Tests for tracklist file parsing.

use std::io::Write;

use tempfile::NamedTempFile;
use tracksplit::Error;
use tracksplit::tracklist::{ParseWarning, parse_str, parse_tracklist_file};

fn tracklist_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".txt").unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_parse_typical_tracklist_file() {
    let file = tracklist_file(
        "# Live set 2024\n\
         0:00 - Intro\n\
         3:45 – Second Song\n\
         1:02:03 | Finale: Part 1/2\n\
         \n\
         Thanks for listening!\n",
    );

    let parsed = parse_tracklist_file(file.path()).unwrap();
    let tracklist = &parsed.tracklist;

    assert_eq!(tracklist.len(), 3);
    assert_eq!(tracklist.as_slice()[0].offset_ms(), 0);
    assert_eq!(tracklist.as_slice()[0].label(), "Intro");
    assert_eq!(tracklist.as_slice()[1].offset_ms(), 225_000);
    assert_eq!(tracklist.as_slice()[1].label(), "Second Song");
    assert_eq!(tracklist.as_slice()[2].offset_ms(), 3_723_000);
    assert_eq!(tracklist.as_slice()[2].label(), "Finale Part 12");

    assert_eq!(
        parsed.warnings,
        vec![ParseWarning::LineNotRecognized {
            line: 6,
            content: "Thanks for listening!".to_string(),
        }]
    );
}

#[test]
fn test_parse_unordered_entries_are_sorted() {
    let parsed = parse_str("10:00 - C\n0:00 - A\n5:00 - B").unwrap();

    let labels: Vec<&str> = parsed.tracklist.iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["A", "B", "C"]);
}

#[test]
fn test_parse_duplicate_offsets_are_kept_and_flagged() {
    let parsed = parse_str("0:00 - A\n1:00 - B\n1:00 - C").unwrap();

    assert_eq!(parsed.tracklist.len(), 3);
    assert_eq!(
        parsed.warnings,
        vec![ParseWarning::DuplicateTimestamp { offset_ms: 60_000 }]
    );
    assert_eq!(parsed.warnings[0].to_string(), "duplicate timestamp at 60s");
}

#[test]
fn test_parse_label_made_only_of_invalid_characters() {
    let parsed = parse_str("0:00 - ???\n1:00 - ...").unwrap();

    assert_eq!(parsed.tracklist.as_slice()[0].label(), "Untitled");
    assert_eq!(parsed.tracklist.as_slice()[1].label(), "Untitled");
}

#[test]
fn test_parse_no_valid_entries_is_an_error() {
    let file = tracklist_file("# nothing here\nnot a track\n\n");

    let result = parse_tracklist_file(file.path());
    assert!(matches!(result, Err(Error::NoTracksFound)));
}

#[test]
fn test_parse_empty_file_is_an_error() {
    let file = tracklist_file("");

    assert!(matches!(
        parse_tracklist_file(file.path()),
        Err(Error::NoTracksFound)
    ));
}

#[test]
fn test_parse_missing_file() {
    let result = parse_tracklist_file(std::path::Path::new("/nonexistent/tracks.txt"));
    assert!(matches!(result, Err(Error::TracklistNotFound { .. })));
}

#[test]
fn test_parse_windows_line_endings_and_bom() {
    let file = tracklist_file("\u{FEFF}0:00 - One\r\n2:30 - Two\r\n");

    let parsed = parse_tracklist_file(file.path()).unwrap();
    assert_eq!(parsed.tracklist.len(), 2);
    assert_eq!(parsed.tracklist.as_slice()[1].label(), "Two");
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_parse_labels_never_contain_reserved_characters() {
    let parsed = parse_str("0:00 - a<b>c:d\"e/f\\g|h?i*j\n1:00 - . padded . ").unwrap();

    for cut in &parsed.tracklist {
        assert!(!cut.label().is_empty());
        assert!(
            !cut.label()
                .contains(['<', '>', ':', '"', '/', '\\', '|', '?', '*'])
        );
        assert!(!cut.label().starts_with(['.', ' ']));
        assert!(!cut.label().ends_with(['.', ' ']));
    }
    assert_eq!(parsed.tracklist.as_slice()[0].label(), "abcdefghij");
    assert_eq!(parsed.tracklist.as_slice()[1].label(), "padded");
}
