//! Tests for segment planning over parsed tracklists.

use tracksplit::segments::{PlanWarning, plan_segments};
use tracksplit::tracklist::parse_str;

#[test]
fn test_plan_covers_recording_without_gaps() {
    let parsed = parse_str("0:00 - A\n1:00 - B\n1:30 - C").unwrap();
    let plan = plan_segments(&parsed.tracklist, 120_000);

    assert!(plan.warnings.is_empty());
    assert_eq!(plan.segments.len(), 3);
    assert_eq!(plan.segments[0].start_ms, 0);
    for pair in plan.segments.windows(2) {
        assert_eq!(pair[0].end_ms, pair[1].start_ms);
    }
    assert_eq!(plan.segments.last().unwrap().end_ms, 120_000);
}

#[test]
fn test_plan_first_cut_after_zero_leaves_lead_in_out() {
    let parsed = parse_str("0:10 - A\n0:40 - B").unwrap();
    let plan = plan_segments(&parsed.tracklist, 60_000);

    assert_eq!(plan.segments[0].start_ms, 10_000);
    assert_eq!(plan.segments[1].end_ms, 60_000);
}

#[test]
fn test_plan_tracklist_longer_than_audio() {
    let parsed = parse_str("0:00 - A\n1:00 - B\n5:00 - C\n6:00 - D").unwrap();
    let plan = plan_segments(&parsed.tracklist, 180_000);

    let labels: Vec<&str> = plan.segments.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B"]);
    assert_eq!(plan.segments[1].end_ms, 180_000);
    assert_eq!(plan.out_of_range_count(), 2);
    assert!(matches!(
        &plan.warnings[0],
        PlanWarning::SegmentOutOfRange { position: 3, .. }
    ));
}

#[test]
fn test_plan_duplicate_offsets_number_without_gaps() {
    let parsed = parse_str("0:00 - A\n1:00 - B\n1:00 - C\n2:00 - D").unwrap();
    let plan = plan_segments(&parsed.tracklist, 180_000);

    let indices: Vec<usize> = plan.segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    let stems: Vec<String> = plan.segments.iter().map(|s| s.file_stem()).collect();
    assert_eq!(stems, vec!["01 - A", "02 - C", "03 - D"]);
    assert!(matches!(
        &plan.warnings[0],
        PlanWarning::SegmentInvalidDuration { position: 2, .. }
    ));
}

#[test]
fn test_plan_segments_respect_bounds() {
    let parsed = parse_str("0:05 - A\n0:05 - B\n0:59 - C\n1:00 - D\n1:01 - E").unwrap();
    let total = 60_000;
    let plan = plan_segments(&parsed.tracklist, total);

    for segment in &plan.segments {
        assert!(segment.start_ms < segment.end_ms);
        assert!(segment.end_ms <= total);
        assert!(segment.duration_ms() > 0);
    }
}
