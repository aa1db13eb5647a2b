//! Segment planning.
//!
//! Each track ends where the next one starts; the last track runs to the end
//! of the recording.

use serde::Serialize;

use crate::tracklist::{Tracklist, format_timestamp};

/// A bounded time range ready to be extracted from the source recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// 1-based position among emitted segments.
    pub index: usize,
    /// Sanitized track label.
    pub label: String,
    /// Start offset in milliseconds.
    pub start_ms: u64,
    /// End offset in milliseconds (exclusive).
    pub end_ms: u64,
}

impl Segment {
    /// Length of the segment in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Output file stem, e.g. `03 - Song Name`.
    pub fn file_stem(&self) -> String {
        format!("{:02} - {}", self.index, self.label)
    }
}

/// A recoverable problem found while planning segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The cut point starts at or after the end of the recording.
    #[error(
        "track {position} '{label}' starts at {} but the audio is only {} long; skipping",
        format_timestamp(*start_ms),
        format_timestamp(*total_duration_ms)
    )]
    SegmentOutOfRange {
        /// 1-based position in the sorted tracklist.
        position: usize,
        /// Track label.
        label: String,
        /// Start offset in milliseconds.
        start_ms: u64,
        /// Total duration of the recording in milliseconds.
        total_duration_ms: u64,
    },

    /// The computed segment has zero length.
    #[error("track {position} '{label}' has invalid duration; skipping")]
    SegmentInvalidDuration {
        /// 1-based position in the sorted tracklist.
        position: usize,
        /// Track label.
        label: String,
        /// Start offset in milliseconds.
        start_ms: u64,
        /// End offset in milliseconds after clamping.
        end_ms: u64,
    },
}

/// Planned segments together with the warnings raised while planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Non-overlapping segments ordered by start.
    pub segments: Vec<Segment>,
    /// Warnings in tracklist order.
    pub warnings: Vec<PlanWarning>,
}

impl SegmentPlan {
    /// Number of cut points that lie past the end of the recording.
    pub fn out_of_range_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, PlanWarning::SegmentOutOfRange { .. }))
            .count()
    }
}

/// Compute output segments for a tracklist and a known total duration.
///
/// Never fails: cut points that start past the end of the audio, or that
/// would produce an empty segment, are skipped with a warning. Emitted
/// segments are numbered without gaps.
pub fn plan_segments(tracklist: &Tracklist, total_duration_ms: u64) -> SegmentPlan {
    let cut_points = tracklist.as_slice();
    let mut segments: Vec<Segment> = Vec::with_capacity(cut_points.len());
    let mut warnings = Vec::new();

    for (i, cut_point) in cut_points.iter().enumerate() {
        let position = i + 1;
        let start_ms = cut_point.offset_ms();
        let end_ms = cut_points
            .get(i + 1)
            .map_or(total_duration_ms, |next| next.offset_ms());

        if start_ms >= total_duration_ms {
            warnings.push(PlanWarning::SegmentOutOfRange {
                position,
                label: cut_point.label().to_string(),
                start_ms,
                total_duration_ms,
            });
            continue;
        }

        let end_ms = end_ms.min(total_duration_ms);

        if end_ms <= start_ms {
            warnings.push(PlanWarning::SegmentInvalidDuration {
                position,
                label: cut_point.label().to_string(),
                start_ms,
                end_ms,
            });
            continue;
        }

        segments.push(Segment {
            index: segments.len() + 1,
            label: cut_point.label().to_string(),
            start_ms,
            end_ms,
        });
    }

    SegmentPlan { segments, warnings }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tracklist::CutPoint;

    fn tracklist(entries: &[(u64, &str)]) -> Tracklist {
        Tracklist::new(
            entries
                .iter()
                .map(|(ms, label)| CutPoint::new(*ms, label))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_last_segment_runs_to_total_duration() {
        let plan = plan_segments(&tracklist(&[(0, "A"), (60_000, "B")]), 90_000);

        assert_eq!(
            plan.segments,
            [
                Segment {
                    index: 1,
                    label: "A".to_string(),
                    start_ms: 0,
                    end_ms: 60_000
                },
                Segment {
                    index: 2,
                    label: "B".to_string(),
                    start_ms: 60_000,
                    end_ms: 90_000
                },
            ]
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_start_at_total_duration_is_skipped() {
        let plan = plan_segments(&tracklist(&[(0, "A"), (90_000, "B")]), 90_000);

        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].end_ms, 90_000);
        assert!(matches!(
            plan.warnings.as_slice(),
            [PlanWarning::SegmentOutOfRange { position: 2, .. }]
        ));
        assert_eq!(plan.out_of_range_count(), 1);
    }

    #[test]
    fn test_end_is_clamped_to_total_duration() {
        let plan = plan_segments(&tracklist(&[(0, "A"), (120_000, "B")]), 90_000);

        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].end_ms, 90_000);
    }

    #[test]
    fn test_duplicate_offsets_skip_without_numbering_gaps() {
        let plan = plan_segments(
            &tracklist(&[(0, "A"), (30_000, "B1"), (30_000, "B2"), (60_000, "C")]),
            90_000,
        );

        let summary: Vec<(usize, &str, u64, u64)> = plan
            .segments
            .iter()
            .map(|s| (s.index, s.label.as_str(), s.start_ms, s.end_ms))
            .collect();
        assert_eq!(
            summary,
            [
                (1, "A", 0, 30_000),
                (2, "B2", 30_000, 60_000),
                (3, "C", 60_000, 90_000),
            ]
        );
        assert!(matches!(
            plan.warnings.as_slice(),
            [PlanWarning::SegmentInvalidDuration {
                position: 2,
                start_ms: 30_000,
                end_ms: 30_000,
                ..
            }]
        ));
    }

    #[test]
    fn test_zero_duration_recording_emits_nothing() {
        let plan = plan_segments(&tracklist(&[(0, "A")]), 0);
        assert!(plan.segments.is_empty());
        assert_eq!(plan.out_of_range_count(), 1);
    }

    #[test]
    fn test_first_track_after_zero_leaves_leading_audio_out() {
        let plan = plan_segments(&tracklist(&[(10_000, "A")]), 20_000);
        assert_eq!(plan.segments[0].start_ms, 10_000);
        assert_eq!(plan.segments[0].duration_ms(), 10_000);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let tl = tracklist(&[(0, "A"), (5_000, "B"), (5_000, "C"), (99_000, "D")]);
        assert_eq!(plan_segments(&tl, 50_000), plan_segments(&tl, 50_000));
    }

    #[test]
    fn test_segment_file_stem() {
        let segment = Segment {
            index: 3,
            label: "Song".to_string(),
            start_ms: 0,
            end_ms: 1,
        };
        assert_eq!(segment.file_stem(), "03 - Song");
    }
}
