//! JSON envelope types for CLI output.
//!
//! Every structured event is wrapped in the same envelope so consumers can
//! dispatch on `event` without inspecting the payload.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Schema version of the JSON envelope.
pub const SPEC_VERSION: &str = "1.0";

/// JSON envelope wrapping all CLI output events.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// API specification version.
    pub spec_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Tracklist parsed into cut points.
    TracklistParsed,
    /// Non-fatal problem while parsing or planning.
    Warning,
    /// Source acquisition starting.
    AcquisitionStarted,
    /// Periodic progress update.
    Progress,
    /// Source audio available locally.
    AcquisitionCompleted,
    /// Segments computed from the cut points.
    SegmentsPlanned,
    /// One segment written.
    SegmentExported,
    /// One segment could not be written.
    SegmentFailed,
    /// Acquired audio removed or kept.
    Cleanup,
    /// Final result.
    Result,
    /// Error occurred.
    Error,
    /// Operation cancelled.
    Cancelled,
}

/// Result type discriminator for result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Tracks written by a split run.
    Split,
    /// Tracklist shown by a dry run.
    Preview,
}

/// Which stage raised a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningStage {
    /// Tracklist parsing.
    Parse,
    /// Segment planning.
    Plan,
}

/// Payload for `tracklist_parsed` events and preview results.
#[derive(Debug, Clone, Serialize)]
pub struct TracklistPayload {
    /// Number of cut points.
    pub track_count: usize,
    /// Cut points in order.
    pub tracks: Vec<TrackInfo>,
}

/// One cut point in a tracklist payload.
#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    /// 1-based position in the sorted tracklist.
    pub position: usize,
    /// Offset from the start of the recording.
    pub offset_ms: u64,
    /// Offset formatted as `H:MM:SS` or `M:SS`.
    pub timestamp: String,
    /// Sanitized label.
    pub label: String,
}

/// Payload for `warning` events.
#[derive(Debug, Serialize)]
pub struct WarningPayload<'a, W> {
    /// Stage that produced the warning.
    pub stage: WarningStage,
    /// Human-readable message.
    pub message: String,
    /// Structured warning fields.
    #[serde(flatten)]
    pub detail: &'a W,
}

/// Payload for `acquisition_started` events.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionStartedPayload {
    /// URL or path of the source.
    pub source: String,
    /// Acquirer name.
    pub acquirer: String,
    /// Requested quality in kbps.
    pub quality_kbps: u32,
}

/// Payload for `progress` events.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPayload {
    /// Stage the progress belongs to.
    pub stage: ProgressStage,
    /// Progress percentage (0-100).
    pub percent: f32,
}

/// Stage a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    /// Downloading the source.
    Download,
    /// Exporting segments.
    Export,
}

/// Payload for `segments_planned` events.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentsPlannedPayload {
    /// Total audio duration.
    pub total_duration_ms: u64,
    /// Number of segments to export.
    pub segment_count: usize,
    /// Cut points starting at or beyond the end of the audio.
    pub out_of_range_count: usize,
}

/// Payload for `segment_exported` and `segment_failed` events.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentPayload {
    /// Output number of the segment.
    pub index: usize,
    /// Segment label.
    pub label: String,
    /// Start offset.
    pub start_ms: u64,
    /// End offset.
    pub end_ms: u64,
    /// Written file, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Failure details, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Payload for `cleanup` events.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupPayload {
    /// Acquired audio file.
    pub path: PathBuf,
    /// Whether the file was left in place.
    pub kept: bool,
}

/// Payload for `result` events.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPayload<T> {
    /// Result discriminator.
    pub result_type: ResultType,
    /// Result data.
    #[serde(flatten)]
    pub data: T,
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Fatal error - pipeline cannot continue.
    Fatal,
    /// Warning - operation continues but with issues.
    Warning,
}

/// Error payload for error events.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Error code (`snake_case` identifier).
    pub code: String,
    /// Error severity.
    pub severity: ErrorSeverity,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorPayload {
    /// Build a payload from a crate error.
    pub fn from_error(error: &crate::Error, severity: ErrorSeverity) -> Self {
        Self {
            code: error.code().to_string(),
            severity,
            message: error.to_string(),
        }
    }
}

/// Payload for `cancelled` events.
#[derive(Debug, Clone, Serialize)]
pub struct CancelledPayload {
    /// Segments written before cancellation.
    pub segments_completed: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tracklist::ParseWarning;

    #[test]
    fn test_envelope_shape() {
        let envelope = JsonEnvelope::new(
            EventType::Progress,
            ProgressPayload {
                stage: ProgressStage::Download,
                percent: 50.0,
            },
        );
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["spec_version"], SPEC_VERSION);
        assert_eq!(json["event"], "progress");
        assert_eq!(json["payload"]["stage"], "download");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_warning_payload_flattens_detail() {
        let warning = ParseWarning::LineNotRecognized {
            line: 3,
            content: "garbage".to_string(),
        };
        let payload = WarningPayload {
            stage: WarningStage::Parse,
            message: warning.to_string(),
            detail: &warning,
        };
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["stage"], "parse");
        assert_eq!(json["kind"], "line_not_recognized");
        assert_eq!(json["line"], 3);
    }
}
