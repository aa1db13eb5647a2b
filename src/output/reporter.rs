//! Progress reporting infrastructure for CLI output.
//!
//! This module provides a trait for progress reporting and the
//! machine-readable implementations (JSON, NDJSON). Human output lives in
//! [`super::human`].

use crate::config::{OutputMode, Quality};
use crate::error::Error;
use crate::media::AcquiredAudio;
use crate::output::json_envelope::{
    AcquisitionStartedPayload, CancelledPayload, CleanupPayload, ErrorPayload, ErrorSeverity,
    EventType, JsonEnvelope, ProgressPayload, ProgressStage, ResultPayload, ResultType,
    SegmentPayload, SegmentsPlannedPayload, TrackInfo, TracklistPayload, WarningPayload,
    WarningStage,
};
use crate::pipeline::SplitSummary;
use crate::segments::{PlanWarning, Segment, SegmentPlan};
use crate::tracklist::{ParseWarning, Tracklist, format_timestamp};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::Instant;

/// Trait for reporting progress during a split run.
///
/// Implementations can output to different formats (human, JSON, NDJSON).
pub trait ProgressReporter: Send + Sync {
    /// Report the parsed tracklist.
    fn tracklist_parsed(&self, tracklist: &Tracklist);

    /// Report a skipped or suspicious tracklist line.
    fn parse_warning(&self, warning: &ParseWarning);

    /// Report acquisition start.
    fn acquisition_started(&self, source: &str, acquirer: &str, quality: Quality);

    /// Report download progress in percent.
    fn acquisition_progress(&self, percent: f32);

    /// Report the acquired audio.
    fn acquisition_completed(&self, audio: &AcquiredAudio);

    /// Report a segment that was dropped during planning.
    fn plan_warning(&self, warning: &PlanWarning);

    /// Report the computed segments.
    fn segments_planned(&self, plan: &SegmentPlan, total_duration_ms: u64);

    /// Report a written segment.
    fn segment_exported(&self, segment: &Segment, path: &Path);

    /// Report a segment that could not be written.
    fn segment_failed(&self, segment: &Segment, error: &Error);

    /// Report what happened to the acquired audio.
    fn original_cleaned_up(&self, path: &Path, kept: bool);

    /// Report a finished split.
    fn completed(&self, summary: &SplitSummary);

    /// Report a finished dry run.
    fn preview_completed(&self, tracklist: &Tracklist);

    /// Report a fatal error.
    fn failed(&self, error: &Error);

    /// Report cancellation.
    fn cancelled(&self, segments_completed: usize);
}

/// Progress throttler to limit update frequency.
pub struct ProgressThrottler {
    /// Last reported percentage (0-100).
    last_percent: AtomicU8,
    /// Last update time.
    last_update: Mutex<Instant>,
    /// Minimum time between updates in milliseconds.
    min_interval_ms: u64,
    /// Minimum percentage change between updates.
    min_percent_change: u8,
}

impl ProgressThrottler {
    /// Create a new throttler with default settings (10%, 500ms).
    pub fn new() -> Self {
        Self {
            last_percent: AtomicU8::new(0),
            last_update: Mutex::new(Instant::now()),
            min_interval_ms: 500,
            min_percent_change: 10,
        }
    }

    /// Check if an update should be emitted.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn should_emit(&self, current_percent: f32) -> bool {
        // Use floor() so 100% only shows when truly complete
        let current = current_percent.floor().clamp(0.0, 100.0) as u8;
        let last = self.last_percent.load(Ordering::Relaxed);

        // Always emit at 0% and 100%
        let boundary = current == 0 || current >= 100;
        let percent_changed = current.saturating_sub(last) >= self.min_percent_change;
        let time_elapsed = self
            .last_update
            .lock()
            .map(|last| last.elapsed().as_millis() >= u128::from(self.min_interval_ms))
            .unwrap_or(true);

        if boundary || percent_changed || time_elapsed {
            self.last_percent.store(current, Ordering::Relaxed);
            if let Ok(mut last_update) = self.last_update.lock() {
                *last_update = Instant::now();
            }
            true
        } else {
            false
        }
    }
}

impl Default for ProgressThrottler {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON/NDJSON progress reporter implementation.
pub struct JsonProgressReporter {
    /// Output mode (Json or Ndjson).
    mode: OutputMode,
    /// Download progress throttler.
    throttler: ProgressThrottler,
    /// Segments in the current plan.
    planned: AtomicUsize,
    /// Segments handled so far (written or failed).
    handled: AtomicUsize,
    /// Writer for output (typically stdout).
    writer: Mutex<Box<dyn Write + Send>>,
    /// Buffer for JSON mode (collect all events).
    json_buffer: Mutex<Vec<String>>,
}

impl JsonProgressReporter {
    /// Create a new JSON progress reporter writing to stdout.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_writer(mode, io::stdout())
    }

    /// Create a reporter with a custom writer.
    pub fn with_writer<W: Write + Send + 'static>(mode: OutputMode, writer: W) -> Self {
        Self {
            mode,
            throttler: ProgressThrottler::new(),
            planned: AtomicUsize::new(0),
            handled: AtomicUsize::new(0),
            writer: Mutex::new(Box::new(writer)),
            json_buffer: Mutex::new(Vec::new()),
        }
    }

    /// Emit an event as JSON.
    fn emit<T: serde::Serialize>(&self, event: EventType, payload: T) {
        let envelope = JsonEnvelope::new(event, payload);
        let Ok(json) = serde_json::to_string(&envelope) else {
            return;
        };

        match self.mode {
            OutputMode::Ndjson => {
                if let Ok(mut writer) = self.writer.lock() {
                    if let Err(e) = writeln!(writer, "{json}") {
                        // Log first error only to avoid spam on broken pipe
                        static STDOUT_ERROR_LOGGED: AtomicBool = AtomicBool::new(false);
                        if !STDOUT_ERROR_LOGGED.swap(true, Ordering::Relaxed) {
                            tracing::warn!(
                                "failed to write to stdout: {e} (subsequent errors suppressed)"
                            );
                        }
                    }
                    let _ = writer.flush();
                }
            }
            OutputMode::Json => {
                if let Ok(mut buffer) = self.json_buffer.lock() {
                    buffer.push(json);
                }
            }
            OutputMode::Human => {}
        }
    }

    /// Flush buffered JSON output (for Json mode).
    pub fn flush(&self) {
        if self.mode == OutputMode::Json
            && let Ok(mut buffer) = self.json_buffer.lock()
            && let Ok(mut writer) = self.writer.lock()
        {
            // Output as JSON array
            let _ = writeln!(writer, "[");
            for (i, json) in buffer.iter().enumerate() {
                if i > 0 {
                    let _ = writeln!(writer, ",");
                }
                let _ = write!(writer, "  {json}");
            }
            let _ = writeln!(writer);
            let _ = writeln!(writer, "]");
            let _ = writer.flush();
            buffer.clear();
        }
    }

    fn export_progress(&self) {
        let handled = self.handled.fetch_add(1, Ordering::Relaxed) + 1;
        let planned = self.planned.load(Ordering::Relaxed).max(1);
        #[allow(clippy::cast_precision_loss)]
        let percent = handled as f32 / planned as f32 * 100.0;
        self.emit(
            EventType::Progress,
            ProgressPayload {
                stage: ProgressStage::Export,
                percent,
            },
        );
    }
}

/// Build the JSON payload describing a tracklist.
pub fn tracklist_payload(tracklist: &Tracklist) -> TracklistPayload {
    TracklistPayload {
        track_count: tracklist.len(),
        tracks: tracklist
            .iter()
            .enumerate()
            .map(|(i, cut)| TrackInfo {
                position: i + 1,
                offset_ms: cut.offset_ms(),
                timestamp: format_timestamp(cut.offset_ms()),
                label: cut.label().to_string(),
            })
            .collect(),
    }
}

fn segment_payload(segment: &Segment) -> SegmentPayload {
    SegmentPayload {
        index: segment.index,
        label: segment.label.clone(),
        start_ms: segment.start_ms,
        end_ms: segment.end_ms,
        path: None,
        error: None,
    }
}

impl ProgressReporter for JsonProgressReporter {
    fn tracklist_parsed(&self, tracklist: &Tracklist) {
        self.emit(EventType::TracklistParsed, tracklist_payload(tracklist));
    }

    fn parse_warning(&self, warning: &ParseWarning) {
        self.emit(
            EventType::Warning,
            WarningPayload {
                stage: WarningStage::Parse,
                message: warning.to_string(),
                detail: warning,
            },
        );
    }

    fn acquisition_started(&self, source: &str, acquirer: &str, quality: Quality) {
        self.emit(
            EventType::AcquisitionStarted,
            AcquisitionStartedPayload {
                source: source.to_string(),
                acquirer: acquirer.to_string(),
                quality_kbps: quality.kbps(),
            },
        );
    }

    fn acquisition_progress(&self, percent: f32) {
        if self.throttler.should_emit(percent) {
            self.emit(
                EventType::Progress,
                ProgressPayload {
                    stage: ProgressStage::Download,
                    percent,
                },
            );
        }
    }

    fn acquisition_completed(&self, audio: &AcquiredAudio) {
        self.emit(EventType::AcquisitionCompleted, audio);
    }

    fn plan_warning(&self, warning: &PlanWarning) {
        self.emit(
            EventType::Warning,
            WarningPayload {
                stage: WarningStage::Plan,
                message: warning.to_string(),
                detail: warning,
            },
        );
    }

    fn segments_planned(&self, plan: &SegmentPlan, total_duration_ms: u64) {
        self.planned.store(plan.segments.len(), Ordering::Relaxed);
        self.handled.store(0, Ordering::Relaxed);
        self.emit(
            EventType::SegmentsPlanned,
            SegmentsPlannedPayload {
                total_duration_ms,
                segment_count: plan.segments.len(),
                out_of_range_count: plan.out_of_range_count(),
            },
        );
    }

    fn segment_exported(&self, segment: &Segment, path: &Path) {
        self.emit(
            EventType::SegmentExported,
            SegmentPayload {
                path: Some(path.to_path_buf()),
                ..segment_payload(segment)
            },
        );
        self.export_progress();
    }

    fn segment_failed(&self, segment: &Segment, error: &Error) {
        self.emit(
            EventType::SegmentFailed,
            SegmentPayload {
                error: Some(ErrorPayload::from_error(error, ErrorSeverity::Warning)),
                ..segment_payload(segment)
            },
        );
        self.export_progress();
    }

    fn original_cleaned_up(&self, path: &Path, kept: bool) {
        self.emit(
            EventType::Cleanup,
            CleanupPayload {
                path: path.to_path_buf(),
                kept,
            },
        );
    }

    fn completed(&self, summary: &SplitSummary) {
        self.emit(
            EventType::Result,
            ResultPayload {
                result_type: ResultType::Split,
                data: summary,
            },
        );
        if let Some(error) = summary.incomplete_error() {
            self.emit(
                EventType::Error,
                ErrorPayload::from_error(&error, ErrorSeverity::Fatal),
            );
        }
        self.flush();
    }

    fn preview_completed(&self, tracklist: &Tracklist) {
        self.emit(
            EventType::Result,
            ResultPayload {
                result_type: ResultType::Preview,
                data: tracklist_payload(tracklist),
            },
        );
        self.flush();
    }

    fn failed(&self, error: &Error) {
        self.emit(
            EventType::Error,
            ErrorPayload::from_error(error, ErrorSeverity::Fatal),
        );
        self.flush();
    }

    fn cancelled(&self, segments_completed: usize) {
        self.emit(EventType::Cancelled, CancelledPayload { segments_completed });
        self.flush();
    }
}

/// Reporter that does nothing.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn tracklist_parsed(&self, _tracklist: &Tracklist) {}
    fn parse_warning(&self, _warning: &ParseWarning) {}
    fn acquisition_started(&self, _source: &str, _acquirer: &str, _quality: Quality) {}
    fn acquisition_progress(&self, _percent: f32) {}
    fn acquisition_completed(&self, _audio: &AcquiredAudio) {}
    fn plan_warning(&self, _warning: &PlanWarning) {}
    fn segments_planned(&self, _plan: &SegmentPlan, _total_duration_ms: u64) {}
    fn segment_exported(&self, _segment: &Segment, _path: &Path) {}
    fn segment_failed(&self, _segment: &Segment, _error: &Error) {}
    fn original_cleaned_up(&self, _path: &Path, _kept: bool) {}
    fn completed(&self, _summary: &SplitSummary) {}
    fn preview_completed(&self, _tracklist: &Tracklist) {}
    fn failed(&self, _error: &Error) {}
    fn cancelled(&self, _segments_completed: usize) {}
}

/// Create the reporter for an output mode.
pub fn create_reporter(mode: OutputMode, show_progress: bool) -> Box<dyn ProgressReporter> {
    match mode {
        OutputMode::Human => Box::new(super::HumanReporter::new(show_progress)),
        OutputMode::Json | OutputMode::Ndjson => Box::new(JsonProgressReporter::new(mode)),
    }
}
