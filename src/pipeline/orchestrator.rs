//! Split run orchestration.
//!
//! Order of a run: parse tracklist, acquire audio, measure duration, plan
//! segments, export each segment, clean up the acquired audio. The
//! tracklist is validated before anything is downloaded.

use crate::config::Quality;
use crate::error::{Error, Result};
use crate::media::{AcquireRequest, AcquiredAudio, MediaAcquirer, SegmentEncoder};
use crate::output::ProgressReporter;
use crate::pipeline::{CancelToken, PartialOutput};
use crate::segments::{Segment, plan_segments};
use crate::tracklist::{ParsedTracklist, Tracklist, parse_tracklist_file};
use serde::Serialize;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything needed for one split run.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    /// URL or local path of the source recording.
    pub source: String,
    /// Tracklist file.
    pub tracklist: PathBuf,
    /// Directory exported tracks are written to.
    pub output_dir: PathBuf,
    /// Directory the acquired audio is stored in.
    pub work_dir: PathBuf,
    /// File stem of the acquired audio.
    pub temp_stem: String,
    /// MP3 quality tier.
    pub quality: Quality,
    /// Keep the acquired audio after splitting.
    pub keep_original: bool,
}

/// One written track.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedSegment {
    /// Output number.
    pub index: usize,
    /// Track label.
    pub label: String,
    /// Start offset.
    pub start_ms: u64,
    /// End offset.
    pub end_ms: u64,
    /// Written file.
    pub path: PathBuf,
}

/// Outcome of a split run.
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    /// Source locator.
    pub source: String,
    /// Title reported by the source.
    pub title: Option<String>,
    /// Total audio duration.
    pub total_duration_ms: u64,
    /// Cut points in the tracklist.
    pub tracks_parsed: usize,
    /// Segments planned for export.
    pub segments_planned: usize,
    /// Segments written.
    pub segments_written: usize,
    /// Segments that failed to encode.
    pub segments_failed: usize,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Written tracks in order.
    pub outputs: Vec<ExportedSegment>,
    /// Acquired audio left on disk, if any.
    pub original: Option<PathBuf>,
}

impl SplitSummary {
    /// Whether every planned segment was written.
    pub fn is_complete(&self) -> bool {
        self.segments_failed == 0
    }

    /// Error describing the failed segments, if any.
    pub fn incomplete_error(&self) -> Option<Error> {
        (!self.is_complete()).then(|| Error::ExportIncomplete {
            failed: self.segments_failed,
            planned: self.segments_planned,
        })
    }
}

/// Drives a split run over injected collaborators.
pub struct Pipeline<'a> {
    acquirer: &'a dyn MediaAcquirer,
    encoder: &'a dyn SegmentEncoder,
    reporter: &'a dyn ProgressReporter,
    cancel: CancelToken,
    written: Cell<usize>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline.
    pub fn new(
        acquirer: &'a dyn MediaAcquirer,
        encoder: &'a dyn SegmentEncoder,
        reporter: &'a dyn ProgressReporter,
        cancel: CancelToken,
    ) -> Self {
        Self {
            acquirer,
            encoder,
            reporter,
            cancel,
            written: Cell::new(0),
        }
    }

    /// Parse and report a tracklist without acquiring anything.
    pub fn preview(&self, tracklist: &Path) -> Result<ParsedTracklist> {
        let parsed = self.report_failure(self.load_tracklist(tracklist))?;
        self.reporter.preview_completed(&parsed.tracklist);
        Ok(parsed)
    }

    /// Run a complete split.
    ///
    /// The acquired audio is removed afterwards (unless kept or not owned),
    /// whether or not the export succeeded. Output files are only visible
    /// once fully written.
    pub fn run(&self, request: &SplitRequest) -> Result<SplitSummary> {
        self.written.set(0);
        let summary = self.report_failure(self.run_stages(request))?;
        self.reporter.completed(&summary);
        Ok(summary)
    }

    fn report_failure<T>(&self, result: Result<T>) -> Result<T> {
        match &result {
            Err(Error::Interrupted) => self.reporter.cancelled(self.written.get()),
            Err(e) => self.reporter.failed(e),
            Ok(_) => {}
        }
        result
    }

    fn run_stages(&self, request: &SplitRequest) -> Result<SplitSummary> {
        let parsed = self.load_tracklist(&request.tracklist)?;
        self.cancel.check()?;

        self.reporter
            .acquisition_started(&request.source, self.acquirer.name(), request.quality);
        let acquire_request = AcquireRequest {
            source: request.source.clone(),
            quality: request.quality,
            work_dir: request.work_dir.clone(),
            stem: request.temp_stem.clone(),
        };
        let audio = self.acquirer.acquire(&acquire_request, &self.cancel, &mut |percent| {
            self.reporter.acquisition_progress(percent);
        })?;
        self.reporter.acquisition_completed(&audio);

        let result = self.export(&parsed.tracklist, &audio, request);
        let original = self.cleanup(&audio, request.keep_original);

        Ok(SplitSummary {
            original,
            ..result?
        })
    }

    fn load_tracklist(&self, path: &Path) -> Result<ParsedTracklist> {
        let parsed = parse_tracklist_file(path)?;
        self.reporter.tracklist_parsed(&parsed.tracklist);
        for warning in &parsed.warnings {
            self.reporter.parse_warning(warning);
        }
        Ok(parsed)
    }

    fn export(
        &self,
        tracklist: &Tracklist,
        audio: &AcquiredAudio,
        request: &SplitRequest,
    ) -> Result<SplitSummary> {
        self.cancel.check()?;

        let total_duration_ms = self.encoder.probe_duration_ms(&audio.path)?;
        let plan = plan_segments(tracklist, total_duration_ms);
        for warning in &plan.warnings {
            self.reporter.plan_warning(warning);
        }
        self.reporter.segments_planned(&plan, total_duration_ms);

        fs::create_dir_all(&request.output_dir).map_err(|e| Error::OutputDirCreateFailed {
            path: request.output_dir.clone(),
            source: e,
        })?;

        let mut outputs = Vec::with_capacity(plan.segments.len());
        let mut segments_failed = 0;

        for segment in &plan.segments {
            self.cancel.check()?;

            let final_path = request.output_dir.join(format!(
                "{}.{}",
                segment.file_stem(),
                self.encoder.extension()
            ));

            match self.export_segment(&audio.path, segment, &final_path) {
                Ok(path) => {
                    self.reporter.segment_exported(segment, &path);
                    self.written.set(self.written.get() + 1);
                    outputs.push(ExportedSegment {
                        index: segment.index,
                        label: segment.label.clone(),
                        start_ms: segment.start_ms,
                        end_ms: segment.end_ms,
                        path,
                    });
                }
                Err(Error::Interrupted) => return Err(Error::Interrupted),
                Err(e) => {
                    self.reporter.segment_failed(segment, &e);
                    segments_failed += 1;
                }
            }
        }

        Ok(SplitSummary {
            source: request.source.clone(),
            title: audio.title.clone(),
            total_duration_ms,
            tracks_parsed: tracklist.len(),
            segments_planned: plan.segments.len(),
            segments_written: outputs.len(),
            segments_failed,
            output_dir: request.output_dir.clone(),
            outputs,
            original: None,
        })
    }

    fn export_segment(&self, audio: &Path, segment: &Segment, final_path: &Path) -> Result<PathBuf> {
        let partial = PartialOutput::begin(final_path)?;
        debug!(
            "Encoding track {} [{}ms, {}ms) to {}",
            segment.index,
            segment.start_ms,
            segment.end_ms,
            partial.path().display()
        );
        self.encoder
            .encode(audio, segment, partial.path(), &self.cancel)?;
        partial.commit()
    }

    /// Remove the acquired audio unless it is kept or not ours.
    fn cleanup(&self, audio: &AcquiredAudio, keep_original: bool) -> Option<PathBuf> {
        if keep_original || !audio.owned {
            self.reporter.original_cleaned_up(&audio.path, true);
            return Some(audio.path.clone());
        }

        match fs::remove_file(&audio.path) {
            Ok(()) => {
                self.reporter.original_cleaned_up(&audio.path, false);
                None
            }
            Err(e) => {
                warn!(
                    "Failed to remove temporary file {}: {e}",
                    audio.path.display()
                );
                Some(audio.path.clone())
            }
        }
    }
}
