//! Human-readable reporting through tracing and indicatif.

use super::progress::{
    create_download_progress, create_export_progress, finish_progress, inc_progress,
};
use super::reporter::ProgressReporter;
use crate::config::Quality;
use crate::error::Error;
use crate::media::AcquiredAudio;
use crate::pipeline::SplitSummary;
use crate::segments::{PlanWarning, Segment, SegmentPlan};
use crate::tracklist::{ParseWarning, Tracklist, format_timestamp};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reporter for terminal users.
pub struct HumanReporter {
    show_progress: bool,
    download: Mutex<Option<ProgressBar>>,
    export: Mutex<Option<ProgressBar>>,
}

impl HumanReporter {
    /// Create a reporter; bars are drawn only if `show_progress` is set.
    pub fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            download: Mutex::new(None),
            export: Mutex::new(None),
        }
    }

    fn take_bar(slot: &Mutex<Option<ProgressBar>>) -> Option<ProgressBar> {
        slot.lock().ok().and_then(|mut bar| bar.take())
    }

    fn log_segment_line(&self, line: &str) {
        match self.export.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(pb) => pb.suspend(|| info!("{line}")),
            None => info!("{line}"),
        }
    }
}

impl ProgressReporter for HumanReporter {
    fn tracklist_parsed(&self, tracklist: &Tracklist) {
        info!("Found {} tracks:", tracklist.len());
        for cut in tracklist {
            info!("  {} - {}", format_timestamp(cut.offset_ms()), cut.label());
        }
    }

    fn parse_warning(&self, warning: &ParseWarning) {
        warn!("{warning}");
    }

    fn acquisition_started(&self, source: &str, acquirer: &str, quality: Quality) {
        info!("Acquiring audio from {source} via {acquirer} (MP3 {quality} kbps)");
        if let Ok(mut slot) = self.download.lock() {
            *slot = create_download_progress(self.show_progress);
        }
    }

    fn acquisition_progress(&self, percent: f32) {
        if let Ok(slot) = self.download.lock()
            && let Some(pb) = slot.as_ref()
        {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let position = percent.clamp(0.0, 100.0) as u64;
            pb.set_position(position);
        }
    }

    fn acquisition_completed(&self, audio: &AcquiredAudio) {
        if let Some(pb) = Self::take_bar(&self.download) {
            pb.finish_and_clear();
        }

        #[allow(clippy::cast_precision_loss)]
        let size_mb = audio.size_bytes as f64 / BYTES_PER_MB;
        info!("Audio ready: {} ({size_mb:.2} MB)", audio.path.display());
        if let Some(title) = &audio.title {
            info!("Title: {title}");
        }
    }

    fn plan_warning(&self, warning: &PlanWarning) {
        warn!("{warning}");
    }

    fn segments_planned(&self, plan: &SegmentPlan, total_duration_ms: u64) {
        info!("Total duration: {}", format_timestamp(total_duration_ms));

        let out_of_range = plan.out_of_range_count();
        if out_of_range > 0 {
            warn!(
                "{out_of_range} tracklist entries start at or after the end of the audio ({}); check the tracklist against the source",
                format_timestamp(total_duration_ms)
            );
        }

        info!("Splitting into {} tracks...", plan.segments.len());
        if let Ok(mut slot) = self.export.lock() {
            *slot = create_export_progress(plan.segments.len(), self.show_progress);
        }
    }

    fn segment_exported(&self, segment: &Segment, path: &Path) {
        self.log_segment_line(&format!("Saved track {}: {}", segment.index, path.display()));
        if let Ok(slot) = self.export.lock() {
            inc_progress(slot.as_ref());
        }
    }

    fn segment_failed(&self, segment: &Segment, error: &Error) {
        match self.export.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(pb) => {
                pb.suspend(|| warn!("Error processing track {}: {error}", segment.index));
                pb.inc(1);
            }
            None => warn!("Error processing track {}: {error}", segment.index),
        }
    }

    fn original_cleaned_up(&self, path: &Path, kept: bool) {
        if kept {
            info!("Original audio kept: {}", path.display());
        } else {
            info!("Removed temporary file: {}", path.display());
        }
    }

    fn completed(&self, summary: &SplitSummary) {
        finish_progress(Self::take_bar(&self.export), "done");
        info!(
            "Completed: {}/{} tracks saved to {}",
            summary.segments_written,
            summary.segments_planned,
            summary.output_dir.display()
        );
    }

    fn preview_completed(&self, tracklist: &Tracklist) {
        info!("Dry run: {} tracks would be created", tracklist.len());
    }

    fn failed(&self, _error: &Error) {
        if let Some(pb) = Self::take_bar(&self.download) {
            pb.abandon();
        }
        if let Some(pb) = Self::take_bar(&self.export) {
            pb.abandon();
        }
    }

    fn cancelled(&self, segments_completed: usize) {
        self.failed(&Error::Interrupted);
        warn!("Process interrupted by user after {segments_completed} tracks");
    }
}
