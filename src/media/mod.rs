//! Media collaborators: acquiring source audio and encoding segments.
//!
//! The pipeline only talks to the [`MediaAcquirer`] and [`SegmentEncoder`]
//! traits so tests can substitute in-process fakes for yt-dlp and ffmpeg.

mod acquire;
mod decode;
mod encode;
pub mod process;

pub use acquire::{LocalFileAcquirer, YtDlpAcquirer, acquirer_for, local_source_path};
pub use decode::{PcmFormat, decode_range, probe_duration_ms};
pub use encode::{FfmpegMp3Encoder, WavEncoder, encoder_for};

use crate::config::Quality;
use crate::error::Result;
use crate::pipeline::CancelToken;
use crate::segments::Segment;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What to acquire and where to put it.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// URL or local path of the source recording.
    pub source: String,
    /// Requested MP3 quality.
    pub quality: Quality,
    /// Directory the acquired file is stored in.
    pub work_dir: PathBuf,
    /// File stem of the acquired file.
    pub stem: String,
}

/// Audio file produced by an acquirer.
#[derive(Debug, Clone, Serialize)]
pub struct AcquiredAudio {
    /// Location of the audio file.
    pub path: PathBuf,
    /// Title reported by the source, if any.
    pub title: Option<String>,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Whether the file was created by this run and may be deleted afterwards.
    pub owned: bool,
}

/// Obtains the source recording as a local audio file.
pub trait MediaAcquirer: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Acquire the audio, reporting download progress in percent.
    fn acquire(
        &self,
        request: &AcquireRequest,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<AcquiredAudio>;
}

/// Measures audio and writes one segment to a file.
pub trait SegmentEncoder: Send + Sync {
    /// File extension of produced segments, without the dot.
    fn extension(&self) -> &'static str;

    /// Total duration of `audio` in milliseconds.
    fn probe_duration_ms(&self, audio: &Path) -> Result<u64> {
        probe_duration_ms(audio)
    }

    /// Write `segment` of `audio` to `output`.
    fn encode(
        &self,
        audio: &Path,
        segment: &Segment,
        output: &Path,
        cancel: &CancelToken,
    ) -> Result<()>;
}
