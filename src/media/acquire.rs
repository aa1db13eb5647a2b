//! Source acquisition via yt-dlp or from a local file.

use super::process::{Stream, run_tool};
use super::{AcquireRequest, AcquiredAudio, MediaAcquirer};
use crate::constants::acquisition::{AUDIO_EXTENSION, FILE_URL_PREFIX, STALE_EXTENSIONS};
use crate::constants::tools::{PROGRESS_PREFIX, TITLE_PREFIX};
use crate::error::{Error, Result};
use crate::pipeline::CancelToken;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Downloads audio with yt-dlp and converts it to MP3.
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    program: PathBuf,
}

impl YtDlpAcquirer {
    /// Create an acquirer running the given yt-dlp executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn build_command(&self, request: &AcquireRequest) -> Command {
        let mut output_template = request.work_dir.join(&request.stem).into_os_string();
        output_template.push(".%(ext)s");

        let mut command = Command::new(&self.program);
        command
            .args(["--format", "bestaudio/best"])
            .arg("--extract-audio")
            .args(["--audio-format", AUDIO_EXTENSION])
            .arg("--audio-quality")
            .arg(format!("{}K", request.quality.kbps()))
            .arg("--output")
            .arg(output_template)
            .args(["--no-playlist", "--newline", "--no-colors"])
            // --print implies --quiet, which also hides progress
            .arg("--progress")
            .arg("--progress-template")
            .arg(format!("download:{PROGRESS_PREFIX}%(progress._percent_str)s"))
            .arg("--print")
            .arg(format!("video:{TITLE_PREFIX}%(title)s"))
            .arg("--no-simulate")
            .arg("--")
            .arg(&request.source);
        command
    }
}

impl MediaAcquirer for YtDlpAcquirer {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn acquire(
        &self,
        request: &AcquireRequest,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<AcquiredAudio> {
        remove_stale_files(&request.work_dir, &request.stem)?;

        let result = self.download(request, cancel, on_progress);
        if result.is_err() {
            remove_download_leftovers(&request.work_dir, &request.stem);
        }
        result
    }
}

impl YtDlpAcquirer {
    fn download(
        &self,
        request: &AcquireRequest,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<AcquiredAudio> {
        let mut title = None;
        let output = run_tool(self.build_command(request), cancel, |stream, line| {
            if stream == Stream::Stderr {
                return;
            }
            if let Some(percent) = parse_progress_line(line) {
                on_progress(percent);
            } else if let Some(value) = line.strip_prefix(TITLE_PREFIX) {
                title = Some(value.trim().to_string());
            } else {
                debug!(target: "tracksplit::yt_dlp", "{line}");
            }
        })?;

        if !output.status.success() {
            return Err(Error::AcquisitionFailed {
                source_locator: request.source.clone(),
                reason: format!("yt-dlp {}", output.failure_reason()),
            });
        }

        let path = request
            .work_dir
            .join(format!("{}.{AUDIO_EXTENSION}", request.stem));
        let metadata = fs::metadata(&path).map_err(|_| Error::AcquisitionFailed {
            source_locator: request.source.clone(),
            reason: format!("expected audio file was not created: {}", path.display()),
        })?;

        Ok(AcquiredAudio {
            path,
            title,
            size_bytes: metadata.len(),
            owned: true,
        })
    }
}

/// Uses an existing audio file in place. The file is never deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAcquirer;

impl MediaAcquirer for LocalFileAcquirer {
    fn name(&self) -> &'static str {
        "local file"
    }

    fn acquire(
        &self,
        request: &AcquireRequest,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<AcquiredAudio> {
        cancel.check()?;

        let path = local_source_path(&request.source)
            .unwrap_or_else(|| PathBuf::from(&request.source));
        let metadata = fs::metadata(&path).map_err(|e| Error::AcquisitionFailed {
            source_locator: request.source.clone(),
            reason: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(Error::AcquisitionFailed {
                source_locator: request.source.clone(),
                reason: "not a regular file".to_string(),
            });
        }

        on_progress(100.0);

        Ok(AcquiredAudio {
            title: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            size_bytes: metadata.len(),
            path,
            owned: false,
        })
    }
}

/// Interpret `source` as a local file if it is a `file://` URL or an
/// existing path.
pub fn local_source_path(source: &str) -> Option<PathBuf> {
    if let Some(rest) = source.strip_prefix(FILE_URL_PREFIX) {
        return Some(PathBuf::from(rest));
    }
    let path = Path::new(source);
    path.is_file().then(|| path.to_path_buf())
}

/// Pick the acquirer for a source locator.
pub fn acquirer_for(source: &str, yt_dlp: &Path) -> Box<dyn MediaAcquirer> {
    if local_source_path(source).is_some() {
        Box::new(LocalFileAcquirer)
    } else {
        Box::new(YtDlpAcquirer::new(yt_dlp))
    }
}

/// Remove leftovers of an earlier acquisition with the same stem.
fn remove_stale_files(work_dir: &Path, stem: &str) -> Result<()> {
    for ext in STALE_EXTENSIONS {
        let path = work_dir.join(format!("{stem}.{ext}"));
        if path.exists() {
            info!("Removing existing temporary file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Remove every `{stem}.*` file left by a failed or interrupted download.
fn remove_download_leftovers(work_dir: &Path, stem: &str) {
    let prefix = format!("{stem}.");
    let Ok(entries) = fs::read_dir(work_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_leftover = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(&prefix));
        if is_leftover && path.is_file() {
            debug!("Removing incomplete download: {}", path.display());
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove {}: {e}", path.display());
            }
        }
    }
}

/// Parse a `progress:` line into a percentage.
fn parse_progress_line(line: &str) -> Option<f32> {
    let value = line.strip_prefix(PROGRESS_PREFIX)?;
    value
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f32>()
        .ok()
        .map(|p| p.clamp(0.0, 100.0))
}
