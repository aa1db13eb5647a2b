//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "tracksplit";

/// Default output directory for exported tracks.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default file stem for the acquired source audio.
pub const DEFAULT_TEMP_STEM: &str = "audio_temp";

/// Exit code used when the run is interrupted (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit code used for every other fatal error.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Tracklist format constants.
pub mod tracklist {
    /// Lines starting with this character are comments.
    pub const COMMENT_MARKER: char = '#';

    /// Placeholder used when a label sanitizes to nothing.
    pub const UNTITLED_LABEL: &str = "Untitled";

    /// Characters that are stripped from labels.
    pub const INVALID_LABEL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    /// Characters trimmed from both ends of a label.
    pub const TRIMMED_LABEL_CHARS: &[char] = &['.', ' '];

    /// UTF-8 byte order mark, stripped from the start of tracklist files.
    pub const UTF8_BOM: char = '\u{FEFF}';
}

/// Time conversion constants.
pub mod time {
    /// Milliseconds per second.
    pub const MS_PER_SECOND: u64 = 1000;
    /// Seconds per minute.
    pub const SECONDS_PER_MINUTE: u64 = 60;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: u64 = 3600;
}

/// External tool defaults.
pub mod tools {
    /// Default yt-dlp executable.
    pub const YT_DLP: &str = "yt-dlp";

    /// Default ffmpeg executable.
    pub const FFMPEG: &str = "ffmpeg";

    /// Interval between cancellation checks while a child process runs.
    pub const POLL_INTERVAL_MS: u64 = 100;

    /// Number of stderr lines kept for error messages.
    pub const STDERR_TAIL_LINES: usize = 8;

    /// Prefix of yt-dlp progress lines produced by our progress template.
    pub const PROGRESS_PREFIX: &str = "progress:";

    /// Prefix of the yt-dlp line carrying the video title.
    pub const TITLE_PREFIX: &str = "title:";
}

/// Acquisition constants.
pub mod acquisition {
    /// Extensions of stale acquisition files removed before a download.
    pub const STALE_EXTENSIONS: &[&str] = &["mp3", "webm", "m4a"];

    /// Extension of the acquired audio file.
    pub const AUDIO_EXTENSION: &str = "mp3";

    /// URL scheme accepted for local sources.
    pub const FILE_URL_PREFIX: &str = "file://";
}

/// Export constants.
pub mod export {
    /// Suffix appended to a segment file while it is being written.
    pub const PARTIAL_SUFFIX: &str = ".part";

    /// Bits per sample for WAV output.
    pub const WAV_BITS_PER_SAMPLE: u16 = 16;
}
