//! Error types for tracksplit.

use crate::constants::{FAILURE_EXIT_CODE, INTERRUPTED_EXIT_CODE};

/// Result type alias for tracksplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for tracksplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    // Tracklist errors
    /// Tracklist file does not exist.
    #[error("tracklist file not found: {path}")]
    TracklistNotFound {
        /// Path to the missing tracklist.
        path: std::path::PathBuf,
    },

    /// Tracklist file could not be read.
    #[error("failed to read tracklist file '{path}'")]
    TracklistRead {
        /// Path to the tracklist.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A timestamp token did not match `H:MM:SS` or `MM:SS`.
    #[error("invalid timestamp format: '{value}'")]
    InvalidTimestamp {
        /// The offending token.
        value: String,
    },

    /// The tracklist contained no usable entries.
    #[error("no valid tracks found in the tracklist")]
    NoTracksFound,

    // Media errors
    /// An external tool could not be started.
    #[error("failed to run '{tool}' (is it installed and on PATH?)")]
    ToolNotFound {
        /// Tool name or path.
        tool: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Source audio could not be acquired.
    #[error("failed to acquire audio from '{source_locator}': {reason}")]
    AcquisitionFailed {
        /// URL or path the audio was requested from.
        source_locator: String,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Total duration of the audio could not be determined.
    #[error("could not determine the duration of '{path}'")]
    DurationUnknown {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Encoding a segment failed.
    #[error("failed to encode '{path}': {reason}")]
    EncodeFailed {
        /// Output path of the segment.
        path: std::path::PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Some segments could not be exported.
    #[error("{failed} of {planned} tracks could not be exported")]
    ExportIncomplete {
        /// Number of segments that failed.
        failed: usize,
        /// Number of segments planned.
        planned: usize,
    },

    /// The run was interrupted by the user.
    #[error("process interrupted by user")]
    Interrupted,

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Stable `snake_case` identifier used in structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::ConfigDirNotFound => "config_dir_not_found",
            Self::ConfigRead { .. } => "config_read",
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::ConfigWrite { .. } => "config_write",
            Self::ConfigSerialize { .. } => "config_serialize",
            Self::TracklistNotFound { .. } => "tracklist_not_found",
            Self::TracklistRead { .. } => "tracklist_read",
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::NoTracksFound => "no_tracks_found",
            Self::ToolNotFound { .. } => "tool_not_found",
            Self::AcquisitionFailed { .. } => "acquisition_failed",
            Self::AudioOpen { .. } => "audio_open",
            Self::AudioDecode { .. } => "audio_decode",
            Self::NoAudioTracks { .. } => "no_audio_tracks",
            Self::DurationUnknown { .. } => "duration_unknown",
            Self::EncodeFailed { .. } => "encode_failed",
            Self::WavWriteFailed { .. } => "wav_write_failed",
            Self::OutputDirCreateFailed { .. } => "output_dir_create_failed",
            Self::ExportIncomplete { .. } => "export_incomplete",
            Self::Interrupted => "interrupted",
            Self::Internal { .. } => "internal",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if matches!(self, Self::Interrupted) {
            INTERRUPTED_EXIT_CODE
        } else {
            FAILURE_EXIT_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_has_distinct_exit_code() {
        assert_eq!(Error::Interrupted.exit_code(), 130);
        assert_eq!(Error::NoTracksFound.exit_code(), 1);
    }

    #[test]
    fn test_error_codes_are_snake_case() {
        let err = Error::TracklistNotFound {
            path: "tracks.txt".into(),
        };
        assert_eq!(err.code(), "tracklist_not_found");
        assert_eq!(Error::Interrupted.code(), "interrupted");
    }
}
