//! Configuration type definitions.

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_TEMP_STEM, tools};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default split settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Acquisition settings.
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

/// Default split settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Directory exported tracks are written to.
    pub output_dir: PathBuf,

    /// MP3 quality tier for acquisition and export.
    pub quality: Quality,

    /// Output audio format.
    pub format: OutputFormat,

    /// Keep the acquired audio after splitting.
    pub keep_original: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            quality: Quality::default(),
            format: OutputFormat::default(),
            keep_original: false,
        }
    }
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// yt-dlp executable (name on PATH or full path).
    pub yt_dlp: PathBuf,

    /// ffmpeg executable (name on PATH or full path).
    pub ffmpeg: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: PathBuf::from(tools::YT_DLP),
            ffmpeg: PathBuf::from(tools::FFMPEG),
        }
    }
}

/// Acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Directory the acquired audio is stored in.
    pub work_dir: PathBuf,

    /// File stem of the acquired audio (extension is added by the acquirer).
    pub temp_stem: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            temp_stem: DEFAULT_TEMP_STEM.to_string(),
        }
    }
}

/// MP3 quality tier in kbps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum Quality {
    /// 128 kbps.
    #[value(name = "128")]
    Kbps128,
    /// 192 kbps.
    #[value(name = "192")]
    Kbps192,
    /// 256 kbps.
    #[value(name = "256")]
    Kbps256,
    /// 320 kbps.
    #[default]
    #[value(name = "320")]
    Kbps320,
}

impl Quality {
    /// Bitrate in kbps.
    pub fn kbps(self) -> u32 {
        match self {
            Self::Kbps128 => 128,
            Self::Kbps192 => 192,
            Self::Kbps256 => 256,
            Self::Kbps320 => 320,
        }
    }

    /// Bitrate argument in ffmpeg notation, e.g. `320k`.
    pub fn bitrate_arg(self) -> String {
        format!("{}k", self.kbps())
    }
}

impl TryFrom<u32> for Quality {
    type Error = String;

    fn try_from(kbps: u32) -> Result<Self, Self::Error> {
        match kbps {
            128 => Ok(Self::Kbps128),
            192 => Ok(Self::Kbps192),
            256 => Ok(Self::Kbps256),
            320 => Ok(Self::Kbps320),
            other => Err(format!(
                "unsupported quality: {other} (expected 128, 192, 256 or 320)"
            )),
        }
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.kbps()
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kbps())
    }
}

/// Output audio format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MP3 encoded with ffmpeg.
    #[default]
    Mp3,
    /// 16-bit PCM WAV written natively.
    Wav,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mp3 => write!(f, "mp3"),
            Self::Wav => write!(f, "wav"),
        }
    }
}

/// How progress and results are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Log lines and progress bars.
    #[default]
    Human,
    /// One JSON array written at the end of the run.
    Json,
    /// One JSON object per line as events happen.
    Ndjson,
}

impl OutputMode {
    /// Whether the mode produces machine-readable output on stdout.
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::Ndjson)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_kbps() {
        assert_eq!(Quality::try_from(192).unwrap(), Quality::Kbps192);
        assert!(Quality::try_from(160).is_err());
    }

    #[test]
    fn test_quality_bitrate_arg() {
        assert_eq!(Quality::default().bitrate_arg(), "320k");
        assert_eq!(Quality::Kbps128.to_string(), "128");
    }

    #[test]
    fn test_defaults_config_default_values() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.output_dir, PathBuf::from("output"));
        assert_eq!(defaults.quality, Quality::Kbps320);
        assert_eq!(defaults.format, OutputFormat::Mp3);
        assert!(!defaults.keep_original);
    }

    #[test]
    fn test_output_mode_is_structured() {
        assert!(!OutputMode::Human.is_structured());
        assert!(OutputMode::Json.is_structured());
        assert!(OutputMode::Ndjson.is_structured());
    }
}
