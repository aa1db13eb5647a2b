//! CLI argument definitions.

use super::validators::parse_source;
use crate::config::{OutputFormat, OutputMode, Quality};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Split a long recording into tracks using a timestamped tracklist.
#[derive(Debug, Parser)]
#[command(name = "tracksplit")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Source recording: a URL understood by yt-dlp or a local audio file.
    #[arg(required = true, value_parser = parse_source)]
    pub source: Option<String>,

    /// Tracklist file with one `<timestamp> - <title>` entry per line.
    #[arg(required = true)]
    pub tracklist: Option<PathBuf>,

    /// Options for splitting.
    #[command(flatten)]
    pub split: SplitArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for a split run.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct SplitArgs {
    /// Directory for the exported tracks [default: output].
    #[arg(short, long, env = "TRACKSPLIT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Keep the downloaded audio after splitting.
    #[arg(short, long)]
    pub keep_original: bool,

    /// MP3 quality in kbps [default: 320].
    #[arg(short, long, value_enum, env = "TRACKSPLIT_QUALITY")]
    pub quality: Option<Quality>,

    /// Output audio format [default: mp3].
    #[arg(long, value_enum, env = "TRACKSPLIT_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Parse and list the tracklist without downloading or splitting.
    #[arg(long)]
    pub dry_run: bool,

    /// Output mode for progress and results.
    #[arg(long, value_enum, default_value_t = OutputMode::Human, env = "TRACKSPLIT_OUTPUT_MODE")]
    pub output_mode: OutputMode,

    /// Increase verbosity (-v: debug, -vv: trace including tool output).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,

    /// Disable progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// yt-dlp executable (overrides config).
    #[arg(long, env = "TRACKSPLIT_YT_DLP")]
    pub yt_dlp: Option<PathBuf>,

    /// ffmpeg executable (overrides config).
    #[arg(long, env = "TRACKSPLIT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,
}
