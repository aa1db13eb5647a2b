//! Tracksplit - split long recordings into tracks using a timestamped tracklist.
//!
//! The core ([`tracklist`] and [`segments`]) is pure: it turns tracklist text
//! into cut points and cut points into segments. [`pipeline`] drives the
//! side effects through the [`media`] collaborators.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod segments;
pub mod tracklist;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, SplitArgs};
use config::{
    Config, OutputMode, config_file_path, load_default_config, save_default_config,
    validate_config,
};
use constants::INTERRUPTED_EXIT_CODE;
use output::create_reporter;
use pipeline::{CancelToken, Pipeline, SplitRequest, cleanup_all_partials};
use std::path::PathBuf;
use tracing::warn;

pub use error::{Error, Result};

/// Main entry point for the tracksplit CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.split.verbose, cli.split.quiet, cli.split.output_mode);

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    let (Some(source), Some(tracklist)) = (cli.source, cli.tracklist) else {
        return Err(Error::Internal {
            message: "source and tracklist are required".to_string(),
        });
    };

    let config = load_default_config()?;
    validate_config(&config)?;

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    split(source, tracklist, &cli.split, &config, cancel)
}

/// Split one recording with settings merged from CLI and config.
fn split(
    source: String,
    tracklist: PathBuf,
    args: &SplitArgs,
    config: &Config,
    cancel: CancelToken,
) -> Result<()> {
    let quality = args.quality.unwrap_or(config.defaults.quality);
    let format = args.format.unwrap_or(config.defaults.format);
    let yt_dlp = args.yt_dlp.as_ref().unwrap_or(&config.tools.yt_dlp);
    let ffmpeg = args.ffmpeg.as_ref().unwrap_or(&config.tools.ffmpeg);

    let show_progress = !args.quiet && !args.no_progress;
    let reporter = create_reporter(args.output_mode, show_progress);
    let acquirer = media::acquirer_for(&source, yt_dlp);
    let encoder = media::encoder_for(format, ffmpeg, quality);

    let pipeline = Pipeline::new(
        acquirer.as_ref(),
        encoder.as_ref(),
        reporter.as_ref(),
        cancel,
    );

    if args.dry_run {
        pipeline.preview(&tracklist)?;
        return Ok(());
    }

    let request = SplitRequest {
        source,
        tracklist,
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.defaults.output_dir.clone()),
        work_dir: config.acquisition.work_dir.clone(),
        temp_stem: config.acquisition.temp_stem.clone(),
        quality,
        keep_original: args.keep_original || config.defaults.keep_original,
    };

    let summary = pipeline.run(&request)?;
    summary.incomplete_error().map_or(Ok(()), Err)
}

/// First Ctrl+C requests a graceful stop; a second one removes partial
/// outputs and exits immediately.
fn install_interrupt_handler(cancel: &CancelToken) {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if token.is_cancelled() {
            cleanup_all_partials();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        token.cancel();
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
}

/// Initialize tracing.
///
/// Structured output modes own stdout, so logs go to stderr there.
fn init_logging(verbose: u8, quiet: bool, mode: OutputMode) {
    use tracing_subscriber::{EnvFilter, fmt};

    // symphonia logs probe chatter through `log`; keep it quiet by default
    let filter_str = if quiet {
        "warn,symphonia=off"
    } else {
        match verbose {
            0 => "info,symphonia=warn",
            1 => "debug,symphonia=info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    if mode.is_structured() {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let contents = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{contents}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
