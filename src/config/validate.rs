//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_tools(config)?;
    validate_acquisition(config)?;
    Ok(())
}

fn validate_tools(config: &Config) -> Result<()> {
    if config.tools.yt_dlp.as_os_str().is_empty() {
        return Err(Error::ConfigValidation {
            message: "tools.yt_dlp must not be empty".to_string(),
        });
    }

    if config.tools.ffmpeg.as_os_str().is_empty() {
        return Err(Error::ConfigValidation {
            message: "tools.ffmpeg must not be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_acquisition(config: &Config) -> Result<()> {
    let stem = &config.acquisition.temp_stem;

    if stem.is_empty() {
        return Err(Error::ConfigValidation {
            message: "acquisition.temp_stem must not be empty".to_string(),
        });
    }

    // The stem is joined onto work_dir; it must stay a single file name
    if stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        return Err(Error::ConfigValidation {
            message: format!("acquisition.temp_stem must be a plain file name, got '{stem}'"),
        });
    }

    Ok(())
}
