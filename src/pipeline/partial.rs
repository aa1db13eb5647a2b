//! Partial output files that only become visible once complete.

use crate::constants::export::PARTIAL_SUFFIX;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

/// RAII guard for an output file being written.
///
/// Data goes to `<final>.part`; [`PartialOutput::commit`] renames it into
/// place. Dropping an uncommitted guard removes the partial file.
#[derive(Debug)]
pub struct PartialOutput {
    partial_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl PartialOutput {
    /// Start writing `final_path`.
    ///
    /// A leftover partial file from an earlier run is removed.
    pub fn begin(final_path: &Path) -> Result<Self> {
        let partial_path = Self::partial_path_for(final_path);

        if partial_path.exists() {
            fs::remove_file(&partial_path)?;
        }

        // Register for cleanup on signal
        register_partial(&partial_path);

        Ok(Self {
            partial_path,
            final_path: final_path.to_path_buf(),
            committed: false,
        })
    }

    /// Get the partial file path for an output file.
    pub fn partial_path_for(final_path: &Path) -> PathBuf {
        let mut name = final_path.as_os_str().to_os_string();
        name.push(PARTIAL_SUFFIX);
        PathBuf::from(name)
    }

    /// Path the encoder should write to.
    pub fn path(&self) -> &Path {
        &self.partial_path
    }

    /// Path the file will have after commit.
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Move the finished file into place.
    pub fn commit(mut self) -> Result<PathBuf> {
        fs::rename(&self.partial_path, &self.final_path)?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.partial_path);
        }
        unregister_partial(&self.partial_path);
    }
}

/// Global registry of partial files for cleanup on forced exit.
static ACTIVE_PARTIALS: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

fn register_partial(path: &Path) {
    if let Ok(mut partials) = ACTIVE_PARTIALS.lock() {
        partials.push(path.to_path_buf());
    }
}

fn unregister_partial(path: &Path) {
    if let Ok(mut partials) = ACTIVE_PARTIALS.lock() {
        partials.retain(|p| p != path);
    }
}

/// Remove every registered partial file. Called on forced exit.
pub fn cleanup_all_partials() {
    if let Ok(partials) = ACTIVE_PARTIALS.lock() {
        for path in partials.iter() {
            let _ = fs::remove_file(path);
        }
    }
}
