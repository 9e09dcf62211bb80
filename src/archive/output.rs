//! Output archive file handling
//!
//! The output file is created exclusively: an existing path is refused, a
//! symbolic link at the path is never followed, and on Unix the file is
//! readable and writable by its owner only.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::{Result, file_operation_error};

/// Creates the output archive file
///
/// With `overwrite`, an existing regular file at `path` is removed first.
/// A symbolic link at `path` is refused either way.
///
/// # Errors
/// Returns a file operation error if the path exists (and may not be
/// replaced), is a symbolic link, or cannot be created
pub fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        if metadata.file_type().is_symlink() {
            return Err(file_operation_error(
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "refusing to write through a symbolic link",
                ),
                path.to_path_buf(),
                "create",
            ));
        }
        if overwrite && metadata.is_file() {
            debug!("Replacing existing output: {}", path.display());
            fs::remove_file(path)
                .map_err(|e| file_operation_error(e, path.to_path_buf(), "replace"))?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(crate::constants::OUTPUT_FILE_MODE);
    }

    options
        .open(path)
        .map_err(|e| file_operation_error(e, path.to_path_buf(), "create"))
}

/// Removes a partially written output file unless the run succeeded
///
/// The guard is armed on creation. Calling [`PartialOutputGuard::commit`]
/// disarms it; dropping an armed guard deletes the file.
#[derive(Debug)]
pub struct PartialOutputGuard {
    path: PathBuf,
    armed: bool,
}

impl PartialOutputGuard {
    /// Guards `path`; a guard created with `keep = true` never deletes
    pub fn new(path: &Path, keep: bool) -> Self {
        PartialOutputGuard {
            path: path.to_path_buf(),
            armed: !keep,
        }
    }

    /// Marks the output as complete
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutputGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => warn!("Removed incomplete archive: {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove incomplete archive {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
