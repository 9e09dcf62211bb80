//! Directory walking functionality
//!
//! This module walks a source directory recursively and collects the files
//! matching the glob pattern set.

use std::path::Path;

use colored::Colorize;
use log::{debug, info, trace};
use walkdir::WalkDir;

use crate::errors::{Result, no_files_found_error, symbolic_link_error, traversal_error};
use crate::logging::format_message;

use super::flatten::entry_name;
use super::patterns::PatternSet;
use super::record::FileRecord;

/// Searches a directory for files to pack
///
/// Every regular file below `dir` is tested against `patterns` using its path
/// relative to `dir`. Directories are descended into but never matched.
/// Symbolic links are never followed: one that matches a pattern aborts the
/// search, one that doesn't is ignored. Entries are visited in lexical
/// order, so the result is in a stable discovery order.
///
/// # Arguments
/// * `dir` - The source directory to walk
/// * `patterns` - The glob patterns a file has to match
///
/// # Returns
/// * `Result<Vec<FileRecord>>` - One record per matching file
///
/// # Errors
/// * Returns a traversal error if any directory entry cannot be read
/// * Returns a file operation error for a matching symbolic link
/// * Returns a no-files-found error if nothing matched
/// * Returns an invalid filename error for non-Unicode paths that matched
pub fn search_records(dir: &Path, patterns: &PatternSet) -> Result<Vec<FileRecord>> {
    debug!("Scanning directory: {}", dir.display());

    let mut found = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            traversal_error(e, path)
        })?;

        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or_else(|_| entry.path());

        // Links are never followed; a matching one can't be packed
        if entry.path_is_symlink() && entry.depth() > 0 {
            if patterns.matches(relative) {
                return Err(symbolic_link_error(entry.path().to_path_buf()));
            }
            trace!("Ignoring symbolic link: {}", relative.display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        if !patterns.matches(relative) {
            trace!("Not matched: {}", relative.display());
            continue;
        }

        let name = entry_name(dir, relative)?;
        let message = format!("found file {:?} -> {:?}", relative.display().to_string(), name);
        let colored_message = format!(
            "found file {:?} -> {}",
            relative.display().to_string(),
            format!("{name:?}").bold()
        );
        info!("{}", format_message(&message, &colored_message));

        found.push(FileRecord::new(entry.into_path(), name));
    }

    if found.is_empty() {
        return Err(no_files_found_error(dir.to_path_buf()));
    }

    debug!("Found {} files in {}", found.len(), dir.display());

    Ok(found)
}
