//! Packing workflow
//!
//! This module ties discovery, ordering and the archive session together:
//! 1. Create the output file exclusively
//! 2. For every source directory, in order: discover, sort, write
//! 3. Close the archive and flush the output
//!
//! The first error aborts the run. The partial output is removed unless the
//! options ask to keep it.

use std::collections::HashSet;
use std::io::BufWriter;
use std::path::PathBuf;

use log::{debug, info};

use crate::config::PackOptions;
use crate::discovery::FileRecord;
use crate::errors::{Result, directory_error, file_operation_error};

use super::naming::resolve_entry_name;
use super::output::{PartialOutputGuard, create_output};
use super::progress::Progress;
use super::session::{ArchiveSession, SessionSummary, discover_sorted};

/// Planned entries of one source directory
#[derive(Debug, Clone)]
pub struct DirectoryPlan {
    pub dir: PathBuf,
    /// Records in archive order
    pub records: Vec<FileRecord>,
    /// Entry names after collision handling, parallel to `records`
    pub entry_names: Vec<String>,
}

/// Packs every source directory of `options` into the output archive
///
/// # Arguments
/// * `options` - The resolved run options
/// * `progress` - Receives progress notifications
///
/// # Returns
/// * `Result<SessionSummary>` - Counts of what was written
///
/// # Errors
/// Returns the first error met, wrapped with the directory it belongs to
pub fn pack(options: &PackOptions, progress: &dyn Progress) -> Result<SessionSummary> {
    let file = create_output(&options.output, options.overwrite)?;
    let guard = PartialOutputGuard::new(&options.output, options.keep_partial);
    debug!("Created output archive: {}", options.output.display());

    let mut session = ArchiveSession::new(BufWriter::new(file), options.collision, progress);
    for dir in &options.dirs {
        let summary = session.add_directory(dir, &options.patterns)?;
        debug!(
            "Directory {} done: {} entries, {} bytes",
            summary.path.display(),
            summary.entries,
            summary.bytes
        );
    }

    let (output, summary) = session.close()?;
    let file = output
        .into_inner()
        .map_err(|e| file_operation_error(e.into_error(), options.output.clone(), "flush"))?;
    file.sync_all()
        .map_err(|e| file_operation_error(e, options.output.clone(), "sync"))?;
    drop(file);

    guard.commit();
    info!(
        "Wrote {} entries ({} bytes) from {} directories to {}",
        summary.entries,
        summary.bytes,
        summary.directories,
        options.output.display()
    );

    Ok(summary)
}

/// Works out the archive layout without writing anything
///
/// Discovery, ordering and collision handling run exactly as in [`pack`].
///
/// # Errors
/// Returns the first discovery or collision error, wrapped with the
/// directory it belongs to
pub fn plan(options: &PackOptions) -> Result<Vec<DirectoryPlan>> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut plans = Vec::with_capacity(options.dirs.len());

    for dir in &options.dirs {
        let records = discover_sorted(dir, &options.patterns)
            .map_err(|e| directory_error(e, dir.clone()))?;

        let mut entry_names = Vec::with_capacity(records.len());
        for record in &records {
            let name = resolve_entry_name(record, options.collision, |candidate| {
                taken.contains(candidate)
            })
            .map_err(|e| directory_error(e, dir.clone()))?;
            taken.insert(name.clone());
            entry_names.push(name);
        }

        plans.push(DirectoryPlan {
            dir: dir.clone(),
            records,
            entry_names,
        });
    }

    Ok(plans)
}
