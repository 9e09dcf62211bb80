use std::path::PathBuf;

use crate::archive::CollisionPolicy;
use crate::discovery::PatternSet;

/// Fully resolved options for one packing run
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Source directories, packed in this order
    pub dirs: Vec<PathBuf>,
    /// Glob patterns a file must match
    pub patterns: PatternSet,
    /// Output archive path
    pub output: PathBuf,
    /// Replace an existing regular file at the output path
    pub overwrite: bool,
    /// Keep a partially written archive after a failure
    pub keep_partial: bool,
    /// What to do with entry name collisions
    pub collision: CollisionPolicy,
    /// Only print the planned entries
    pub dry_run: bool,
    /// Draw progress bars
    pub show_progress: bool,
}

impl PackOptions {
    /// Options with the default pattern set and default behaviour
    pub fn new(dirs: Vec<PathBuf>, output: PathBuf) -> Self {
        PackOptions {
            dirs,
            patterns: PatternSet::new(),
            output,
            overwrite: false,
            keep_partial: false,
            collision: CollisionPolicy::default(),
            dry_run: false,
            show_progress: true,
        }
    }
}
