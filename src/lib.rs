//! Packs audiobook folders into a single stored zip archive.
//!
//! Every source directory is searched for files matching a set of glob
//! patterns. Matches are flattened into prefixed entry names, sorted in
//! natural order and streamed uncompressed into one archive, directory by
//! directory.

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod ordering;
mod utils;

pub mod prelude {
    pub use crate::archive::{
        CollisionPolicy, ConsoleProgress, DirectoryPlan, NoProgress, Progress, SessionSummary,
        pack, plan,
    };
    pub use crate::cli::{build_options, get_log_file, get_matches, get_verbosity};
    pub use crate::config::{PackOptions, Settings, load_settings};
    pub use crate::discovery::{FileRecord, PatternSet, search_records};
    pub use crate::errors::{
        archive_limit_error, archive_write_error, config_parsing_error, directory_error,
        file_operation_error, generic_error, glob_pattern_error, invalid_filename_error,
        name_collision_error, no_files_found_error, traversal_error,
    };
    pub use crate::errors::{Error, Result};
    pub use crate::logging::{LogLevel, format_message, init_logger};
    pub use crate::ordering::{natural_cmp, sort_records};
}
