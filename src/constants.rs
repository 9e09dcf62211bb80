/// Constants used throughout the application
///
/// This module centralises all constants used in the application to make
/// them easier to manage and update.

/// Glob pattern that is always registered first
pub const DEFAULT_GLOB: &str = "*.mp3";

/// Replacement for path separators in flattened entry names
pub const SEPARATOR_REPLACEMENT: char = '_';

/// Unix permissions of a freshly created output archive
pub const OUTPUT_FILE_MODE: u32 = 0o600;

/// Qualifier string used for application identification
pub const QUALIFIER: &str = "com";

/// Organisation name used for application identification
pub const ORGANIZATION: &str = "Ondřej Vágner";

/// Application name used for identification
///
/// This is the name of the application used in various contexts like
/// log file paths and application identification.
pub const APPLICATION: &str = "zipbook";

/// Help text for the source directories argument
pub const DIRS_HELP: &str = "Source directories, packed in the given order";

/// Help text for the output command-line option
pub const OUTPUT_HELP: &str = "Output zip archive";

/// Help text for the glob command-line option
pub const GLOB_HELP: &str =
    "Extra glob pattern to include (can be used multiple times). Always included: *.mp3";

/// Help text for the config command-line option
pub const CONFIG_HELP: &str = "Read settings from a YAML file";

/// Help text for the force command-line option
pub const FORCE_HELP: &str = "Replace an existing regular file at the output path";

/// Help text for the keep-partial command-line option
pub const KEEP_PARTIAL_HELP: &str = "Keep the partially written archive when packing fails";

/// Help text for the collision command-line option
pub const COLLISION_HELP: &str = "What to do when two files flatten to the same entry name";

/// Help text for the dry-run command-line option
pub const DRY_RUN_HELP: &str = "Print the planned archive entries without writing anything";

/// Help text for the no-progress command-line option
pub const NO_PROGRESS_HELP: &str = "Do not draw progress bars";

/// Help text for the verbose command-line option
pub const VERBOSE_HELP: &str = "Increase verbosity level (can be used multiple times)";

/// Help text for the quiet command-line option
pub const QUIET_HELP: &str = "Decrease verbosity level (-q warnings only, -qq errors only)";

/// Help text for the log level command-line option
pub const LOG_LEVEL_HELP: &str =
    "Set the log level directly (error, warn, info, debug, trace), overriding -v and -q";

/// Help text for the log file command-line option
pub const LOG_FILE_HELP: &str = "Also write the log to this file";

/// Help text for the local logging command-line option
pub const LOCAL_LOGGING_HELP: &str =
    "Write the log file relative to the working directory instead of the config directory";

/// No log file unless one is requested
pub const LOG_FILE_DEFAULT: &str = "";
