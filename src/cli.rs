use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use clap::{
    Arg, ArgAction, ArgMatches, Command, command, crate_authors, crate_description, crate_name,
    crate_version,
};

use crate::archive::CollisionPolicy;
use crate::config::{PackOptions, Settings, load_settings};
use crate::constants::{
    COLLISION_HELP, CONFIG_HELP, DIRS_HELP, DRY_RUN_HELP, FORCE_HELP, GLOB_HELP, KEEP_PARTIAL_HELP,
    LOCAL_LOGGING_HELP, LOG_FILE_DEFAULT, LOG_FILE_HELP, LOG_LEVEL_HELP, NO_PROGRESS_HELP,
    OUTPUT_HELP, QUIET_HELP, VERBOSE_HELP,
};
use crate::discovery::PatternSet;
use crate::errors::{Result, generic_error};
use crate::logging::LogLevel;
use crate::utils::{expand_path, find_project_folder};

/// Builds the command-line interface
///
/// Defines the following arguments:
/// - `dirs`: Source directories, packed in order
/// - `output`: Output archive path
/// - `glob`: Extra glob patterns
/// - `config`: Path to a YAML settings file
/// - `force`, `keep_partial`, `on_collision`: Output and naming behaviour
/// - `dry`, `no_progress`: Run mode
/// - `verbose`, `quiet`, `log_level`, `log_file`, `log_locally`: Logging
pub fn build_command() -> Command {
    let arg_dirs = Arg::new("dirs")
        .help(DIRS_HELP)
        .value_name("DIR")
        .required(true)
        .num_args(1..)
        .value_parser(clap::value_parser!(PathBuf));

    let arg_output = Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .help(OUTPUT_HELP);

    // may be given several times, order is kept
    let arg_glob = Arg::new("glob")
        .short('g')
        .long("glob")
        .value_name("PATTERN")
        .help(GLOB_HELP)
        .action(ArgAction::Append);

    let arg_config = Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help(CONFIG_HELP);

    let arg_force = Arg::new("force")
        .short('f')
        .long("force")
        .help(FORCE_HELP)
        .action(ArgAction::SetTrue);

    let arg_keep_partial = Arg::new("keep_partial")
        .long("keep-partial")
        .help(KEEP_PARTIAL_HELP)
        .action(ArgAction::SetTrue);

    let arg_collision = Arg::new("on_collision")
        .long("on-collision")
        .value_name("MODE")
        .help(COLLISION_HELP)
        .value_parser(["fail", "suffix"]);

    let arg_dry = Arg::new("dry")
        .short('n')
        .long("dry")
        .help(DRY_RUN_HELP)
        .action(ArgAction::SetTrue);

    let arg_no_progress = Arg::new("no_progress")
        .long("no-progress")
        .help(NO_PROGRESS_HELP)
        .action(ArgAction::SetTrue);

    let arg_verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(VERBOSE_HELP)
        .action(ArgAction::Count);

    let arg_quiet = Arg::new("quiet")
        .short('q')
        .long("quiet")
        .help(QUIET_HELP)
        .action(ArgAction::Count);

    let arg_log_level = Arg::new("log_level")
        .long("log-level")
        .value_name("LEVEL")
        .help(LOG_LEVEL_HELP)
        .value_parser(LogLevel::from_str);

    let log_file = Arg::new("log_file")
        .short('l')
        .long("log-file")
        .value_name("FILE")
        .help(LOG_FILE_HELP)
        .default_value(LOG_FILE_DEFAULT);

    let log_locally = Arg::new("log_locally")
        .short('L')
        .long("log-locally")
        .help(LOCAL_LOGGING_HELP)
        .action(ArgAction::SetTrue);

    command!()
        .author(crate_authors!())
        .about(crate_description!())
        .name(crate_name!())
        .version(crate_version!())
        .arg(arg_dirs)
        .arg(arg_output)
        .arg(arg_glob)
        .arg(arg_config)
        .arg(arg_force)
        .arg(arg_keep_partial)
        .arg(arg_collision)
        .arg(arg_dry)
        .arg(arg_no_progress)
        .arg(log_file)
        .arg(log_locally)
        .arg(arg_verbose)
        .arg(arg_quiet)
        .arg(arg_log_level)
}

/// Parses the process arguments
///
/// Exits with clap's usage message when they are invalid.
pub fn get_matches() -> ArgMatches {
    build_command().get_matches()
}

/// Gets the log level from the command-line arguments
///
/// `--log-level` wins; otherwise every `-v` steps up and every `-q` steps
/// down from info.
///
/// # Examples
/// ```
/// # use zipbook::cli::{build_command, get_verbosity};
/// # use zipbook::logging::LogLevel;
/// let matches = build_command()
///     .try_get_matches_from(["zipbook", "-v", "-o", "all.zip", "book"])
///     .unwrap();
/// assert_eq!(get_verbosity(&matches), LogLevel::Debug);
/// ```
pub fn get_verbosity(matches: &ArgMatches) -> LogLevel {
    if let Some(level) = matches.get_one::<LogLevel>("log_level") {
        return *level;
    }
    LogLevel::from_flags(matches.get_count("verbose"), matches.get_count("quiet"))
}

/// Gets the log file path from the command-line arguments
///
/// An empty string means no log file. A given name is placed in the
/// application's config directory unless `--log-locally` is set.
///
/// # Errors
/// Returns an error if the config directory cannot be determined or the
/// resulting path is not valid UTF-8
pub fn get_log_file(matches: &ArgMatches) -> Result<String> {
    let filename = matches
        .get_one::<String>("log_file")
        .cloned()
        .unwrap_or_else(|| LOG_FILE_DEFAULT.to_string());
    if filename.is_empty() || matches.get_flag("log_locally") {
        return Ok(filename);
    }

    let folder = find_project_folder()?;
    let path = folder.config_dir().join(filename);
    let path_str = path
        .to_str()
        .ok_or_else(|| generic_error(&format!("Failed to convert path to string: {path:?}")))?;
    Ok(path_str.to_string())
}

/// Resolves the run options from the arguments and the optional settings file
///
/// Command-line values override settings values. Glob patterns from the
/// settings file come before the ones given with `--glob`.
///
/// # Errors
/// Returns an error if the settings file is invalid, a glob pattern does
/// not compile or no output path is given anywhere
pub fn build_options(matches: &ArgMatches) -> anyhow::Result<PackOptions> {
    let settings = match matches.get_one::<String>("config") {
        Some(path) => load_settings(&PathBuf::from(expand_path(path)))?,
        None => Settings::default(),
    };

    let dirs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("dirs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let output = match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(expand_path(path)),
        None => settings.output.clone().ok_or_else(|| {
            anyhow!("No output archive given. Use --output or set 'output' in the settings file.")
        })?,
    };

    let cli_globs = matches
        .get_many::<String>("glob")
        .map(|values| values.map(String::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    let mut patterns = PatternSet::with_patterns(&settings.globs)?;
    for pattern in cli_globs {
        patterns
            .add(pattern)
            .with_context(|| format!("Invalid --glob value '{pattern}'"))?;
    }

    let collision = match matches.get_one::<String>("on_collision") {
        Some(mode) => mode.parse::<CollisionPolicy>().map_err(|e| anyhow!(e))?,
        None => settings.on_collision.unwrap_or_default(),
    };

    let mut options = PackOptions::new(dirs, output);
    options.patterns = patterns;
    options.overwrite = matches.get_flag("force") || settings.overwrite.unwrap_or(false);
    options.keep_partial =
        matches.get_flag("keep_partial") || settings.keep_partial.unwrap_or(false);
    options.collision = collision;
    options.dry_run = matches.get_flag("dry");
    options.show_progress = !matches.get_flag("no_progress") && settings.progress.unwrap_or(true);

    Ok(options)
}
