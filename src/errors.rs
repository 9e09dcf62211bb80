use glob::PatternError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Custom error type for the zipbook application
#[derive(Debug)]
pub enum Error {
    /// Error related to file operations
    FileOperation {
        source: io::Error,
        path: PathBuf,
        operation: String,
    },
    /// Error related to glob pattern registration
    GlobPattern {
        source: PatternError,
        pattern: String,
    },
    /// Error raised while walking a source directory
    Traversal {
        source: walkdir::Error,
        path: PathBuf,
    },
    /// Error when a source directory yields no matching files
    NoFilesFound { path: PathBuf },
    /// Error related to writing the zip container
    ArchiveWrite {
        source: io::Error,
        entry: String,
        operation: String,
    },
    /// Error when the zip container would exceed a classic zip limit
    ArchiveLimit { detail: String },
    /// Error when an entry name is already taken in the archive
    NameCollision { name: String, path: PathBuf },
    /// Error related to configuration parsing
    ConfigParsing {
        source: Box<dyn StdError + Send + Sync>,
        detail: String,
    },
    /// Error when a filename is not valid Unicode
    InvalidFilename { path: PathBuf },
    /// Error raised while processing one source directory
    Directory { path: PathBuf, source: Box<Error> },
    /// Generic error with a message
    Generic { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileOperation {
                path, operation, ..
            } => {
                write!(f, "Failed to {} file: {}", operation, path.display())
            }
            Error::GlobPattern { pattern, .. } => {
                write!(f, "Invalid glob pattern: {pattern}")
            }
            Error::Traversal { path, .. } => {
                write!(f, "Failed to walk directory: {}", path.display())
            }
            Error::NoFilesFound { path } => {
                write!(f, "No matching files found in: {}", path.display())
            }
            Error::ArchiveWrite {
                entry, operation, ..
            } => {
                write!(f, "Failed to {operation} archive entry '{entry}'")
            }
            Error::ArchiveLimit { detail } => {
                write!(f, "Archive limit exceeded: {detail}")
            }
            Error::NameCollision { name, path } => {
                write!(
                    f,
                    "Entry name '{}' for {} is already used in the archive",
                    name,
                    path.display()
                )
            }
            Error::ConfigParsing { detail, .. } => {
                write!(f, "Configuration parsing error: {detail}")
            }
            Error::InvalidFilename { path } => {
                write!(f, "Filename is not valid unicode: {}", path.display())
            }
            Error::Directory { path, .. } => {
                write!(f, "Failed to process directory: {}", path.display())
            }
            Error::Generic { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::FileOperation { source, .. } => Some(source),
            Error::GlobPattern { source, .. } => Some(source),
            Error::Traversal { source, .. } => Some(source),
            Error::ArchiveWrite { source, .. } => Some(source),
            Error::ConfigParsing { source, .. } => Some(source.as_ref()),
            Error::Directory { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::FileOperation {
            source: err,
            path: PathBuf::new(),
            operation: "perform operation on".to_string(),
        }
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Error::GlobPattern {
            source: err,
            pattern: String::new(),
        }
    }
}

impl Error {
    /// Returns true when the error, or the error it wraps, is the
    /// "no matching files" condition
    pub fn is_no_files_found(&self) -> bool {
        match self {
            Error::NoFilesFound { .. } => true,
            Error::Directory { source, .. } => source.is_no_files_found(),
            _ => false,
        }
    }
}

/// Custom Result type for the zipbook application
///
/// # Examples
/// ```
/// use zipbook::prelude::{Result, generic_error};
///
/// fn example_function() -> Result<String> {
///     // Return success
///     Ok("success".to_string())
///
///     // Or return an error
///     // Err(generic_error("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create a file operation error
pub fn file_operation_error(err: io::Error, path: PathBuf, operation: &str) -> Error {
    Error::FileOperation {
        source: err,
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create an error for a source that is a symbolic link
pub fn symbolic_link_error(path: PathBuf) -> Error {
    file_operation_error(
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "refusing to follow a symbolic link",
        ),
        path,
        "open",
    )
}

/// Helper function to create a glob pattern error
pub fn glob_pattern_error(err: PatternError, pattern: &str) -> Error {
    Error::GlobPattern {
        source: err,
        pattern: pattern.to_string(),
    }
}

/// Helper function to create a traversal error
pub fn traversal_error(err: walkdir::Error, path: PathBuf) -> Error {
    Error::Traversal { source: err, path }
}

/// Helper function to create a no-files-found error
pub fn no_files_found_error(path: PathBuf) -> Error {
    Error::NoFilesFound { path }
}

/// Helper function to create an archive write error
pub fn archive_write_error(err: io::Error, entry: &str, operation: &str) -> Error {
    Error::ArchiveWrite {
        source: err,
        entry: entry.to_string(),
        operation: operation.to_string(),
    }
}

/// Helper function to create an archive limit error
pub fn archive_limit_error(detail: &str) -> Error {
    Error::ArchiveLimit {
        detail: detail.to_string(),
    }
}

/// Helper function to create a name collision error
pub fn name_collision_error(name: &str, path: PathBuf) -> Error {
    Error::NameCollision {
        name: name.to_string(),
        path,
    }
}

/// Helper function to create a config parsing error
pub fn config_parsing_error<E: StdError + Send + Sync + 'static>(err: E, detail: &str) -> Error {
    Error::ConfigParsing {
        source: Box::new(err),
        detail: detail.to_string(),
    }
}

/// Helper function to create an invalid filename error
pub fn invalid_filename_error(path: PathBuf) -> Error {
    Error::InvalidFilename { path }
}

/// Helper function to wrap an error with the directory it was raised for
pub fn directory_error(err: Error, path: PathBuf) -> Error {
    Error::Directory {
        path,
        source: Box::new(err),
    }
}

/// Helper function to create a generic error
pub fn generic_error(message: &str) -> Error {
    Error::Generic {
        message: message.to_string(),
    }
}
