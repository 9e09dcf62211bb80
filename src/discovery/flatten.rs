//! Path flattening
//!
//! Turns a source directory and a path relative to it into a single-segment
//! archive entry name, e.g. `book1` + `disc1/track02.mp3` becomes
//! `book1_disc1_track02.mp3`.

use std::path::{Path, is_separator};

use crate::constants::SEPARATOR_REPLACEMENT;
use crate::errors::{Result, invalid_filename_error};

/// Builds the entry-name prefix for a source directory
///
/// The prefix is the last component of `dir` followed by the separator
/// replacement. A directory that resolves to "here" (`.`), its parent
/// (`..`) or the filesystem root has no usable base name and yields an
/// empty prefix.
///
/// # Errors
/// Returns an invalid filename error if `dir` is not valid Unicode
pub fn directory_prefix(dir: &Path) -> Result<String> {
    let raw = dir
        .to_str()
        .ok_or_else(|| invalid_filename_error(dir.to_path_buf()))?;

    let trimmed = raw.trim_end_matches(is_separator);
    let base = match trimmed.rfind(is_separator) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    };

    // `..` is emptied on purpose: `.._track.mp3` names nothing useful
    match base {
        "" | "." | ".." => Ok(String::new()),
        base => Ok(format!("{base}{SEPARATOR_REPLACEMENT}")),
    }
}

/// Collapses a relative path into one segment by replacing every separator
///
/// # Errors
/// Returns an invalid filename error if `relative` is not valid Unicode
pub fn flatten_path(relative: &Path) -> Result<String> {
    let raw = relative
        .to_str()
        .ok_or_else(|| invalid_filename_error(relative.to_path_buf()))?;

    Ok(raw
        .chars()
        .map(|c| {
            if is_separator(c) {
                SEPARATOR_REPLACEMENT
            } else {
                c
            }
        })
        .collect())
}

/// Builds the archive entry name for `relative` found under `dir`
pub fn entry_name(dir: &Path, relative: &Path) -> Result<String> {
    Ok(directory_prefix(dir)? + &flatten_path(relative)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_for_nested_file() {
        let name = entry_name(Path::new("book1"), Path::new("disc1/track02.mp3")).unwrap();
        assert_eq!(name, "book1_disc1_track02.mp3");
    }

    #[test]
    fn test_current_directory_has_no_prefix() {
        assert_eq!(directory_prefix(Path::new(".")).unwrap(), "");
        assert_eq!(directory_prefix(Path::new("./")).unwrap(), "");

        let name = entry_name(Path::new("."), Path::new("disc1/track02.mp3")).unwrap();
        assert_eq!(name, "disc1_track02.mp3");
    }

    #[test]
    fn test_prefix_uses_last_component_only() {
        assert_eq!(
            directory_prefix(Path::new("/srv/audio/book1")).unwrap(),
            "book1_"
        );
        assert_eq!(directory_prefix(Path::new("audio/book1/")).unwrap(), "book1_");
        assert_eq!(directory_prefix(Path::new("audio//book1//")).unwrap(), "book1_");
    }

    #[test]
    fn test_prefix_for_directories_without_a_base_name() {
        assert_eq!(directory_prefix(Path::new("audio/.")).unwrap(), "");
        assert_eq!(directory_prefix(Path::new("/")).unwrap(), "");
    }

    #[test]
    fn test_parent_directory_is_not_used_as_prefix() {
        // Deliberately no `.._` prefix, the parent is treated like `.`
        assert_eq!(directory_prefix(Path::new("..")).unwrap(), "");
        assert_eq!(directory_prefix(Path::new("../")).unwrap(), "");
        assert_eq!(directory_prefix(Path::new("audio/..")).unwrap(), "");

        let name = entry_name(Path::new(".."), Path::new("track02.mp3")).unwrap();
        assert_eq!(name, "track02.mp3");
    }

    #[test]
    fn test_flatten_replaces_every_separator() {
        assert_eq!(
            flatten_path(Path::new("a/b/c/track 1.mp3")).unwrap(),
            "a_b_c_track 1.mp3"
        );
        assert_eq!(flatten_path(Path::new("track.mp3")).unwrap(), "track.mp3");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_names_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new(OsStr::from_bytes(b"track\xff.mp3"));
        assert!(flatten_path(relative).is_err());
    }
}
