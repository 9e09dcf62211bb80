use std::fs::create_dir_all;

use directories::ProjectDirs;
use shellexpand::tilde;

use crate::constants::{APPLICATION, ORGANIZATION, QUALIFIER};
use crate::errors::{Result, file_operation_error, generic_error};

/// Expands a leading `~` to the user's home directory
pub fn expand_path(path: &str) -> String {
    tilde(path).into_owned()
}

/// Finds the project folder for the application
///
/// The configuration directory is created when it does not exist yet.
///
/// # Returns
/// * `Result<ProjectDirs>` - The project directories or an error
///
/// # Errors
/// Returns an error if the project directories cannot be determined or
/// created
pub(crate) fn find_project_folder() -> Result<ProjectDirs> {
    let folder = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| generic_error("Failed to determine project directories"))?;

    if !folder.config_dir().exists() {
        create_dir_all(folder.config_dir()).map_err(|e| {
            file_operation_error(e, folder.config_dir().to_path_buf(), "create directory")
        })?;
    }
    Ok(folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path("books/all.zip"), "books/all.zip");
        assert_eq!(expand_path("/tmp/all.zip"), "/tmp/all.zip");
    }

    #[test]
    fn test_expand_path_replaces_tilde() {
        let expanded = expand_path("~/all.zip");
        assert!(!expanded.starts_with('~'), "Got {expanded}");
        assert!(expanded.ends_with("all.zip"));
    }
}
