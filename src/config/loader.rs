//! Settings loading functionality
//!
//! This module contains functions for loading and validating the settings
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::debug;
use serde_yaml::from_str;

use crate::utils::expand_path;

use super::model::Settings;

/// Loads settings from a YAML file
///
/// # Arguments
/// * `file` - Path to the settings file
///
/// # Returns
/// * `Result<Settings>` - The loaded settings or an error
///
/// # Errors
/// Returns an error if the file cannot be read or if the settings are invalid
pub fn load_settings(file: &Path) -> Result<Settings> {
    let file_content = fs::read(file)
        .map_err(|e| anyhow!("Failed to read settings file {}: {}", file.display(), e))?;

    let content_str = String::from_utf8(file_content).map_err(|e| {
        anyhow!(
            "Settings file {} contains invalid UTF-8 characters: {}",
            file.display(),
            e
        )
    })?;

    let settings = parse_settings(&content_str).map_err(|e| {
        anyhow!(
            "Failed to parse settings file {}: {}\nPlease check the YAML syntax.",
            file.display(),
            e
        )
    })?;

    debug!("Loaded settings from {}", file.display());

    Ok(settings)
}

/// Parses and validates settings from YAML text
///
/// The output path is tilde-expanded.
pub fn parse_settings(content: &str) -> Result<Settings> {
    let mut settings: Settings = from_str(content)?;

    if let Some(output) = &settings.output
        && let Some(raw) = output.to_str()
    {
        settings.output = Some(PathBuf::from(expand_path(raw)));
    }

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::CollisionPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_settings() {
        let settings = parse_settings(
            r#"
globs:
  - "*/*.mp3"
  - "*.m4b"
output: "books/all.zip"
overwrite: true
keep_partial: false
on_collision: suffix
progress: false
"#,
        )
        .unwrap();

        assert_eq!(settings.globs, vec!["*/*.mp3", "*.m4b"]);
        assert_eq!(settings.output, Some(PathBuf::from("books/all.zip")));
        assert_eq!(settings.overwrite, Some(true));
        assert_eq!(settings.keep_partial, Some(false));
        assert_eq!(settings.on_collision, Some(CollisionPolicy::Suffix));
        assert_eq!(settings.progress, Some(false));
    }

    #[test]
    fn test_parse_empty_settings() {
        let settings = parse_settings("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let result = parse_settings("globs: [\"[\"]");
        let error = result.unwrap_err();
        assert!(
            error.to_string().contains("globs"),
            "Error should name the setting: {error}"
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = parse_settings("compression: deflate");
        assert!(result.is_err(), "Unknown settings must not be ignored");
    }

    #[test]
    fn test_unknown_collision_policy_is_rejected() {
        assert!(parse_settings("on_collision: rename").is_err());
    }

    #[test]
    fn test_output_is_tilde_expanded() {
        let settings = parse_settings("output: \"~/all.zip\"").unwrap();
        let output = settings.output.unwrap();
        assert!(
            !output.to_string_lossy().starts_with('~'),
            "Tilde should be expanded: {}",
            output.display()
        );
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("zipbook.yaml");
        fs::write(&path, "globs: [\"*/*.ogg\"]\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.globs, vec!["*/*.ogg"]);

        let missing = load_settings(&temp_dir.path().join("missing.yaml"));
        assert!(missing.unwrap_err().to_string().contains("Failed to read"));
    }
}
