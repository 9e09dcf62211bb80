//! Settings data structures
//!
//! This module contains the optional YAML settings file model.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::archive::CollisionPolicy;
use crate::discovery::PatternSet;

/// Settings read from a YAML file
///
/// Every field is optional; command-line arguments override what is set
/// here.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Extra glob patterns, appended after the built-in default
    #[serde(default)]
    pub globs: Vec<String>,
    /// Output archive path, tilde-expanded when loaded
    pub output: Option<PathBuf>,
    /// Replace an existing regular file at the output path
    pub overwrite: Option<bool>,
    /// Keep a partially written archive after a failure
    pub keep_partial: Option<bool>,
    /// What to do with entry name collisions
    pub on_collision: Option<CollisionPolicy>,
    /// Draw progress bars
    pub progress: Option<bool>,
}

impl Settings {
    /// Validates the settings
    ///
    /// Glob patterns are compiled so a malformed pattern is reported before
    /// any file is touched.
    ///
    /// # Errors
    /// Returns an error naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        PatternSet::with_patterns(&self.globs)
            .map_err(|e| anyhow!("Invalid entry in 'globs': {e}"))?;

        if let Some(output) = &self.output
            && output.as_os_str().is_empty()
        {
            return Err(anyhow!(
                "The 'output' setting is empty. Please specify an archive path."
            ));
        }

        Ok(())
    }
}
