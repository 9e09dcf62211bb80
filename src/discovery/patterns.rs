//! Glob pattern set
//!
//! This module holds the ordered set of glob patterns a file must match to be
//! packed. Patterns are validated when they are registered, never at walk time.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use log::debug;

use crate::constants::DEFAULT_GLOB;
use crate::errors::{Result, glob_pattern_error};

/// `*` and `?` never cross a path separator, like a shell.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Ordered, append-only set of glob patterns
///
/// The first pattern is always the built-in default.
///
/// Patterns use the `glob` crate's syntax, which is close to shell matching
/// with a few differences:
/// - `**` is only valid as a whole path component (`**/*.mp3` matches at any
///   depth); `track**.mp3` is rejected.
/// - Character classes are negated with `[!a]`. In `[^a]` the caret is a
///   literal member of the class.
/// - Backslash is not an escape. Metacharacters are matched literally by
///   wrapping them in brackets, e.g. `[*]`.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Creates a set holding only the built-in default pattern
    pub fn new() -> Self {
        PatternSet {
            patterns: vec![Pattern::new(DEFAULT_GLOB).expect("default glob pattern is valid")],
        }
    }

    /// Creates a set holding the default pattern followed by `extra`
    ///
    /// # Errors
    /// Returns a glob pattern error for the first malformed pattern
    pub fn with_patterns<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = PatternSet::new();
        for pattern in extra {
            set.add(pattern.as_ref())?;
        }
        Ok(set)
    }

    /// Registers a pattern at the end of the set
    ///
    /// # Errors
    /// Returns a glob pattern error when the pattern is malformed, e.g. an
    /// unbalanced `[`
    pub fn add(&mut self, pattern: &str) -> Result<()> {
        let compiled = Pattern::new(pattern).map_err(|e| glob_pattern_error(e, pattern))?;
        debug!("Registered glob pattern: {pattern}");
        self.patterns.push(compiled);
        Ok(())
    }

    /// Returns the first pattern matching `relative`, if any
    pub fn first_match(&self, relative: &Path) -> Option<&Pattern> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS))
    }

    /// Checks whether `relative` matches at least one pattern
    pub fn matches(&self, relative: &Path) -> bool {
        self.first_match(relative).is_some()
    }

    /// The registered patterns as strings, in registration order
    pub fn as_strings(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        PatternSet::new()
    }
}
