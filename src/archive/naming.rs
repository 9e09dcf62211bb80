//! Entry name collisions
//!
//! Two files can flatten to the same entry name (`a/b_c.mp3` and
//! `a/b/c.mp3`), and two source directories can share a base name. The
//! collision policy decides what happens then.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::Deserialize;

use crate::discovery::FileRecord;
use crate::errors::{Result, name_collision_error};

/// What to do when an entry name is already used in the archive
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Abort the run
    #[default]
    Fail,
    /// Append ` (N)` before the extension with the smallest free N >= 2
    Suffix,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(CollisionPolicy::Fail),
            "suffix" => Ok(CollisionPolicy::Suffix),
            _ => Err(format!("Unknown collision policy: {s}")),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Fail => write!(f, "fail"),
            CollisionPolicy::Suffix => write!(f, "suffix"),
        }
    }
}

/// Picks the entry name for `record` given the names already taken
///
/// # Errors
/// Returns a name collision error when the name is taken and the policy
/// is [`CollisionPolicy::Fail`]
pub fn resolve_entry_name<F>(record: &FileRecord, policy: CollisionPolicy, is_taken: F) -> Result<String>
where
    F: Fn(&str) -> bool,
{
    let name = record.name();
    if !is_taken(name) {
        return Ok(name.to_string());
    }

    match policy {
        CollisionPolicy::Fail => Err(name_collision_error(name, record.path().to_path_buf())),
        CollisionPolicy::Suffix => {
            let resolved = (2..)
                .map(|counter| suffixed_name(name, counter))
                .find(|candidate| !is_taken(candidate))
                .unwrap_or_else(|| name.to_string());
            warn!(
                "Entry name '{}' is already used, storing {} as '{}'",
                name,
                record.path().display(),
                resolved
            );
            Ok(resolved)
        }
    }
}

/// Inserts ` (counter)` before the extension of `name`
pub fn suffixed_name(name: &str, counter: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], counter, &name[dot..]),
        _ => format!("{name} ({counter})"),
    }
}
