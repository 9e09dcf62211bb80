//! File discovery module
//!
//! This module contains components for walking source directories, matching
//! files against glob patterns and naming the archive entries.

pub mod flatten;
mod patterns;
mod record;
mod walker;

pub use flatten::{directory_prefix, entry_name, flatten_path};
pub use patterns::PatternSet;
pub use record::FileRecord;
pub use walker::search_records;
