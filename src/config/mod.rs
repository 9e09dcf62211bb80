//! Configuration module
//!
//! This module contains the settings file model, its loader and the
//! resolved options of a packing run.

mod loader;
mod model;
mod options;

pub use loader::{load_settings, parse_settings};
pub use model::Settings;
pub use options::PackOptions;
