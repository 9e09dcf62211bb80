//! Archive module
//!
//! This module contains the stored zip writer, the session that fills it
//! directory by directory and the packing workflow built on top.

mod naming;
pub mod output;
mod pack;
pub mod progress;
mod session;
pub mod writer;

pub use naming::{CollisionPolicy, resolve_entry_name, suffixed_name};
pub use output::{PartialOutputGuard, create_output};
pub use pack::{DirectoryPlan, pack, plan};
pub use progress::{ConsoleProgress, NoProgress, Progress, ProgressWriter};
pub use session::{ArchiveSession, DirectorySummary, SessionSummary, discover_sorted};
pub use writer::{DosDateTime, StoredZipWriter};
