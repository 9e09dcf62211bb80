use std::path::{Path, PathBuf};

/// One file selected for inclusion in the archive
///
/// Both fields are fixed at creation: `path` is where the bytes are read
/// from, `name` is the flattened archive entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    name: String,
}

impl FileRecord {
    pub fn new(path: PathBuf, name: String) -> Self {
        FileRecord { path, name }
    }

    /// Location the file's bytes are read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flattened archive entry name
    pub fn name(&self) -> &str {
        &self.name
    }
}
