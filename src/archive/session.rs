//! Archive session
//!
//! One session owns the zip writer for a whole run. Directories are added
//! one after another; each is discovered, sorted and then written file by
//! file before the next one starts. Closing the session writes the central
//! directory and hands back the output.

use std::fs::{File, OpenOptions};
#[cfg(not(unix))]
use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::discovery::{FileRecord, PatternSet, search_records};
use crate::errors::{Result, directory_error, file_operation_error};
#[cfg(not(unix))]
use crate::errors::symbolic_link_error;
use crate::ordering::sort_records;

use super::naming::{CollisionPolicy, resolve_entry_name};
use super::progress::{Progress, ProgressWriter};
use super::writer::{DosDateTime, StoredZipWriter};

/// What was written for one source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySummary {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: u64,
}

/// What was written during a whole session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub directories: usize,
    pub entries: usize,
    pub bytes: u64,
}

/// Discovers the files of one directory in archive order
///
/// # Errors
/// Returns the discovery error unchanged (traversal failure or no files)
pub fn discover_sorted(dir: &Path, patterns: &PatternSet) -> Result<Vec<FileRecord>> {
    let mut records = search_records(dir, patterns)?;
    sort_records(&mut records);
    Ok(records)
}

/// Opens a source file read-only without following a symbolic link
fn open_source(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }
    #[cfg(not(unix))]
    {
        let is_link = fs::symlink_metadata(path)
            .is_ok_and(|metadata| metadata.file_type().is_symlink());
        if is_link {
            return Err(symbolic_link_error(path.to_path_buf()));
        }
    }

    options
        .open(path)
        .map_err(|e| file_operation_error(e, path.to_path_buf(), "open"))
}

/// A single archive-writing session
pub struct ArchiveSession<'p, W: Write + Seek> {
    writer: StoredZipWriter<W>,
    collision: CollisionPolicy,
    progress: &'p dyn Progress,
    summary: SessionSummary,
}

impl<'p, W: Write + Seek> ArchiveSession<'p, W> {
    /// Opens a session writing the archive into `output`
    pub fn new(output: W, collision: CollisionPolicy, progress: &'p dyn Progress) -> Self {
        ArchiveSession {
            writer: StoredZipWriter::new(output),
            collision,
            progress,
            summary: SessionSummary::default(),
        }
    }

    /// Discovers, sorts and writes every matching file of `dir`
    ///
    /// # Errors
    /// Any failure, from discovery to the last byte written, is returned
    /// wrapped with the directory. The session must not be used afterwards
    /// except to be dropped.
    pub fn add_directory(&mut self, dir: &Path, patterns: &PatternSet) -> Result<DirectorySummary> {
        self.write_directory(dir, patterns)
            .map_err(|e| directory_error(e, dir.to_path_buf()))
    }

    fn write_directory(&mut self, dir: &Path, patterns: &PatternSet) -> Result<DirectorySummary> {
        let records = discover_sorted(dir, patterns)?;

        info!("Packing {} files from {}", records.len(), dir.display());
        self.progress.directory_started(dir, records.len() as u64);

        let bytes = self.add_records(&records)?;
        self.progress.directory_finished();

        self.summary.directories += 1;
        Ok(DirectorySummary {
            path: dir.to_path_buf(),
            entries: records.len(),
            bytes,
        })
    }

    /// Writes `records` as entries, in the given order
    ///
    /// Returns the number of bytes copied.
    pub fn add_records(&mut self, records: &[FileRecord]) -> Result<u64> {
        let mut bytes = 0;
        for record in records {
            bytes += self.add_file(record)?;
        }
        Ok(bytes)
    }

    fn add_file(&mut self, record: &FileRecord) -> Result<u64> {
        let path = record.path();
        let mut file = open_source(path)?;
        let metadata = file
            .metadata()
            .map_err(|e| file_operation_error(e, path.to_path_buf(), "stat"))?;
        let modified = metadata
            .modified()
            .map(DosDateTime::from_system_time)
            .unwrap_or_default();

        let writer = &self.writer;
        let name = resolve_entry_name(record, self.collision, |candidate| {
            writer.contains(candidate)
        })?;
        let comment = path.to_string_lossy();

        debug!("Writing {} as '{}'", path.display(), name);
        self.writer.start_entry(&name, &comment, modified)?;
        self.progress.file_started(path, metadata.len());

        let copied = {
            let mut sink = ProgressWriter::new(&mut self.writer, self.progress);
            io::copy(&mut file, &mut sink)
                .map_err(|e| file_operation_error(e, path.to_path_buf(), "copy"))?
        };
        self.writer.finish_entry()?;
        self.progress.file_finished();

        if copied != metadata.len() {
            warn!(
                "{} changed while packing: expected {} bytes, copied {}",
                path.display(),
                metadata.len(),
                copied
            );
        }

        self.summary.entries += 1;
        self.summary.bytes += copied;
        Ok(copied)
    }

    /// Summary of everything written so far
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Writes the central directory and returns the output with the summary
    ///
    /// # Errors
    /// Returns an archive error if the central directory cannot be written
    pub fn close(self) -> Result<(W, SessionSummary)> {
        let output = self.writer.finish()?;
        debug!(
            "Closed archive with {} entries from {} directories",
            self.summary.entries, self.summary.directories
        );
        Ok((output, self.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::progress::NoProgress;
    use crate::errors::Error;
    use std::cell::RefCell;
    use std::fs::{create_dir_all, write};
    use std::io::{Cursor, Read};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
        bytes: RefCell<u64>,
    }

    impl Progress for Recorder {
        fn directory_started(&self, dir: &Path, files: u64) {
            let name = dir.file_name().unwrap().to_string_lossy().to_string();
            self.events.borrow_mut().push(format!("dir {name} {files}"));
        }

        fn file_started(&self, path: &Path, size: u64) {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.events.borrow_mut().push(format!("file {name} {size}"));
        }

        fn bytes_written(&self, delta: u64) {
            *self.bytes.borrow_mut() += delta;
        }

        fn file_finished(&self) {
            self.events.borrow_mut().push("file done".to_string());
        }

        fn directory_finished(&self) {
            self.events.borrow_mut().push("dir done".to_string());
        }
    }

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_directory_is_written_in_natural_order() {
        let temp_dir = tempdir().unwrap();
        let book = temp_dir.path().join("book1");
        create_dir_all(&book).unwrap();
        write(book.join("file10.mp3"), b"ten").unwrap();
        write(book.join("file2.mp3"), b"two").unwrap();
        write(book.join("file1.mp3"), b"one").unwrap();

        let progress = Recorder::default();
        let mut session = ArchiveSession::new(
            Cursor::new(Vec::new()),
            CollisionPolicy::Fail,
            &progress,
        );
        let summary = session.add_directory(&book, &PatternSet::new()).unwrap();
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.bytes, 9);

        let (output, totals) = session.close().unwrap();
        assert_eq!(totals.directories, 1);
        assert_eq!(totals.entries, 3);

        let mut archive = zip::ZipArchive::new(Cursor::new(output.into_inner())).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "book1_file1.mp3");
        assert_eq!(first.comment(), book.join("file1.mp3").to_string_lossy());
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "one");
        drop(first);
        assert_eq!(archive.by_index(2).unwrap().name(), "book1_file10.mp3");

        // Directory bar wraps the file bars, byte deltas add up to the content
        let events = progress.events.borrow();
        assert_eq!(events.first().unwrap(), "dir book1 3");
        assert_eq!(events[1], "file file1.mp3 3");
        assert_eq!(events.last().unwrap(), "dir done");
        assert_eq!(*progress.bytes.borrow(), 9);
    }

    #[test]
    fn test_collisions_fail_by_default() {
        let temp_dir = tempdir().unwrap();
        let book = temp_dir.path().join("book");
        create_dir_all(book.join("a")).unwrap();
        write(book.join("a_b.mp3"), b"flat").unwrap();
        write(book.join("a/b.mp3"), b"nested").unwrap();

        let patterns = PatternSet::with_patterns(["*/*.mp3"]).unwrap();
        let mut session =
            ArchiveSession::new(Cursor::new(Vec::new()), CollisionPolicy::Fail, &NoProgress);

        let error = session.add_directory(&book, &patterns).unwrap_err();
        match error {
            Error::Directory { source, .. } => {
                assert!(
                    matches!(*source, Error::NameCollision { .. }),
                    "Expected a collision, got {source:?}"
                );
            }
            other => panic!("Expected a directory error, got {other:?}"),
        }
    }

    #[test]
    fn test_collisions_are_suffixed_on_request() {
        let temp_dir = tempdir().unwrap();
        let book = temp_dir.path().join("book");
        create_dir_all(book.join("a")).unwrap();
        write(book.join("a_b.mp3"), b"flat").unwrap();
        write(book.join("a/b.mp3"), b"nested").unwrap();

        let patterns = PatternSet::with_patterns(["*/*.mp3"]).unwrap();
        let mut session =
            ArchiveSession::new(Cursor::new(Vec::new()), CollisionPolicy::Suffix, &NoProgress);
        session.add_directory(&book, &patterns).unwrap();
        let (output, _) = session.close().unwrap();

        // Discovery order decides who keeps the plain name
        assert_eq!(
            entry_names(output.into_inner()),
            vec!["book_a_b.mp3", "book_a_b (2).mp3"]
        );
    }

    #[test]
    fn test_missing_source_file_aborts() {
        let temp_dir = tempdir().unwrap();
        let records = vec![FileRecord::new(
            temp_dir.path().join("gone.mp3"),
            "gone.mp3".to_string(),
        )];

        let mut session =
            ArchiveSession::new(Cursor::new(Vec::new()), CollisionPolicy::Fail, &NoProgress);
        let error = session.add_records(&records).unwrap_err();

        assert!(
            matches!(error, Error::FileOperation { ref operation, .. } if operation == "open"),
            "Expected an open failure, got {error:?}"
        );
        assert_eq!(session.summary().entries, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_source_swapped_for_link_is_not_followed() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("elsewhere.mp3");
        write(&target, b"not yours").unwrap();
        let swapped = temp_dir.path().join("ch1.mp3");
        std::os::unix::fs::symlink(&target, &swapped).unwrap();
        let records = vec![FileRecord::new(swapped, "book_ch1.mp3".to_string())];

        let mut session =
            ArchiveSession::new(Cursor::new(Vec::new()), CollisionPolicy::Fail, &NoProgress);
        let error = session.add_records(&records).unwrap_err();

        assert!(
            matches!(error, Error::FileOperation { ref operation, .. } if operation == "open"),
            "Expected an open failure, got {error:?}"
        );
        assert_eq!(session.summary().entries, 0);
    }

    #[test]
    fn test_empty_directory_is_wrapped_no_files_found() {
        let temp_dir = tempdir().unwrap();
        let mut session =
            ArchiveSession::new(Cursor::new(Vec::new()), CollisionPolicy::Fail, &NoProgress);

        let error = session
            .add_directory(temp_dir.path(), &PatternSet::new())
            .unwrap_err();

        assert!(error.is_no_files_found());
        assert!(error.to_string().contains("Failed to process directory"));
    }
}
