//! Progress reporting
//!
//! The archive pipeline reports what it is doing through the [`Progress`]
//! trait. Reporting is purely observational: implementations never see file
//! data and cannot influence the archive.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::logging::{attach_progress, detach_progress};

/// Receives progress notifications from the archive pipeline
///
/// All methods default to doing nothing.
pub trait Progress {
    /// A directory was discovered and sorted and holds `files` entries to write
    fn directory_started(&self, _dir: &Path, _files: u64) {}

    /// A file of `size` bytes is about to be copied into the archive
    fn file_started(&self, _path: &Path, _size: u64) {}

    /// `delta` more bytes of the current file were written
    fn bytes_written(&self, _delta: u64) {}

    /// The current file is completely written
    fn file_finished(&self) {}

    /// Every file of the current directory is written
    fn directory_finished(&self) {}
}

/// Progress implementation that reports nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

const DIRECTORY_TEMPLATE: &str = "{prefix} {pos}/{len} {percent:>3}% {spinner} {msg}";
const FILE_TEMPLATE: &str = "  {msg} {bytes:>10} / {total_bytes:<10} {percent:>3}%";
const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Live console progress drawn with indicatif
///
/// Shows one bar per source directory (files written out of total) and one
/// nested bar for the file being copied (bytes written out of its size).
/// The directory spinner is redrawn at a fixed cadence by indicatif's
/// ticker thread.
pub struct ConsoleProgress {
    bars: MultiProgress,
    directory: RefCell<Option<ProgressBar>>,
    file: RefCell<Option<ProgressBar>>,
}

impl ConsoleProgress {
    /// Draws to stderr; indicatif hides the bars when stderr is not a terminal
    pub fn new() -> Self {
        ConsoleProgress::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Draws to `target` and keeps log lines from tearing the bars
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bars = MultiProgress::with_draw_target(target);
        attach_progress(&bars);
        ConsoleProgress {
            bars,
            directory: RefCell::new(None),
            file: RefCell::new(None),
        }
    }

    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        detach_progress();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        ConsoleProgress::new()
    }
}

impl Progress for ConsoleProgress {
    fn directory_started(&self, dir: &Path, files: u64) {
        let bar = self.bars.add(ProgressBar::new(files));
        bar.set_style(Self::style(DIRECTORY_TEMPLATE));
        bar.set_prefix(dir.display().to_string());
        bar.enable_steady_tick(TICK_INTERVAL);
        *self.directory.borrow_mut() = Some(bar);
    }

    fn file_started(&self, path: &Path, size: u64) {
        let bar = self.bars.add(ProgressBar::new(size));
        bar.set_style(Self::style(FILE_TEMPLATE));
        bar.set_message(path.display().to_string());
        *self.file.borrow_mut() = Some(bar);
    }

    fn bytes_written(&self, delta: u64) {
        if let Some(bar) = self.file.borrow().as_ref() {
            bar.inc(delta);
        }
    }

    fn file_finished(&self) {
        if let Some(bar) = self.file.borrow_mut().take() {
            bar.finish_and_clear();
            self.bars.remove(&bar);
        }
        if let Some(bar) = self.directory.borrow().as_ref() {
            bar.inc(1);
        }
    }

    fn directory_finished(&self) {
        if let Some(bar) = self.directory.borrow_mut().take() {
            bar.finish_with_message("done");
        }
    }
}

/// Writer adapter reporting every successful write as a byte delta
pub struct ProgressWriter<'a, W: Write> {
    inner: W,
    progress: &'a dyn Progress,
}

impl<'a, W: Write> ProgressWriter<'a, W> {
    pub fn new(inner: W, progress: &'a dyn Progress) -> Self {
        ProgressWriter { inner, progress }
    }
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.progress.bytes_written(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct ByteCounter {
        total: Cell<u64>,
        calls: Cell<usize>,
    }

    impl Progress for ByteCounter {
        fn bytes_written(&self, delta: u64) {
            self.total.set(self.total.get() + delta);
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_progress_writer_reports_byte_deltas() {
        let counter = ByteCounter::default();
        let mut sink = Vec::new();

        {
            let mut writer = ProgressWriter::new(&mut sink, &counter);
            writer.write_all(b"0123456789").unwrap();
            writer.write_all(b"abc").unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(sink, b"0123456789abc");
        assert_eq!(counter.total.get(), 13);
        assert!(counter.calls.get() >= 2);
    }

    #[test]
    fn test_console_progress_runs_hidden() {
        // Drive the console bars through a whole directory without a terminal
        let progress = ConsoleProgress::with_draw_target(ProgressDrawTarget::hidden());
        let dir = PathBuf::from("book1");

        progress.directory_started(&dir, 2);
        for size in [10, 0] {
            progress.file_started(&dir.join("track.mp3"), size);
            progress.bytes_written(size);
            progress.file_finished();
        }
        progress.directory_finished();

        assert!(progress.file.borrow().is_none());
        assert!(progress.directory.borrow().is_none());
    }

    #[test]
    fn test_no_progress_accepts_everything() {
        let progress = NoProgress;
        progress.directory_started(Path::new("."), 1);
        progress.file_started(Path::new("a.mp3"), 1);
        progress.bytes_written(1);
        progress.file_finished();
        progress.directory_finished();
    }
}
