//! Logging setup
//!
//! Log lines are written to stdout and, optionally, to a log file. Progress
//! bars are drawn on stderr at the same time, so console lines are printed
//! with the bars suspended while a [`ConsoleProgress`](crate::archive::ConsoleProgress)
//! is attached.

use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Result;
use atty::Stream;
use chrono::SecondsFormat;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, Output};
use indicatif::MultiProgress;
use log::{LevelFilter, Record};

/// How much a run reports, from quietest to loudest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    /// Default: one line per packed file plus the summary
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level '{s}', expected error, warn, info, debug or trace"
            )),
        }
    }
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }

    /// Level after `verbose` steps up and `quiet` steps down from `Info`
    pub fn from_flags(verbose: u8, quiet: u8) -> Self {
        match i16::from(verbose) - i16::from(quiet) {
            i16::MIN..=-2 => LogLevel::Error,
            -1 => LogLevel::Warning,
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Console line writer that steps around live progress bars
pub struct ConsoleSink {
    bars: Mutex<Option<MultiProgress>>,
}

impl ConsoleSink {
    pub const fn new() -> Self {
        ConsoleSink {
            bars: Mutex::new(None),
        }
    }

    /// Suspends `bars` around every line until [`ConsoleSink::detach`]
    pub fn attach(&self, bars: &MultiProgress) {
        if let Ok(mut slot) = self.bars.lock() {
            *slot = Some(bars.clone());
        }
    }

    pub fn detach(&self) {
        if let Ok(mut slot) = self.bars.lock() {
            *slot = None;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.bars.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Writes one line to `out`, hiding the attached bars meanwhile
    pub fn write_line(&self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        // Cloned so the lock isn't held while the bars redraw
        let bars = self.bars.lock().ok().and_then(|slot| slot.clone());
        match bars {
            Some(bars) => bars.suspend(|| writeln!(out, "{line}")),
            None => writeln!(out, "{line}"),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        ConsoleSink::new()
    }
}

static CONSOLE: ConsoleSink = ConsoleSink::new();

/// Routes console log lines around `bars` while they are drawn
pub fn attach_progress(bars: &MultiProgress) {
    CONSOLE.attach(bars);
}

pub fn detach_progress() {
    CONSOLE.detach();
}

fn print_console_line(record: &Record) {
    let stdout = io::stdout();
    // A closed stdout must not abort the run
    let _ = CONSOLE.write_line(&mut stdout.lock(), &record.args().to_string());
}

/// Initialise the logger at `level`
///
/// Console lines are coloured by level when stdout is a terminal. When
/// `log_file` is not empty, every line is also appended to that file with a
/// timestamp, level and target.
pub fn init_logger(level: LogLevel, log_file: &str) -> Result<()> {
    let colors_line = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::White)
        .trace(Color::BrightBlack);
    let colored = atty::is(Stream::Stdout);

    let console_logger = Dispatch::new()
        .format(move |out, message, record| {
            if colored {
                out.finish(format_args!(
                    "\x1B[{}m{}\x1B[0m",
                    colors_line.get_color(&record.level()).to_fg_str(),
                    message
                ))
            } else {
                out.finish(format_args!("{message}"))
            }
        })
        .chain(Output::call(print_console_line));

    let mut logger = Dispatch::new()
        .level(level.to_level_filter())
        .chain(console_logger);

    if !log_file.is_empty() {
        let file_logger = Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(log_file)?);
        logger = logger.chain(file_logger);
    }

    logger.apply()?;
    log::debug!("Logging at {level:?}");

    Ok(())
}

/// Picks the coloured variant of a message when stdout is a terminal
pub fn format_message(message: &str, colored_message: &str) -> String {
    if atty::is(Stream::Stdout) {
        colored_message.to_string()
    } else {
        message.to_string()
    }
}
