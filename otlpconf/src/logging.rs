//! Logging infrastructure for the otlpconf library.
//!
//! The library itself only talks to the `log` facade. This module provides a
//! small stderr backend for binaries that do not bring their own.

use std::env;
use std::fmt;

use log::{Level, LevelFilter, Metadata, Record};

/// Environment variable selecting the log level when no flag is given.
pub const LOG_MODE_ENV: &str = "OTLPCONF_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use otlpconf::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all non-essential output.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Everything, including debug messages.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use otlpconf::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("quiet").unwrap(), LogLevel::Quiet);
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("invalid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The `log` filter corresponding to this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Off,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }

    /// The most verbose level whose filter does not exceed `filter`.
    #[must_use]
    pub fn from_filter(filter: LevelFilter) -> Self {
        if filter >= LevelFilter::Debug {
            Self::Verbose
        } else if filter >= LevelFilter::Warn {
            Self::Normal
        } else {
            Self::Quiet
        }
    }
}

/// A stderr backend for the `log` facade.
///
/// A logger built with [`Logger::new`] keeps its level. The one installed by
/// [`init_logger`] has none and follows [`log::max_level`] instead.
///
/// # Examples
///
/// ```
/// use otlpconf::{LogLevel, Logger};
/// use log::Log;
///
/// let logger = Logger::new(LogLevel::Normal);
/// assert!(logger.enabled(&log::Metadata::builder().level(log::Level::Error).build()));
/// assert!(!logger.enabled(&log::Metadata::builder().level(log::Level::Debug).build()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    level: Option<LogLevel>,
}

static GLOBAL_LOGGER: Logger = Logger { level: None };

impl Logger {
    /// Creates a new logger with the specified log level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level: Some(level) }
    }

    /// Returns the current log level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_filter(self.filter())
    }

    fn filter(&self) -> LevelFilter {
        self.level.map_or_else(log::max_level, LogLevel::filter)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug | Level::Trace => "DEBUG",
        };
        eprintln!("{tag}: {}", record.args());
    }

    fn flush(&self) {}
}

/// Chooses the log level from CLI flags and the environment.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet, verbose winning when both are set)
/// 2. `OTLPCONF_LOG_MODE` environment variable
/// 3. Default (Normal)
#[must_use]
pub fn resolve_log_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }

    env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .unwrap_or(LogLevel::Normal)
}

/// Installs the stderr logger as the global `log` backend.
///
/// The backend is installed once and follows the global maximum level, so a
/// later call changes what the installed logger lets through. Returns the
/// level in effect.
///
/// # Examples
///
/// ```
/// use otlpconf::{init_logger, LogLevel};
///
/// let level = init_logger(true, false);
/// assert_eq!(level, LogLevel::Verbose);
/// ```
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = resolve_log_level(verbose, quiet);
    log::set_max_level(level.filter());
    if log::set_logger(&GLOBAL_LOGGER).is_err() {
        log::debug!("logger already installed, adjusting level to {level}");
    }
    level
}
