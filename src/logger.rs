//! The logger facade
//!
//! Each emit runs the same pipeline: level gate, call-site resolution,
//! project-root lookup, path normalization, line assembly, and a single write
//! to the sink. Nothing is cached between calls.
//!
//! Logging from inside the sink's own `write` is not supported: the sink
//! mutex is held for the duration of the write and would deadlock.

use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::caller::{CallSite, CallerInfo, TrackedCaller};
use crate::config::Config;
use crate::error::Result;
use crate::format::FormatFlags;
use crate::level::Severity;
use crate::normalize::normalize;
use crate::root::{Anchor, ProjectRootLocator, RootPredicate};
use crate::sink;

/// Leveled logger writing annotated lines to an append-only sink
///
/// Construct one explicitly and share it by reference or `Arc`; there is no
/// global instance.
pub struct Logger {
    threshold: Severity,
    flags: FormatFlags,
    prefix: String,
    sink: Mutex<Box<dyn Write + Send>>,
    caller: Box<dyn CallerInfo>,
    locator: ProjectRootLocator,
    anchor: Anchor,
    failed_writes: AtomicU64,
}

impl Logger {
    /// Start building a logger around `sink`
    pub fn builder(sink: impl Write + Send + 'static) -> LoggerBuilder {
        LoggerBuilder::new(Box::new(sink))
    }

    /// Open the configured log file and build a logger for it
    pub fn open(config: &Config) -> Result<Self> {
        let file = sink::open_append(&config.file)?;
        Ok(Self::builder(file)
            .threshold(config.level)
            .flags(config.format)
            .prefix(config.prefix.clone())
            .root_marker(config.root_marker.clone())
            .build())
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn flags(&self) -> FormatFlags {
        self.flags
    }

    /// Number of lines the sink failed to accept
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    /// Whether a line of this severity would be written
    pub fn enabled(&self, level: Severity) -> bool {
        level != Severity::All && self.threshold.permits(level)
    }

    /// Write a line at `level`, attributed to the caller
    #[track_caller]
    pub fn log(&self, level: Severity, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, Location::caller(), args);
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Debug, args);
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Info, args);
    }

    #[track_caller]
    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Warning, args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Error, args);
    }

    fn emit(&self, level: Severity, location: &Location<'_>, args: fmt::Arguments<'_>) {
        let call_site = self.caller.call_site(location);
        let file = self.file_token(&call_site);

        let mut line = String::with_capacity(128);
        line.push_str(&self.prefix);
        line.push_str(&timestamp(self.flags));
        line.push_str(level.tag());
        line.push(' ');
        line.push_str(&file);
        line.push(':');
        line.push_str(&call_site.line.to_string());
        line.push(' ');
        line.push_str(&args.to_string());
        if !line.ends_with('\n') {
            line.push('\n');
        }

        self.write(line.as_bytes());
    }

    /// Location text for the line, per the file flags
    fn file_token(&self, call_site: &CallSite) -> String {
        if self.flags.contains(FormatFlags::SHORT_FILE) {
            return Path::new(&call_site.file)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| call_site.file.clone());
        }
        if self.flags.contains(FormatFlags::LONG_FILE) {
            return call_site.file.clone();
        }

        let start = match &self.anchor {
            Anchor::Library => library_frame(),
            Anchor::CallSite => PathBuf::from(&call_site.file),
            Anchor::Dir(dir) => dir.clone(),
        };
        let root = self.locator.locate(&start);
        normalize(&call_site.file, root.as_deref())
    }

    fn write(&self, line: &[u8]) {
        let result = match self.sink.lock() {
            Ok(mut sink) => sink.write_all(line).and_then(|()| sink.flush()),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log sink lock poisoned")),
        };

        if let Err(e) = result {
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "failed to write log line");
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("flags", &self.flags)
            .field("prefix", &self.prefix)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}

/// Source file of the logger's own frame
///
/// `file!()` is relative to the workspace root, which need not be this
/// package, so the path is rebuilt from the manifest directory instead.
fn library_frame() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("logger.rs")
}

/// Date and time fields, each followed by a space
fn timestamp(flags: FormatFlags) -> String {
    if !flags.has_timestamp() {
        return String::new();
    }
    if flags.contains(FormatFlags::UTC) {
        format_timestamp(flags, &Utc::now())
    } else {
        format_timestamp(flags, &Local::now())
    }
}

fn format_timestamp<Tz>(flags: FormatFlags, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    if flags.contains(FormatFlags::DATE) {
        out.push_str(&now.format("%Y/%m/%d ").to_string());
    }
    if flags.contains(FormatFlags::TIME) || flags.contains(FormatFlags::MICROSECONDS) {
        out.push_str(&now.format("%H:%M:%S").to_string());
        if flags.contains(FormatFlags::MICROSECONDS) {
            out.push_str(&now.format("%.6f").to_string());
        }
        out.push(' ');
    }
    out
}

/// Configures a [`Logger`]
pub struct LoggerBuilder {
    sink: Box<dyn Write + Send>,
    threshold: Severity,
    flags: FormatFlags,
    prefix: String,
    caller: Box<dyn CallerInfo>,
    locator: ProjectRootLocator,
    anchor: Anchor,
}

impl LoggerBuilder {
    fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink,
            threshold: Severity::All,
            flags: FormatFlags::EMPTY,
            prefix: String::new(),
            caller: Box::new(TrackedCaller::new()),
            locator: ProjectRootLocator::default(),
            anchor: Anchor::default(),
        }
    }

    pub fn threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace how call sites are resolved
    pub fn caller(mut self, caller: impl CallerInfo + 'static) -> Self {
        self.caller = Box::new(caller);
        self
    }

    /// Treat the directory containing a file with this name as the root
    pub fn root_marker(mut self, name: impl Into<String>) -> Self {
        self.locator = ProjectRootLocator::with_marker(name);
        self
    }

    /// Replace the root test entirely
    pub fn root_predicate(mut self, predicate: impl RootPredicate + 'static) -> Self {
        self.locator = ProjectRootLocator::new(predicate);
        self
    }

    /// Where the root search starts
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            threshold: self.threshold,
            flags: self.flags,
            prefix: self.prefix,
            sink: Mutex::new(self.sink),
            caller: self.caller,
            locator: self.locator,
            anchor: self.anchor,
            failed_writes: AtomicU64::new(0),
        }
    }
}

/// Log at debug: `debug!(logger, "x={}", x)`
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

/// Log at info: `info!(logger, "listening on {}", addr)`
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// Log at warning
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warning(::std::format_args!($($arg)+))
    };
}

/// Log at error
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}
