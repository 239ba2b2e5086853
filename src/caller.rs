//! Call-site resolution
//!
//! The public emit methods are `#[track_caller]`, so the [`Location`] they
//! capture is the application's call site, not logging internals. A
//! [`CallerInfo`] provider turns that location into the [`CallSite`] written
//! into the line. Tests swap in [`FixedCaller`] for deterministic output.

use std::panic::Location;
use std::path::{Path, PathBuf};

/// File and line a log call is attributed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Absolute source path, empty when unknown
    pub file: String,
    /// 1-based line, `0` when unknown
    pub line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Placeholder used when the location cannot be determined
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_empty()
    }
}

/// Provides the call site for a captured location
pub trait CallerInfo: Send + Sync {
    fn call_site(&self, location: &Location<'_>) -> CallSite;
}

impl<F> CallerInfo for F
where
    F: Fn(&Location<'_>) -> CallSite + Send + Sync,
{
    fn call_site(&self, location: &Location<'_>) -> CallSite {
        self(location)
    }
}

/// Reports the real call site captured by `#[track_caller]`
///
/// rustc records paths relative to the directory the compiler ran in
/// (the workspace root under cargo). A relative path is joined onto `base`
/// only when the joined file exists; otherwise it is reported unchanged
/// rather than as an absolute path that was never on disk.
#[derive(Debug, Clone)]
pub struct TrackedCaller {
    base: Option<PathBuf>,
}

impl TrackedCaller {
    /// Resolve relative paths against the current working directory
    pub fn new() -> Self {
        Self {
            base: std::env::current_dir().ok(),
        }
    }

    /// Resolve relative paths against `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }
}

impl Default for TrackedCaller {
    fn default() -> Self {
        Self::new()
    }
}

impl CallerInfo for TrackedCaller {
    fn call_site(&self, location: &Location<'_>) -> CallSite {
        let file = location.file();
        if file.is_empty() {
            return CallSite::unknown();
        }
        CallSite::new(absolutize(file, self.base()), location.line())
    }
}

/// Always reports the same call site
#[derive(Debug, Clone, Default)]
pub struct FixedCaller(pub CallSite);

impl CallerInfo for FixedCaller {
    fn call_site(&self, _location: &Location<'_>) -> CallSite {
        self.0.clone()
    }
}

/// Join a relative source path onto `base` if the result exists
fn absolutize(file: &str, base: Option<&Path>) -> String {
    let path = Path::new(file);
    match base {
        Some(base) if path.is_relative() => {
            let joined = base.join(path);
            if joined.exists() {
                joined.to_string_lossy().into_owned()
            } else {
                file.to_string()
            }
        }
        _ => file.to_string(),
    }
}
