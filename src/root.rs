//! Project-root discovery
//!
//! Walks up from a starting path until a directory satisfies a
//! [`RootPredicate`]. The default predicate looks for an entry-point file,
//! which only works for single-entry-point layouts. It is a heuristic, so
//! both the predicate and the starting point are configurable.

use std::path::{Path, PathBuf};

/// Marker file looked for when no other predicate is configured
pub const DEFAULT_ROOT_MARKER: &str = "main.rs";

/// Decides whether a directory is the project root
pub trait RootPredicate: Send + Sync {
    fn is_root(&self, dir: &Path) -> bool;
}

impl<F> RootPredicate for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_root(&self, dir: &Path) -> bool {
        self(dir)
    }
}

/// Root is the directory containing a file with this name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFile(pub String);

impl MarkerFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Default for MarkerFile {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_MARKER)
    }
}

impl RootPredicate for MarkerFile {
    fn is_root(&self, dir: &Path) -> bool {
        dir.join(&self.0).exists()
    }
}

/// Where the upward walk begins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Anchor {
    /// Source file of the logging library's own frame
    ///
    /// This locates the root around wherever this crate's sources live,
    /// not around the application that logs.
    #[default]
    Library,
    /// File of the application call site being logged
    CallSite,
    /// A fixed directory
    Dir(PathBuf),
}

/// Finds the project root by walking parent directories
pub struct ProjectRootLocator {
    predicate: Box<dyn RootPredicate>,
}

impl ProjectRootLocator {
    pub fn new(predicate: impl RootPredicate + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Locator looking for a marker file with the given name
    pub fn with_marker(name: impl Into<String>) -> Self {
        Self::new(MarkerFile::new(name))
    }

    /// Walk from `start` through each parent until the predicate holds
    ///
    /// `start` itself is checked first, so it may be a file or a directory.
    /// An empty `start` means the caller could not be determined and yields
    /// `None` without touching the filesystem.
    pub fn locate(&self, start: &Path) -> Option<PathBuf> {
        if start.as_os_str().is_empty() {
            return None;
        }

        let root = start
            .ancestors()
            .filter(|dir| !dir.as_os_str().is_empty())
            .find(|dir| self.predicate.is_root(dir))
            .map(Path::to_path_buf);

        if root.is_none() {
            tracing::trace!(start = %start.display(), "project root not found");
        }
        root
    }
}

impl Default for ProjectRootLocator {
    fn default() -> Self {
        Self::new(MarkerFile::default())
    }
}

impl std::fmt::Debug for ProjectRootLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRootLocator").finish_non_exhaustive()
    }
}
