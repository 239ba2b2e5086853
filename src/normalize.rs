//! Project-relative path rendering
//!
//! [`normalize`] never fails: whenever a relative path is not meaningful the
//! original path comes back unchanged, which only costs brevity.

use std::path::{Component, Path, PathBuf};

/// Render `file` relative to `root`, or unchanged if that is not possible
///
/// Falls back to `file` when:
/// - there is no root,
/// - one path is absolute and the other relative (or they sit on different
///   volumes),
/// - `file` is not strictly inside `root`.
///
/// A file equal to the root renders as `.`.
pub fn normalize(file: &str, root: Option<&Path>) -> String {
    let Some(root) = root else {
        return file.to_string();
    };

    match relative_to(Path::new(file), root) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.to_string_lossy().into_owned(),
        None => {
            tracing::trace!(file, root = %root.display(), "path not under project root");
            file.to_string()
        }
    }
}

/// Lexical path of `file` inside `root`, `None` if it would climb out
fn relative_to(file: &Path, root: &Path) -> Option<PathBuf> {
    if file.is_absolute() != root.is_absolute() {
        return None;
    }
    let file = clean(file)?;
    let root = clean(root)?;
    file.strip_prefix(&root).ok().map(Path::to_path_buf)
}

/// Resolve `.` and `..` without touching the filesystem
///
/// Returns `None` for a relative path whose `..` climbs above its start,
/// since nothing under any root can match it.
fn clean(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !path.has_root() {
                    return None;
                }
                // `/..` is `/`
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
        }
    }
    Some(out)
}
