//! Key and path mapping
//!
//! Remote keys live in a flat namespace where `/` is only a convention.
//! These helpers translate between that namespace and a local directory
//! tree rooted at a user-supplied path.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Conventional separator for remote keys
pub const SEPARATOR: char = '/';

/// Join a relative key below a remote prefix without doubling the separator
pub fn join_key(prefix: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches(SEPARATOR);
    if prefix.is_empty() {
        relative.to_string()
    } else if prefix.ends_with(SEPARATOR) {
        format!("{prefix}{relative}")
    } else {
        format!("{prefix}{SEPARATOR}{relative}")
    }
}

/// Normalize a prefix to directory form (`logs` -> `logs/`)
///
/// The empty prefix (bucket root) stays empty.
pub fn directory_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with(SEPARATOR) {
        prefix.to_string()
    } else {
        format!("{prefix}{SEPARATOR}")
    }
}

/// Key of the zero-byte marker object representing a folder
pub fn folder_marker_key(path: &str) -> String {
    directory_prefix(path)
}

/// Whether a key is a folder marker
pub fn is_folder_marker(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}

/// Destination key for a copy: the first occurrence of `source` is replaced
///
/// Keys listed under `source` always start with it, so this renames the
/// leading prefix. A key that does not contain `source` is returned unchanged.
pub fn rewrite_key(key: &str, source: &str, destination: &str) -> String {
    key.replacen(source, destination, 1)
}

/// Convert a local file path below `root` into a `/` separated relative key
pub fn local_relative_key(path: &Path, root: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        Error::InvalidPath(format!(
            "{} is not below {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => match segment.to_str() {
                Some(segment) => segments.push(segment.to_string()),
                None => {
                    return Err(Error::InvalidPath(format!(
                        "{} is not valid UTF-8",
                        path.display()
                    )));
                }
            },
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidPath(format!(
                    "Unexpected component in {}",
                    relative.display()
                )));
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::InvalidPath(format!(
            "{} has no relative component",
            path.display()
        )));
    }

    Ok(segments.join("/"))
}

/// Map a relative key onto a local path below `root`
///
/// Segments that would leave `root` are rejected; empty and `.` segments
/// are dropped.
pub fn key_to_local(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    let mut pushed = false;

    for segment in relative.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidPath(format!(
                    "Key '{relative}' escapes the download directory"
                )));
            }
            segment => {
                let candidate = Path::new(segment);
                if candidate.has_root() || candidate.components().count() != 1 {
                    return Err(Error::InvalidPath(format!(
                        "Key '{relative}' contains an unsupported segment"
                    )));
                }
                path.push(segment);
                pushed = true;
            }
        }
    }

    if !pushed {
        return Err(Error::InvalidPath(format!(
            "Key '{relative}' does not name a file"
        )));
    }

    Ok(path)
}

/// Last non-empty segment of a key or prefix (`a/b/` -> `b`, `a/c.txt` -> `c.txt`)
pub fn last_segment(key: &str) -> &str {
    key.trim_end_matches(SEPARATOR)
        .rsplit(SEPARATOR)
        .next()
        .unwrap_or_default()
}
