//! Local directory -> bucket prefix

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::{join_key, local_relative_key};
use crate::traits::ObjectStore;

use super::SyncReport;

/// Upload every regular file under `local_root` below `remote_prefix`
///
/// A file that cannot be read or stored is recorded in the report and the
/// remaining files are still attempted.
pub async fn upload(
    store: &dyn ObjectStore,
    local_root: &Path,
    remote_prefix: &str,
) -> Result<SyncReport> {
    if !local_root.exists() {
        return Err(Error::NotFound(local_root.display().to_string()));
    }
    if !local_root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            local_root.display()
        )));
    }

    let mut report = SyncReport::default();
    let mut files = Vec::new();
    // An unreadable root is an operation error, not a per-item failure
    std::fs::read_dir(local_root)?;
    walk_dir(local_root, &mut files, &mut report);

    tracing::debug!(root = %local_root.display(), count = files.len(), "Collected local files");

    for file in files {
        let file_display = file.display().to_string();
        let key = match local_relative_key(&file, local_root) {
            Ok(relative) => join_key(remote_prefix, &relative),
            Err(e) => {
                report.fail(file_display, e);
                continue;
            }
        };

        match upload_file(store, &file, &key).await {
            Ok(size) => {
                tracing::debug!(file = %file_display, key = %key, size, "Uploaded");
                report.complete(file_display, key, Some(size));
            }
            Err(e) => report.fail(file_display, e),
        }
    }

    Ok(report)
}

async fn upload_file(store: &dyn ObjectStore, file: &Path, key: &str) -> Result<i64> {
    let data = tokio::fs::read(file).await?;
    let size = data.len() as i64;
    let content_type = mime_guess::from_path(file)
        .first()
        .map(|m| m.essence_str().to_string());

    store.put_object(key, data, content_type).await?;
    Ok(size)
}

/// Depth-first walk collecting regular files
///
/// Symlinks to files are followed, symlinked directories are not descended.
/// Unreadable subdirectories are recorded as failures.
fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, report: &mut SyncReport) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            report.fail(dir.display().to_string(), e.into());
            return;
        }
    };

    let mut paths: Vec<(PathBuf, bool)> = Vec::new();
    for entry in entries {
        match entry.and_then(|e| Ok((e.path(), e.file_type()?.is_dir()))) {
            Ok(found) => paths.push(found),
            Err(e) => report.fail(dir.display().to_string(), e.into()),
        }
    }
    paths.sort();

    for (path, is_dir) in paths {
        if is_dir {
            walk_dir(&path, files, report);
        } else if path.is_file() {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory::MemoryStore;
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), b"beta").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_upload_maps_relative_paths() {
        let dir = sample_tree();
        let store = MemoryStore::new();

        let report = upload(&store, dir.path(), "backup").await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.completed.len(), 2);
        assert_eq!(store.keys(), vec!["backup/a.txt", "backup/sub/b.txt"]);
        assert_eq!(store.get("backup/sub/b.txt").unwrap(), b"beta");
        assert_eq!(report.total_bytes(), 9);
    }

    #[tokio::test]
    async fn test_upload_to_bucket_root() {
        let dir = sample_tree();
        let store = MemoryStore::new();

        upload(&store, dir.path(), "").await.unwrap();
        assert_eq!(store.keys(), vec!["a.txt", "sub/b.txt"]);
    }

    #[tokio::test]
    async fn test_upload_continues_after_failure() {
        let dir = sample_tree();
        let store = MemoryStore::new();
        store.fail_key("backup/a.txt");

        let report = upload(&store, dir.path(), "backup/").await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].item.ends_with("a.txt"));
        assert!(matches!(report.failed[0].error, Error::Network(_)));
        assert_eq!(report.completed.len(), 1);
        assert_eq!(store.keys(), vec!["backup/sub/b.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_upload_reports_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = sample_tree();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), b"x").unwrap();
        let store = MemoryStore::new();

        let report = upload(&store, dir.path(), "backup").await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].error, Error::InvalidPath(_)));
        assert_eq!(store.keys(), vec!["backup/a.txt", "backup/sub/b.txt"]);
    }

    #[tokio::test]
    async fn test_upload_missing_root() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();

        let result = upload(&store, &dir.path().join("absent"), "backup").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upload_root_is_file() {
        let dir = sample_tree();
        let store = MemoryStore::new();

        let result = upload(&store, &dir.path().join("a.txt"), "backup").await;
        assert!(matches!(result, Err(Error::InvalidPath(_))));
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_empty_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        let store = MemoryStore::new();

        let report = upload(&store, dir.path(), "backup").await.unwrap();
        assert!(report.completed.is_empty());
        assert!(report.is_success());
    }
}
