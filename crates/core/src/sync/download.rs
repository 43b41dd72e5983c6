//! Bucket prefix -> local directory

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::path::{directory_prefix, is_folder_marker, key_to_local};
use crate::traits::ObjectStore;

use super::{SyncReport, list_all};

/// Mirror the tree under `remote_prefix` into `local_root`
///
/// Each level is listed with a `/` delimiter: objects are written to the
/// matching local path, common prefixes become local subdirectories and are
/// descended. Folder markers are skipped. A listing error on the top level
/// fails the operation; below it, the failing branch is recorded and
/// abandoned.
pub async fn download(
    store: &dyn ObjectStore,
    remote_prefix: &str,
    local_root: &Path,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    let mut pending: Vec<(String, PathBuf)> =
        vec![(directory_prefix(remote_prefix), local_root.to_path_buf())];
    let mut top_level = true;

    while let Some((prefix, dir)) = pending.pop() {
        let is_top = std::mem::replace(&mut top_level, false);

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            if is_top {
                return Err(e.into());
            }
            report.fail(dir.display().to_string(), e.into());
            continue;
        }

        let items = match list_all(store, &prefix, false).await {
            Ok(items) => items,
            Err(e) if is_top => return Err(e),
            Err(e) => {
                report.fail(prefix, e);
                continue;
            }
        };

        for item in items {
            let relative = item.key.strip_prefix(prefix.as_str()).unwrap_or(&item.key);

            if item.is_dir {
                match key_to_local(&dir, relative) {
                    Ok(subdir) => pending.push((item.key.clone(), subdir)),
                    Err(e) => report.fail(item.key.as_str(), e),
                }
                continue;
            }

            if is_folder_marker(&item.key) {
                report.skipped.push(item.key);
                continue;
            }

            let dest = match key_to_local(&dir, relative) {
                Ok(dest) => dest,
                Err(e) => {
                    report.fail(item.key.as_str(), e);
                    continue;
                }
            };

            match download_object(store, &item.key, &dest).await {
                Ok(size) => {
                    tracing::debug!(key = %item.key, path = %dest.display(), size, "Downloaded");
                    report.complete(item.key, dest.display().to_string(), Some(size));
                }
                Err(e) => report.fail(item.key.as_str(), e),
            }
        }
    }

    Ok(report)
}

async fn download_object(store: &dyn ObjectStore, key: &str, dest: &Path) -> Result<i64> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let data = store.get_object(key).await?;
    tokio::fs::write(dest, &data).await?;
    Ok(data.len() as i64)
}
