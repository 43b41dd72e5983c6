//! Operations that stay inside the bucket: delete, copy and folder creation

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::path::{SEPARATOR, folder_marker_key, rewrite_key};
use crate::traits::ObjectStore;

use super::{SyncReport, list_all};

/// Maximum keys accepted by a single delete-objects request
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Outcome of deleting a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing matched the prefix; no delete request was sent
    NoObjects,
    /// Keys removed, and keys the backend refused to remove
    Deleted {
        deleted: Vec<String>,
        failed: Vec<String>,
    },
}

/// Delete every object whose key starts with `prefix`
///
/// Matching keys are removed with batch requests of up to
/// [`DELETE_BATCH_SIZE`] keys. Any listing or request error aborts.
pub async fn delete_prefix(store: &dyn ObjectStore, prefix: &str) -> Result<DeleteOutcome> {
    let keys: Vec<String> = list_all(store, prefix, true)
        .await?
        .into_iter()
        .filter(|item| !item.is_dir)
        .map(|item| item.key)
        .collect();

    if keys.is_empty() {
        tracing::debug!(prefix, "No objects to delete");
        return Ok(DeleteOutcome::NoObjects);
    }

    let mut deleted = Vec::with_capacity(keys.len());
    let mut failed = Vec::new();

    for chunk in keys.chunks(DELETE_BATCH_SIZE) {
        let confirmed: HashSet<String> = store
            .delete_objects(chunk.to_vec())
            .await?
            .into_iter()
            .collect();

        for key in chunk {
            if confirmed.contains(key) {
                deleted.push(key.clone());
            } else {
                failed.push(key.clone());
            }
        }
    }

    if !failed.is_empty() {
        tracing::warn!(prefix, count = failed.len(), "Some objects were not deleted");
    }

    Ok(DeleteOutcome::Deleted { deleted, failed })
}

/// Server-side copy of every object under `source` to `destination`
///
/// Destination keys replace the first occurrence of `source`. The first
/// failed copy is recorded and ends the operation.
pub async fn copy_prefix(
    store: &dyn ObjectStore,
    source: &str,
    destination: &str,
) -> Result<SyncReport> {
    let items = list_all(store, source, true).await?;
    let mut report = SyncReport::default();

    for item in items.into_iter().filter(|item| !item.is_dir) {
        let target = rewrite_key(&item.key, source, destination);

        match store.copy_object(&item.key, &target).await {
            Ok(_) => {
                tracing::debug!(source = %item.key, target = %target, "Copied");
                report.complete(item.key, target, item.size_bytes);
            }
            Err(e) => {
                report.fail(item.key, e);
                break;
            }
        }
    }

    Ok(report)
}

/// Create a zero-byte folder marker at `path/`, returning its key
pub async fn create_folder(store: &dyn ObjectStore, path: &str) -> Result<String> {
    if path.trim_matches(SEPARATOR).is_empty() {
        return Err(Error::InvalidPath("Folder path cannot be empty".into()));
    }

    let key = folder_marker_key(path);
    store.put_object(&key, Vec::new(), None).await?;
    tracing::debug!(key = %key, "Created folder marker");
    Ok(key)
}
