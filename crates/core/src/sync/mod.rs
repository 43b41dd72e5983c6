//! Directory-tree synchronizer
//!
//! Translates between a local directory tree and the prefix-delimited key
//! space of a bucket. Every operation runs one storage call at a time and
//! reports per-item outcomes instead of stopping at the first failure,
//! except where an operation is defined to abort (delete, copy).

mod download;
mod remote;
mod tree;
mod upload;

#[cfg(test)]
pub(crate) mod memory;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::SEPARATOR;
use crate::traits::{ListOptions, ObjectInfo, ObjectStore};

pub use download::download;
pub use remote::{DELETE_BATCH_SIZE, DeleteOutcome, copy_prefix, create_folder, delete_prefix};
pub use tree::{DEFAULT_TREE_FILE, TreeFile, TreeLine, list_tree};
pub use upload::upload;

/// Maximum keys requested per list call
pub const PAGE_SIZE: i32 = 1000;

/// A completed transfer of one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    /// Local path or source key
    pub source: String,
    /// Destination key or local path
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
}

/// An item that could not be transferred
#[derive(Debug)]
pub struct Failure {
    /// Local path or key the failure refers to
    pub item: String,
    pub error: Error,
}

/// Aggregated outcome of a transfer operation
#[derive(Debug, Default)]
pub struct SyncReport {
    pub completed: Vec<Transfer>,
    /// Items intentionally not transferred (folder markers)
    pub skipped: Vec<String>,
    pub failed: Vec<Failure>,
}

impl SyncReport {
    /// True when no item failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total bytes moved by completed transfers
    pub fn total_bytes(&self) -> i64 {
        self.completed.iter().filter_map(|t| t.size_bytes).sum()
    }

    pub(crate) fn complete(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        size_bytes: Option<i64>,
    ) {
        self.completed.push(Transfer {
            source: source.into(),
            target: target.into(),
            size_bytes,
        });
    }

    pub(crate) fn fail(&mut self, item: impl Into<String>, error: Error) {
        let item = item.into();
        tracing::warn!(item = %item, error = %error, "Transfer failed");
        self.failed.push(Failure { item, error });
    }
}

/// List every item under a prefix, following continuation tokens
///
/// With `recursive` unset the listing is split at `/`, returning direct
/// objects and common prefixes (`is_dir`) for one level only.
pub async fn list_all(
    store: &dyn ObjectStore,
    prefix: &str,
    recursive: bool,
) -> Result<Vec<ObjectInfo>> {
    let mut items = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let options = ListOptions {
            max_keys: Some(PAGE_SIZE),
            delimiter: (!recursive).then(|| SEPARATOR.to_string()),
            continuation_token: continuation_token.take(),
            recursive,
        };

        let page = store.list_objects(prefix, options).await?;
        tracing::debug!(
            prefix,
            count = page.items.len(),
            truncated = page.truncated,
            "Listed page"
        );
        items.extend(page.items);

        match page.continuation_token {
            Some(token) if page.truncated => continuation_token = Some(token),
            _ => break,
        }
    }

    Ok(items)
}
