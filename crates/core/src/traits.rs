//! ObjectStore trait definition
//!
//! This trait defines the interface for S3-compatible storage operations.
//! It allows the synchronizer to be decoupled from the specific S3 SDK
//! implementation. Implementations are bound to a single bucket.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata for an object or common prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key or prefix
    pub key: String,

    /// Size in bytes (None for prefixes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Whether this is a common prefix
    pub is_dir: bool,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: None,
            etag: None,
            content_type: None,
            is_dir: false,
        }
    }

    /// Create a new ObjectInfo for a common prefix
    pub fn dir(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            etag: None,
            content_type: None,
            is_dir: true,
        }
    }
}

/// Result of a single list request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResult {
    /// Listed objects and common prefixes
    pub items: Vec<ObjectInfo>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Delimiter for grouping (usually "/")
    pub delimiter: Option<String>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,

    /// Whether to list recursively (ignore delimiter)
    pub recursive: bool,
}

/// Trait for S3-compatible storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects under a prefix
    async fn list_objects(&self, prefix: &str, options: ListOptions) -> Result<ListResult>;

    /// Get object content as bytes
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Store bytes at a key
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo>;

    /// Server-side copy within the bucket
    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<ObjectInfo>;

    /// Delete a batch of keys in one request, returning the keys confirmed deleted
    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>>;
}
