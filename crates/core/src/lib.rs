//! s3h-core: Core library for the s3-helper CLI
//!
//! This crate provides the core functionality for s3-helper, including:
//! - Configuration loading
//! - Mapping between local paths and remote keys
//! - ObjectStore trait for S3 operations
//! - The directory-tree synchronizer (upload, download, copy, delete, tree)
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing the synchronizer to be tested against in-memory stores.

pub mod config;
pub mod error;
pub mod path;
pub mod sync;
pub mod traits;

pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use sync::{DeleteOutcome, Failure, SyncReport, Transfer, TreeFile, TreeLine};
pub use traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};
