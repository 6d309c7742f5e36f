//! Folder-oriented operations over an [`ObjectStore`]
//!
//! Every public method of [`SpacesManager`] runs under the shared
//! [`Limiter`], so no more than `concurrency` operations are in flight per
//! manager and its clones. Within one operation, per-key work runs
//! sequentially in listing order and the first failure aborts the rest of
//! the batch. Work already done is not rolled back.

mod download;
mod edit;
mod transfer;
mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::limit::Limiter;
use crate::listing::{self, Listing};
use crate::traits::ObjectStore;

pub use edit::MetadataEdit;
pub use upload::content_type_for;

/// Options for `upload_file` and `upload_folder`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Grant `public-read` on the uploaded objects. Default: false.
    pub public: bool,

    /// Write even if the key already exists. When false, an existing object
    /// is left untouched and the upload is reported as skipped. Default: true.
    pub overwrite: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            public: false,
            overwrite: true,
        }
    }
}

/// What happened to a single uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "key", rename_all = "lowercase")]
pub enum UploadOutcome {
    Uploaded(String),
    Skipped(String),
}

impl UploadOutcome {
    pub fn key(&self) -> &str {
        match self {
            UploadOutcome::Uploaded(key) | UploadOutcome::Skipped(key) => key,
        }
    }
}

/// Keys written and skipped by a folder upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
}

/// Options for `download_object`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Replace local files that already exist. Default: false (skip them).
    pub overwrite: bool,

    /// Download every key under the remote path even if it does not end in
    /// `/`. Default: false.
    pub recursive: bool,
}

/// Local files written and skipped by a download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Total bytes written
    pub bytes: u64,
}

/// Entry point for all folder-level operations on one bucket
#[derive(Clone)]
pub struct SpacesManager {
    store: Arc<dyn ObjectStore>,
    limiter: Limiter,
}

impl SpacesManager {
    /// Create a manager over `store` allowing `concurrency` operations at once
    pub fn new(store: Arc<dyn ObjectStore>, concurrency: usize) -> Self {
        Self {
            store,
            limiter: Limiter::new(concurrency),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// The limiter shared by this manager and its clones
    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// List what lives under `prefix`.
    ///
    /// Shallow listings return direct-child keys in `files` and one level of
    /// virtual folders in `folders`. Recursive listings return every key
    /// under the prefix in `files` and leave `folders` empty.
    pub async fn list_objects(&self, prefix: &str, recursive: bool) -> Result<Listing> {
        self.limiter
            .run(listing::list_all(self.store(), prefix, recursive))
            .await
    }

    /// All object keys under `prefix`, in service order
    pub async fn enumerate(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        self.limiter
            .run(listing::enumerate(self.store(), prefix, recursive))
            .await
    }
}
