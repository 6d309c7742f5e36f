//! sm-core: Core library for the spaces object-storage manager
//!
//! This crate provides the folder-level operations on top of an S3-style
//! object store, including:
//! - Configuration from environment variables and the config file
//! - Prefix enumeration with continuation tokens
//! - Key remapping for copy, move and download
//! - Upload, download, copy, move, remove and metadata edits
//! - A concurrency limiter shared by all operations of a manager
//!
//! This crate is designed to be independent of any specific S3 SDK, the
//! primitive calls live behind the [`ObjectStore`] trait.

pub mod config;
pub mod error;
pub mod limit;
pub mod listing;
pub mod manager;
pub mod path;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigManager, EnvKeys, SpacesConfig, StorageProfile};
pub use error::{Error, Result};
pub use limit::Limiter;
pub use listing::Listing;
pub use manager::{
    DownloadOptions, DownloadSummary, MetadataEdit, SpacesManager, UploadOptions, UploadOutcome,
    UploadSummary, content_type_for,
};
pub use path::remap_key;
pub use traits::{
    Acl, ListOptions, ListResult, MetadataUpdate, ObjectInfo, ObjectStore, PutOptions,
};
