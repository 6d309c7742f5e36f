//! ObjectStore trait definition
//!
//! This trait defines the primitive single-object calls the folder-level
//! operations are composed from. It keeps the manager decoupled from the
//! specific S3 SDK, and can be mocked for testing.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Metadata for an object or common prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key or common prefix
    pub key: String,

    /// Size in bytes (None for prefixes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Whether this is a common prefix (virtual folder)
    pub is_dir: bool,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for a file
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            is_dir: false,
        }
    }

    /// Create a new ObjectInfo for a common prefix
    pub fn dir(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            is_dir: true,
        }
    }
}

/// One page of a list operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResult {
    /// Objects and common prefixes on this page
    pub items: Vec<ObjectInfo>,

    /// Whether more pages are available
    pub truncated: bool,

    /// Continuation token for the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Options for a single list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Prefix to filter by (empty lists the whole bucket)
    pub prefix: String,

    /// List recursively (no delimiter). When false `/` is used as delimiter
    /// and deeper keys are folded into common prefixes.
    pub recursive: bool,

    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Continuation token from the previous page
    pub continuation_token: Option<String>,
}

/// Canned ACLs understood by S3-compatible services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl Acl {
    /// Wire name of the canned ACL
    pub const fn as_str(self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::PublicReadWrite => "public-read-write",
            Acl::AuthenticatedRead => "authenticated-read",
            Acl::BucketOwnerRead => "bucket-owner-read",
            Acl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Acl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private" => Ok(Acl::Private),
            "public-read" => Ok(Acl::PublicRead),
            "public-read-write" => Ok(Acl::PublicReadWrite),
            "authenticated-read" => Ok(Acl::AuthenticatedRead),
            "bucket-owner-read" => Ok(Acl::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(Acl::BucketOwnerFullControl),
            other => Err(Error::InvalidArgument(format!("Unknown ACL: {other}"))),
        }
    }
}

/// Headers sent with a put
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub acl: Option<Acl>,
}

/// Headers written by a metadata-replacing self-copy.
///
/// Fields left as `None` are not sent; the service drops them from the object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub acl: Option<Acl>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// Primitive object calls against a single bucket
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of keys
    async fn list_page(&self, options: ListOptions) -> Result<ListResult>;

    /// Get object metadata. Fails with `Error::NotFound` if the key is absent.
    async fn head_object(&self, key: &str) -> Result<ObjectInfo>;

    /// Upload the contents of a local file
    async fn put_object_from_file(&self, key: &str, local: &Path, options: PutOptions)
    -> Result<()>;

    /// Stream an object body into a local file, returning bytes written
    async fn get_object_to_file(&self, key: &str, local: &Path) -> Result<u64>;

    /// Delete a single object
    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Server-side copy within the bucket
    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()>;

    /// Set the canned ACL of an object
    async fn put_object_acl(&self, key: &str, acl: Acl) -> Result<()>;

    /// Copy an object onto itself, replacing headers and user metadata
    async fn replace_metadata(&self, key: &str, update: MetadataUpdate) -> Result<()>;
}
