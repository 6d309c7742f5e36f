//! Paginated enumeration of keys under a prefix

use serde::Serialize;

use crate::error::Result;
use crate::traits::{ListOptions, ObjectStore};

/// Keys requested per list call (the S3 maximum)
pub const PAGE_SIZE: i32 = 1000;

/// Keys and virtual folders found under a prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Object keys, in service order
    pub files: Vec<String>,

    /// Common prefixes one level below the listed prefix. Always empty for
    /// recursive listings.
    pub folders: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

/// Walk every page under `prefix`, following continuation tokens until the
/// service reports no more pages.
///
/// A shallow walk (`recursive == false`) uses `/` as delimiter, so only keys
/// without a further `/` after the prefix come back as files.
pub async fn list_all(store: &dyn ObjectStore, prefix: &str, recursive: bool) -> Result<Listing> {
    let mut listing = Listing::default();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let options = ListOptions {
            prefix: prefix.to_string(),
            recursive,
            max_keys: Some(PAGE_SIZE),
            continuation_token: continuation_token.take(),
        };

        let page = store.list_page(options).await?;
        pages += 1;

        for item in page.items {
            if item.is_dir {
                listing.folders.push(item.key);
            } else {
                listing.files.push(item.key);
            }
        }

        match (page.truncated, page.continuation_token) {
            (true, Some(token)) => continuation_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(
        prefix = %prefix,
        recursive,
        pages,
        files = listing.files.len(),
        folders = listing.folders.len(),
        "Enumerated prefix"
    );

    Ok(listing)
}

/// Every object key under `prefix`, in service order
pub async fn enumerate(store: &dyn ObjectStore, prefix: &str, recursive: bool) -> Result<Vec<String>> {
    Ok(list_all(store, prefix, recursive).await?.files)
}
