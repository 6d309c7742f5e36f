//! Remove, copy and move
//!
//! Copy and move enumerate the source first, then work key by key. A move
//! copies one key and deletes it before touching the next, so an aborted
//! move leaves some keys at the destination only, possibly one at both
//! places, and the rest still at the source. Nothing resumes or rolls back
//! a partial move.

use tracing::{info, warn};

use super::SpacesManager;
use crate::error::{Error, Result};
use crate::listing;
use crate::path;

impl SpacesManager {
    /// Delete every key the enumerator finds under `prefix`, one call per key.
    ///
    /// Returns the number of objects deleted. An empty match is not an error.
    /// Unlike copy and move, a bare key is not narrowed to an exact match:
    /// `docs/a.txt` also removes `docs/a.txt.bak`.
    pub async fn remove_object(&self, prefix: &str, recursive: bool) -> Result<usize> {
        self.limiter
            .run(async {
                let keys = listing::enumerate(self.store(), prefix, recursive).await?;
                if keys.is_empty() {
                    warn!(prefix = %prefix, "No objects found");
                    return Ok(0);
                }

                for key in &keys {
                    self.store.delete_object(key).await?;
                    info!(key = %key, "Deleted");
                }
                Ok(keys.len())
            })
            .await
    }

    /// Server-side copy of `source` to `target`.
    ///
    /// A source ending in `/` copies every key under it, keeping paths
    /// relative to the source. Any other source names exactly one object and
    /// `target` is its full destination key.
    pub async fn copy_object(&self, source: &str, target: &str, recursive: bool) -> Result<usize> {
        self.limiter
            .run(self.transfer(source, target, recursive, false))
            .await
    }

    /// Like [`copy_object`](Self::copy_object), deleting each source key right
    /// after its copy succeeds.
    pub async fn move_object(&self, source: &str, target: &str, recursive: bool) -> Result<usize> {
        self.limiter
            .run(self.transfer(source, target, recursive, true))
            .await
    }

    async fn transfer(
        &self,
        source: &str,
        target: &str,
        recursive: bool,
        delete_source: bool,
    ) -> Result<usize> {
        let mut keys = listing::enumerate(self.store(), source, recursive).await?;
        if !path::is_folder(source) {
            // A bare key also prefix-matches its siblings (`a.txt` vs `a.txt.bak`)
            keys.retain(|key| key == source);
        }

        if keys.is_empty() {
            warn!(source = %source, "No objects found");
            return Ok(0);
        }

        for key in &keys {
            let destination = path::remap_key(source, key, target);
            if destination == *key {
                return Err(Error::InvalidArgument(format!(
                    "Source and destination are the same object: {key}"
                )));
            }

            self.store.copy_object(key, &destination).await?;
            info!(source = %key, target = %destination, "Copied");

            if delete_source {
                self.store.delete_object(key).await?;
                info!(key = %key, "Deleted");
            }
        }

        info!(
            source = %source,
            target = %target,
            count = keys.len(),
            moved = delete_source,
            "Transfer complete"
        );
        Ok(keys.len())
    }
}
