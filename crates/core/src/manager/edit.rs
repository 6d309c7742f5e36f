//! ACL and metadata edits

use std::collections::HashMap;

use tracing::{info, warn};

use super::SpacesManager;
use crate::error::Result;
use crate::listing;
use crate::traits::{Acl, MetadataUpdate};

/// Changes to apply to existing objects.
///
/// An edit carrying only `acl` is applied with a single ACL call and leaves
/// the object's headers alone. Anything else rewrites the object's headers
/// in place: fields left as `None` are dropped from the object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataEdit {
    pub acl: Option<Acl>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Seconds; becomes `Cache-Control: max-age=<ttl>` when `cache_control`
    /// is not set
    pub ttl: Option<u64>,
    pub metadata: Option<HashMap<String, String>>,
}

impl MetadataEdit {
    pub fn is_acl_only(&self) -> bool {
        self.acl.is_some()
            && self.content_type.is_none()
            && self.cache_control.is_none()
            && self.ttl.is_none()
            && self.metadata.is_none()
    }

    /// Headers for the metadata-replacing self-copy
    pub fn to_update(&self) -> MetadataUpdate {
        let cache_control = self
            .cache_control
            .clone()
            .or_else(|| self.ttl.map(|ttl| format!("max-age={ttl}")));

        MetadataUpdate {
            acl: self.acl,
            content_type: self.content_type.clone(),
            cache_control,
            metadata: self.metadata.clone(),
        }
    }
}

impl SpacesManager {
    /// Apply `edit` to a single object
    pub async fn edit_object(&self, key: &str, edit: &MetadataEdit) -> Result<()> {
        self.limiter.run(self.edit_object_inner(key, edit)).await
    }

    /// Apply `edit` to every object under `prefix`, one key at a time.
    ///
    /// Returns the number of objects edited.
    pub async fn edit_objects(&self, prefix: &str, edit: &MetadataEdit) -> Result<usize> {
        self.limiter
            .run(async {
                let keys = listing::enumerate(self.store(), prefix, true).await?;
                if keys.is_empty() {
                    warn!(prefix = %prefix, "No objects found");
                    return Ok(0);
                }

                for key in &keys {
                    self.edit_object_inner(key, edit).await?;
                }
                Ok(keys.len())
            })
            .await
    }

    async fn edit_object_inner(&self, key: &str, edit: &MetadataEdit) -> Result<()> {
        match edit.acl {
            Some(acl) if edit.is_acl_only() => {
                self.store.put_object_acl(key, acl).await?;
            }
            _ => {
                self.store.replace_metadata(key, edit.to_update()).await?;
            }
        }
        info!(key = %key, "Updated");
        Ok(())
    }
}
