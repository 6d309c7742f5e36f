//! File and folder uploads

use std::path::Path;

use futures::FutureExt as _;
use futures::future::BoxFuture;
use tracing::{debug, info};

use super::{SpacesManager, UploadOptions, UploadOutcome, UploadSummary};
use crate::error::{Error, Result};
use crate::path;
use crate::traits::{Acl, PutOptions};

/// Fallback content type for unknown extensions
const OCTET_STREAM: &str = "application/octet-stream";

/// Content type for a local file, guessed from its extension (case-insensitive)
pub fn content_type_for(local: &Path) -> String {
    local
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .and_then(|ext| mime_guess::from_ext(&ext).first())
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

impl SpacesManager {
    /// Upload one local file.
    ///
    /// `remote` is the full key, unless it ends in `/` in which case the
    /// local file name is appended. With `overwrite == false` an existence
    /// check runs first and an existing object is left alone.
    pub async fn upload_file(
        &self,
        local: &Path,
        remote: &str,
        options: &UploadOptions,
    ) -> Result<UploadOutcome> {
        self.limiter
            .run(self.upload_file_inner(local, remote, options))
            .await
    }

    /// Upload a local directory tree under `remote`, preserving relative
    /// paths. Entries are visited in file-name order.
    pub async fn upload_folder(
        &self,
        local: &Path,
        remote: &str,
        options: &UploadOptions,
    ) -> Result<UploadSummary> {
        self.limiter
            .run(async {
                if !tokio::fs::metadata(local).await?.is_dir() {
                    return Err(Error::InvalidArgument(format!(
                        "Not a directory: {}",
                        local.display()
                    )));
                }

                let mut summary = UploadSummary::default();
                self.upload_folder_inner(local, remote, options, &mut summary)
                    .await?;

                info!(
                    local = %local.display(),
                    remote = %remote,
                    uploaded = summary.uploaded.len(),
                    skipped = summary.skipped.len(),
                    "Uploaded folder"
                );
                Ok(summary)
            })
            .await
    }

    async fn upload_file_inner(
        &self,
        local: &Path,
        remote: &str,
        options: &UploadOptions,
    ) -> Result<UploadOutcome> {
        let key = path::upload_key(remote, local);

        if !options.overwrite {
            match self.store.head_object(&key).await {
                Ok(_) => {
                    info!(key = %key, "Skipped (exists)");
                    return Ok(UploadOutcome::Skipped(key));
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        let put = PutOptions {
            content_type: Some(content_type_for(local)),
            acl: options.public.then_some(Acl::PublicRead),
        };
        debug!(key = %key, content_type = ?put.content_type, public = options.public, "Uploading");

        self.store.put_object_from_file(&key, local, put).await?;
        info!(local = %local.display(), key = %key, "Uploaded");
        Ok(UploadOutcome::Uploaded(key))
    }

    fn upload_folder_inner<'a>(
        &'a self,
        local: &'a Path,
        remote: &'a str,
        options: &'a UploadOptions,
        summary: &'a mut UploadSummary,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let mut entries = Vec::new();
            let mut dir = tokio::fs::read_dir(local).await?;
            while let Some(entry) = dir.next_entry().await? {
                entries.push(entry);
            }
            entries.sort_by_key(|entry| entry.file_name());

            for entry in entries {
                let child_local = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let child_remote = path::join_key(remote, &name);

                // Follows symlinks
                if tokio::fs::metadata(&child_local).await?.is_dir() {
                    self.upload_folder_inner(&child_local, &child_remote, options, summary)
                        .await?;
                } else {
                    match self
                        .upload_file_inner(&child_local, &child_remote, options)
                        .await?
                    {
                        UploadOutcome::Uploaded(key) => summary.uploaded.push(key),
                        UploadOutcome::Skipped(key) => summary.skipped.push(key),
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }
}
