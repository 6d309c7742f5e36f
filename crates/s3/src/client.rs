//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from sm-core for a
//! single bucket.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{MetadataDirective, ObjectCannedAcl};
use tokio::io::AsyncWriteExt;

use sm_core::{
    Acl, Error, ListOptions, ListResult, MetadataUpdate, ObjectInfo, ObjectStore, PutOptions,
    Result, SpacesConfig,
};

use crate::error::map_sdk_error;

/// S3 client wrapper bound to one bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from resolved connection settings
    pub async fn new(config: &SpacesConfig) -> Result<Self> {
        // Build credentials provider
        let credentials = aws_credential_types::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None, // session token
            None, // expiry
            "spaces-static-credentials",
        );

        // Build SDK config
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // Path-style addressing works against every S3-compatible endpoint
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::debug!(endpoint = %config.endpoint, bucket = %config.bucket, "Created S3 client");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Bucket every call is made against
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn copy_source(&self, key: &str) -> String {
        copy_source(&self.bucket, key)
    }
}

/// `x-amz-copy-source` value for a key in `bucket`
pub(crate) fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", urlencoding::encode(key))
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_page(&self, options: ListOptions) -> Result<ListResult> {
        let mut request = self.inner.list_objects_v2().bucket(&self.bucket);

        if !options.prefix.is_empty() {
            request = request.prefix(&options.prefix);
        }

        // Set delimiter (for non-recursive listing)
        if !options.recursive {
            request = request.delimiter("/");
        }

        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &options.prefix))?;

        let mut items = Vec::new();

        // Add common prefixes (directories)
        for prefix in response.common_prefixes() {
            if let Some(p) = prefix.prefix() {
                items.push(ObjectInfo::dir(p));
            }
        }

        // Add objects
        for object in response.contents() {
            let key = object.key().unwrap_or_default();
            items.push(ObjectInfo::file(key, object.size().unwrap_or(0)));
        }

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(ObjectInfo::file(key, response.content_length().unwrap_or(0)))
    }

    async fn put_object_from_file(&self, key: &str, local: &Path, options: PutOptions) -> Result<()> {
        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = options.content_type {
            request = request.content_type(ct);
        }
        if let Some(acl) = options.acl {
            request = request.acl(ObjectCannedAcl::from(acl.as_str()));
        }

        request.send().await.map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }

    async fn get_object_to_file(&self, key: &str, local: &Path) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        // Stream the data to file
        let mut file = tokio::fs::File::create(local).await?;
        let mut body = response.body;
        let mut written = 0u64;

        while let Some(bytes) = body
            .try_next()
            .await
            .map_err(|e| Error::Service(format!("Failed to read body of {key}: {e}")))?
        {
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(())
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.inner
            .copy_object()
            .copy_source(self.copy_source(src_key))
            .bucket(&self.bucket)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, src_key))?;

        Ok(())
    }

    async fn put_object_acl(&self, key: &str, acl: Acl) -> Result<()> {
        self.inner
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;

        Ok(())
    }

    async fn replace_metadata(&self, key: &str, update: MetadataUpdate) -> Result<()> {
        let mut request = self
            .inner
            .copy_object()
            .copy_source(self.copy_source(key))
            .bucket(&self.bucket)
            .key(key)
            .metadata_directive(MetadataDirective::Replace)
            .set_content_type(update.content_type)
            .set_cache_control(update.cache_control)
            .set_metadata(update.metadata);

        if let Some(acl) = update.acl {
            request = request.acl(ObjectCannedAcl::from(acl.as_str()));
        }

        request.send().await.map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpacesConfig {
        SpacesConfig::new("nyc3.digitaloceanspaces.com", "AKIA", "secret", "media").unwrap()
    }

    #[test]
    fn test_copy_source_encodes_key() {
        assert_eq!(copy_source("media", "a.txt"), "media/a.txt");
        assert_eq!(
            copy_source("media", "dir/my file+1.txt"),
            "media/dir%2Fmy%20file%2B1.txt"
        );
    }

    #[tokio::test]
    async fn test_client_is_bound_to_bucket() {
        let client = S3Client::new(&config()).await.unwrap();
        assert_eq!(client.bucket(), "media");
        assert_eq!(client.copy_source("x/y"), "media/x%2Fy");
    }
}
