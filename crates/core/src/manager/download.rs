//! Single-object and prefix downloads

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{DownloadOptions, DownloadSummary, SpacesManager};
use crate::error::{Error, Result};
use crate::listing;
use crate::path;

impl SpacesManager {
    /// Download an object, or every object under a prefix.
    ///
    /// A remote path ending in `/` (or `options.recursive`) downloads every
    /// key under it, re-rooting each key's path relative to the prefix under
    /// `local` (the current directory when `None`).
    ///
    /// A single object lands at `local`, or inside it under the key's base
    /// name when `local` is a directory or is `None`. Existing local files
    /// are skipped unless `options.overwrite` is set.
    pub async fn download_object(
        &self,
        remote: &str,
        local: Option<&Path>,
        options: &DownloadOptions,
    ) -> Result<DownloadSummary> {
        if remote.is_empty() {
            return Err(Error::InvalidArgument("Remote path is required".into()));
        }

        self.limiter
            .run(async {
                let mut summary = DownloadSummary::default();
                if path::is_folder(remote) || options.recursive {
                    self.download_prefix(remote, local, options.overwrite, &mut summary)
                        .await?;
                } else {
                    let target = single_target(remote, local).await?;
                    self.download_one(remote, target, options.overwrite, &mut summary)
                        .await?;
                }
                Ok(summary)
            })
            .await
    }

    async fn download_prefix(
        &self,
        prefix: &str,
        local: Option<&Path>,
        overwrite: bool,
        summary: &mut DownloadSummary,
    ) -> Result<()> {
        let keys = listing::enumerate(self.store(), prefix, true).await?;
        if keys.is_empty() {
            warn!(prefix = %prefix, "No objects found");
            return Ok(());
        }

        let base = local.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        for key in keys {
            if path::is_folder(&key) {
                debug!(key = %key, "Skipping folder placeholder");
                continue;
            }

            let relative = key.strip_prefix(prefix).unwrap_or(&key);
            let relative = if relative.is_empty() {
                path::key_basename(&key)
            } else {
                relative
            };
            let target = path::local_path_for_key(&base, relative)?;
            self.download_one(&key, target, overwrite, summary).await?;
        }
        Ok(())
    }

    async fn download_one(
        &self,
        key: &str,
        target: PathBuf,
        overwrite: bool,
        summary: &mut DownloadSummary,
    ) -> Result<()> {
        match tokio::fs::metadata(&target).await {
            Ok(meta) if meta.is_file() && !overwrite => {
                info!(target = %target.display(), "Skipped (exists)");
                summary.skipped.push(target);
                return Ok(());
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // The target only ever holds a complete body
        let partial = partial_path(&target);
        let bytes = match self.store.get_object_to_file(key, &partial).await {
            Ok(bytes) => bytes,
            Err(e) => {
                match tokio::fs::remove_file(&partial).await {
                    Ok(()) => {}
                    Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
                    Err(cleanup) => {
                        warn!(path = %partial.display(), error = %cleanup, "Could not remove partial download");
                    }
                }
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, &target).await?;
        info!(key = %key, target = %target.display(), bytes, "Downloaded");

        summary.bytes += bytes;
        summary.downloaded.push(target);
        Ok(())
    }
}

/// In-progress name for a download, next to its target
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

/// Where a single downloaded object should be written
async fn single_target(key: &str, local: Option<&Path>) -> Result<PathBuf> {
    let dir = match local {
        Some(local) if !path::looks_like_dir(local) && !is_dir(local).await => {
            return Ok(local.to_path_buf());
        }
        Some(local) => local.to_path_buf(),
        None => PathBuf::new(),
    };

    let file_name = path::key_basename(key);
    if !path::is_plain_name(file_name) {
        return Err(Error::InvalidArgument(format!(
            "Key '{key}' has no usable file name"
        )));
    }
    Ok(dir.join(file_name))
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::UploadOptions;
    use crate::testing::{MemoryStore, Op};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn manager(store: MemoryStore) -> (SpacesManager, Arc<MemoryStore>) {
        let store = Arc::new(store);
        (SpacesManager::new(store.clone(), 2), store)
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        fn walk(dir: &Path, out: &mut BTreeSet<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.insert(path.file_name().unwrap().to_string_lossy().into_owned());
                }
            }
        }
        let mut out = BTreeSet::new();
        walk(dir, &mut out);
        out
    }

    #[tokio::test]
    async fn test_download_single_into_directory() {
        let out = TempDir::new().unwrap();
        let (manager, store) = manager(MemoryStore::new());
        store.insert("test/downloadFile/hello.txt", b"hello");

        let summary = manager
            .download_object(
                "test/downloadFile/hello.txt",
                Some(out.path()),
                &DownloadOptions::default(),
            )
            .await
            .unwrap();

        let expected = out.path().join("hello.txt");
        assert_eq!(summary.downloaded, vec![expected.clone()]);
        assert_eq!(summary.bytes, 5);
        assert_eq!(std::fs::read(expected).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_download_single_to_explicit_file_creates_parents() {
        let out = TempDir::new().unwrap();
        let (manager, store) = manager(MemoryStore::new());
        store.insert("a/b.txt", b"data");

        let target = out.path().join("deep").join("nested").join("renamed.txt");
        manager
            .download_object("a/b.txt", Some(&target), &DownloadOptions::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_overwrite() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("hello.txt");
        std::fs::write(&target, b"local").unwrap();
        let (manager, store) = manager(MemoryStore::new());
        store.insert("r/hello.txt", b"remote");

        let summary = manager
            .download_object("r/hello.txt", Some(&target), &DownloadOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.skipped, vec![target.clone()]);
        assert!(summary.downloaded.is_empty());
        assert_eq!(std::fs::read(&target).unwrap(), b"local");

        let options = DownloadOptions {
            overwrite: true,
            ..Default::default()
        };
        manager
            .download_object("r/hello.txt", Some(&target), &options)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"remote");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let out = TempDir::new().unwrap();
        let (manager, _store) = manager(MemoryStore::new());

        let err = manager
            .download_object("nope.txt", Some(out.path()), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_remote_is_rejected() {
        let (manager, _store) = manager(MemoryStore::new());
        let err = manager
            .download_object("", None, &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_download_prefix_preserves_relative_paths() {
        let out = TempDir::new().unwrap();
        let (manager, _store) = manager(
            MemoryStore::with_objects(&[
                "test/downloadFolder/hello.txt",
                "test/downloadFolder/hotdog.png",
                "test/downloadFolder/subfolder/",
                "test/downloadFolder/subfolder/goodbye.txt",
                "test/elsewhere.txt",
            ])
            .page_size(2),
        );

        let summary = manager
            .download_object(
                "test/downloadFolder/",
                Some(out.path()),
                &DownloadOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.downloaded.len(), 3);
        assert!(out.path().join("hello.txt").is_file());
        assert!(out.path().join("hotdog.png").is_file());
        assert!(out.path().join("subfolder").join("goodbye.txt").is_file());
        assert!(!out.path().join("elsewhere.txt").exists());
    }

    #[tokio::test]
    async fn test_recursive_on_exact_key_uses_base_name() {
        let out = TempDir::new().unwrap();
        let (manager, _store) = manager(MemoryStore::with_objects(&["docs/readme.md"]));

        let options = DownloadOptions {
            recursive: true,
            ..Default::default()
        };
        manager
            .download_object("docs/readme.md", Some(out.path()), &options)
            .await
            .unwrap();
        assert!(out.path().join("readme.md").is_file());
    }

    #[tokio::test]
    async fn test_download_prefix_stops_at_first_failure() {
        let out = TempDir::new().unwrap();
        let (manager, store) = manager(MemoryStore::with_objects(&["p/a", "p/b", "p/c"]));
        store.fail(Op::Get, "p/b");

        let err = manager
            .download_object("p/", Some(out.path()), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Service(_)));
        assert!(out.path().join("a").is_file());
        assert!(!out.path().join("c").exists());
    }

    #[tokio::test]
    async fn test_dot_dot_key_cannot_escape_local_dir() {
        let root = TempDir::new().unwrap();
        let out = root.path().join("out");
        let (manager, _store) = manager(MemoryStore::with_objects(&["p/../escaped.txt"]));

        let err = manager
            .download_object("p/", Some(&out), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!root.path().join("escaped.txt").exists());
    }

    #[tokio::test]
    async fn test_single_download_rejects_dot_dot_base_name() {
        let out = TempDir::new().unwrap();
        let (manager, _store) = manager(MemoryStore::with_objects(&["a/.."]));

        let err = manager
            .download_object("a/..", Some(out.path()), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_failed_transfer_leaves_nothing_to_skip() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("file.bin");
        let (manager, store) = manager(MemoryStore::new());
        store.insert("d/file.bin", b"halfway");
        store.fail(Op::GetTruncated, "d/file.bin");

        let err = manager
            .download_object("d/file.bin", Some(&target), &DownloadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Service(_)));
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());

        // Retry once the connection recovers
        let store = MemoryStore::new();
        store.insert("d/file.bin", b"halfway");
        let (manager, _store) = self::manager(store);
        let summary = manager
            .download_object("d/file.bin", Some(&target), &DownloadOptions::default())
            .await
            .unwrap();
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.downloaded, vec![target.clone()]);
        assert_eq!(std::fs::read(&target).unwrap(), b"halfway");
    }

    #[tokio::test]
    async fn test_failed_overwrite_keeps_previous_file() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("file.bin");
        std::fs::write(&target, b"previous").unwrap();
        let (manager, store) = manager(MemoryStore::new());
        store.insert("d/file.bin", b"replacement");
        store.fail(Op::GetTruncated, "d/file.bin");

        let options = DownloadOptions {
            overwrite: true,
            ..Default::default()
        };
        manager
            .download_object("d/file.bin", Some(&target), &options)
            .await
            .unwrap_err();
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
    }

    #[test]
    fn test_partial_path_is_a_sibling() {
        let target = Path::new("out").join("file.bin");
        assert_eq!(partial_path(&target), Path::new("out").join("file.bin.part"));
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trip() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("hello.txt"), b"hello").unwrap();
        std::fs::write(src.path().join("hotdog.png"), b"png").unwrap();
        std::fs::create_dir(src.path().join("subfolder")).unwrap();
        std::fs::write(src.path().join("subfolder").join("goodbye.txt"), b"bye").unwrap();
        let dst = TempDir::new().unwrap();
        let (manager, _store) = manager(MemoryStore::new());

        manager
            .upload_folder(src.path(), "test/roundTrip/", &UploadOptions::default())
            .await
            .unwrap();
        let options = DownloadOptions {
            recursive: true,
            ..Default::default()
        };
        manager
            .download_object("test/roundTrip/", Some(dst.path()), &options)
            .await
            .unwrap();

        assert_eq!(file_names(src.path()), file_names(dst.path()));
    }
}
