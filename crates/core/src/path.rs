//! Key and prefix helpers
//!
//! Object keys are flat strings. Folders only exist by convention: a key or
//! prefix ending in `/` denotes a virtual directory. Everything in this module
//! is pure string manipulation, no I/O.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Key delimiter used for virtual folders
pub const DELIMITER: char = '/';

/// Whether a key or prefix denotes a virtual folder
pub fn is_folder(key: &str) -> bool {
    key.ends_with(DELIMITER)
}

/// Last path segment of a key (`a/b/c.txt` -> `c.txt`, `a/b/` -> `b`)
pub fn key_basename(key: &str) -> &str {
    let trimmed = key.trim_end_matches(DELIMITER);
    trimmed.rsplit(DELIMITER).next().unwrap_or(trimmed)
}

/// Join a child segment onto a key prefix with exactly one `/` between them
pub fn join_key(base: &str, child: &str) -> String {
    let base = base.trim_end_matches(DELIMITER);
    let child = child.trim_start_matches(DELIMITER);
    if base.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{child}")
    }
}

/// Compute the destination key for `key` discovered under `source_prefix`.
///
/// When `source_prefix` is a folder (ends with `/`) the part of `key` after the
/// prefix is re-rooted under `target_prefix`, inserting the separator if the
/// target lacks one. Otherwise the source names a single object and the
/// target is returned verbatim.
///
/// An empty target on a folder source re-roots at the bucket root.
pub fn remap_key(source_prefix: &str, key: &str, target_prefix: &str) -> String {
    if !is_folder(source_prefix) {
        return target_prefix.to_string();
    }

    let relative = key.strip_prefix(source_prefix).unwrap_or(key);
    if target_prefix.is_empty() {
        relative.to_string()
    } else if is_folder(target_prefix) {
        format!("{target_prefix}{relative}")
    } else {
        format!("{target_prefix}/{relative}")
    }
}

/// Resolve the key an uploaded file lands at.
///
/// A remote path ending in `/` is a folder and receives the local file name.
pub fn upload_key(remote: &str, local: &Path) -> String {
    if is_folder(remote) {
        let file_name = local.file_name().unwrap_or_default().to_string_lossy();
        format!("{remote}{file_name}")
    } else {
        remote.to_string()
    }
}

/// Map a `/`-delimited relative key onto a local directory.
///
/// Keys come from the server, so every segment must be a plain name: `.`,
/// `..`, roots and drive prefixes would place the file outside `dir`.
pub fn local_path_for_key(dir: &Path, relative_key: &str) -> Result<PathBuf> {
    let mut path = dir.to_path_buf();
    for segment in relative_key.split(DELIMITER).filter(|s| !s.is_empty()) {
        if !is_plain_name(segment) {
            return Err(Error::InvalidArgument(format!(
                "Key '{relative_key}' does not map to a path under {}",
                dir.display()
            )));
        }
        path.push(segment);
    }
    Ok(path)
}

/// Whether `segment` is exactly one normal path component
pub fn is_plain_name(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Whether a local path string names a directory by its spelling alone
pub fn looks_like_dir(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_folder_to_folder() {
        assert_eq!(
            remap_key("src/", "src/a/b.txt", "dst/"),
            "dst/a/b.txt"
        );
    }

    #[test]
    fn test_remap_adds_missing_separator() {
        assert_eq!(remap_key("src/", "src/b.txt", "dst"), "dst/b.txt");
        assert_eq!(
            remap_key("test/moveSource/", "test/moveSource/subfolder/goodbye.txt", "test/moveTarget"),
            "test/moveTarget/subfolder/goodbye.txt"
        );
    }

    #[test]
    fn test_remap_never_doubles_separator() {
        let dst = remap_key("a/", "a/x", "b/");
        assert!(!dst.contains("//"));
        assert_eq!(dst, "b/x");
    }

    #[test]
    fn test_remap_single_key_is_verbatim() {
        assert_eq!(remap_key("a/file.txt", "a/file.txt", "b/renamed.txt"), "b/renamed.txt");
        assert_eq!(remap_key("a/file.txt", "a/file.txt", "b/"), "b/");
    }

    #[test]
    fn test_remap_empty_target_is_bucket_root() {
        assert_eq!(remap_key("old/", "old/x/y.txt", ""), "x/y.txt");
    }

    #[test]
    fn test_remap_preserves_suffix_for_every_key() {
        let keys = ["p/a", "p/b", "p/sub/a", "p/sub/b/c"];
        let mapped: Vec<String> = keys.iter().map(|k| remap_key("p/", k, "t")).collect();
        for (key, dst) in keys.iter().zip(&mapped) {
            assert_eq!(*dst, format!("t/{}", &key[2..]));
        }
        let mut unique = mapped.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), mapped.len());
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("test/uploadFolder/", "hello.txt"), "test/uploadFolder/hello.txt");
        assert_eq!(join_key("test/uploadFolder", "subfolder"), "test/uploadFolder/subfolder");
        assert_eq!(join_key("", "hello.txt"), "hello.txt");
        assert_eq!(join_key("dir", ""), "dir/");
    }

    #[test]
    fn test_key_basename() {
        assert_eq!(key_basename("a/b/c.txt"), "c.txt");
        assert_eq!(key_basename("c.txt"), "c.txt");
        assert_eq!(key_basename("a/b/"), "b");
    }

    #[test]
    fn test_upload_key() {
        let local = Path::new("test/upload/hello.txt");
        assert_eq!(upload_key("test/uploadFile/", local), "test/uploadFile/hello.txt");
        assert_eq!(upload_key("test/renamed.txt", local), "test/renamed.txt");
    }

    #[test]
    fn test_local_path_for_key() {
        let path = local_path_for_key(Path::new("out"), "subfolder/goodbye.txt").unwrap();
        assert_eq!(path, Path::new("out").join("subfolder").join("goodbye.txt"));

        let path = local_path_for_key(Path::new("out"), "a//b.txt").unwrap();
        assert_eq!(path, Path::new("out").join("a").join("b.txt"));
    }

    #[test]
    fn test_local_path_for_key_stays_under_dir() {
        for key in ["../escaped.txt", "a/../../b", "./a", "a/./b", ".."] {
            let err = local_path_for_key(Path::new("out"), key).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{key}");
        }
    }

    #[test]
    fn test_is_plain_name() {
        assert!(is_plain_name("goodbye.txt"));
        assert!(is_plain_name("..hidden"));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn test_looks_like_dir() {
        assert!(looks_like_dir(Path::new("download/")));
        assert!(!looks_like_dir(Path::new("download/file.txt")));
    }
}
