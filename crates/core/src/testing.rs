//! In-memory ObjectStore used by the unit tests
//!
//! Keys live in a sorted map, so listings come back in lexicographic order
//! like a real S3 service. Page size is configurable to exercise pagination,
//! and individual calls can be made to fail to observe partial batches.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{Acl, ListOptions, ListResult, MetadataUpdate, ObjectInfo, ObjectStore, PutOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub acl: Option<Acl>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Put,
    Copy,
    Delete,
    Get,
    /// `get_object_to_file` writes half the body, then fails
    GetTruncated,
    Head,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failures: Mutex<HashSet<(Op, String)>>,
    page_size: Option<usize>,
    list_calls: AtomicUsize,
    put_calls: AtomicUsize,
    copy_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(keys: &[&str]) -> Self {
        let store = Self::new();
        for key in keys {
            store.insert(key, key.as_bytes());
        }
        store
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                ..Default::default()
            },
        );
    }

    pub fn fail(&self, op: Op, key: &str) {
        self.failures.lock().unwrap().insert((op, key.to_string()));
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn copy_calls(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check(&self, op: Op, key: &str) -> Result<()> {
        if self.failures.lock().unwrap().contains(&(op, key.to_string())) {
            return Err(Error::Service(format!("injected {op:?} failure for {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(&self, options: ListOptions) -> Result<ListResult> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        // Files and common prefixes share one sorted key space, as in S3
        let entries: BTreeSet<(String, bool)> = {
            let objects = self.objects.lock().unwrap();
            objects
                .range(options.prefix.clone()..)
                .take_while(|(k, _)| k.starts_with(&options.prefix))
                .map(|(key, _)| {
                    let rest = &key[options.prefix.len()..];
                    match rest.find('/') {
                        Some(idx) if !options.recursive => {
                            (format!("{}{}", options.prefix, &rest[..=idx]), true)
                        }
                        _ => (key.clone(), false),
                    }
                })
                .collect()
        };

        let start = options
            .continuation_token
            .as_deref()
            .map(|t| t.parse::<usize>().unwrap())
            .unwrap_or(0);
        let limit = options
            .max_keys
            .map(|m| m as usize)
            .unwrap_or(1000)
            .min(self.page_size.unwrap_or(usize::MAX));

        let items: Vec<ObjectInfo> = entries
            .iter()
            .skip(start)
            .take(limit)
            .map(|(key, is_dir)| {
                if *is_dir {
                    ObjectInfo::dir(key)
                } else {
                    ObjectInfo::file(key, 0)
                }
            })
            .collect();

        let next = start + items.len();
        let truncated = next < entries.len();
        Ok(ListResult {
            items,
            truncated,
            continuation_token: truncated.then(|| next.to_string()),
        })
    }

    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        self.check(Op::Head, key)?;
        let objects = self.objects.lock().unwrap();
        let object = objects
            .get(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        Ok(ObjectInfo::file(key, object.data.len() as i64))
    }

    async fn put_object_from_file(&self, key: &str, local: &Path, options: PutOptions) -> Result<()> {
        self.check(Op::Put, key)?;
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let data = tokio::fs::read(local).await?;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: options.content_type,
                acl: options.acl,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn get_object_to_file(&self, key: &str, local: &Path) -> Result<u64> {
        self.check(Op::Get, key)?;
        let data = self
            .object(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?
            .data;
        if self.check(Op::GetTruncated, key).is_err() {
            tokio::fs::write(local, &data[..data.len() / 2]).await?;
            return Err(Error::Service(format!("connection reset while reading {key}")));
        }
        tokio::fs::write(local, &data).await?;
        Ok(data.len() as u64)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.check(Op::Delete, key)?;
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.check(Op::Copy, src_key)?;
        self.copy_calls.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get(src_key)
            .cloned()
            .ok_or_else(|| Error::NotFound(src_key.to_string()))?;
        objects.insert(dst_key.to_string(), object);
        Ok(())
    }

    async fn put_object_acl(&self, key: &str, acl: Acl) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        object.acl = Some(acl);
        Ok(())
    }

    async fn replace_metadata(&self, key: &str, update: MetadataUpdate) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects
            .get_mut(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        if update.acl.is_some() {
            object.acl = update.acl;
        }
        object.content_type = update.content_type;
        object.cache_control = update.cache_control;
        object.metadata = update.metadata.unwrap_or_default();
        Ok(())
    }
}
