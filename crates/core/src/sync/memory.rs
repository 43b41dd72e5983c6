//! In-memory ObjectStore used by the synchronizer tests

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};

#[derive(Default)]
pub(crate) struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    page_size: Option<usize>,
    list_calls: Mutex<usize>,
    delete_calls: Mutex<Vec<Vec<String>>>,
    failing_keys: Mutex<HashSet<String>>,
    failing_prefixes: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cap every list page at `size` entries
    pub(crate) fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub(crate) fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub(crate) fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Make get/put/copy of `key` fail with a network error
    pub(crate) fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make listing `prefix` fail with an auth error
    pub(crate) fn fail_prefix(&self, prefix: &str) {
        self.failing_prefixes
            .lock()
            .unwrap()
            .insert(prefix.to_string());
    }

    pub(crate) fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub(crate) fn delete_calls(&self) -> Vec<Vec<String>> {
        self.delete_calls.lock().unwrap().clone()
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(Error::Network(format!("connection reset while handling {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, prefix: &str, options: ListOptions) -> Result<ListResult> {
        *self.list_calls.lock().unwrap() += 1;

        if self.failing_prefixes.lock().unwrap().contains(prefix) {
            return Err(Error::Auth(format!("AccessDenied listing {prefix}")));
        }

        let delimiter = if options.recursive {
            None
        } else {
            Some(options.delimiter.unwrap_or_else(|| "/".to_string()))
        };

        let objects = self.objects.lock().unwrap();
        let mut entries = Vec::new();
        let mut seen_prefixes = BTreeSet::new();

        for (key, data) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            let split = delimiter
                .as_deref()
                .and_then(|d| rest.find(d).map(|pos| pos + d.len()));
            match split {
                Some(end) => {
                    let common = format!("{prefix}{}", &rest[..end]);
                    if seen_prefixes.insert(common.clone()) {
                        entries.push(ObjectInfo::dir(common));
                    }
                }
                None => entries.push(ObjectInfo::file(key.clone(), data.len() as i64)),
            }
        }

        let start: usize = options
            .continuation_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let max_keys = options.max_keys.unwrap_or(1000).max(1) as usize;
        let limit = self.page_size.map_or(max_keys, |p| p.min(max_keys));
        let end = (start + limit).min(entries.len());
        let truncated = end < entries.len();

        Ok(ListResult {
            items: entries[start.min(end)..end].to_vec(),
            truncated,
            continuation_token: truncated.then(|| end.to_string()),
        })
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.check_key(key)?;
        self.get(key).ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        self.check_key(key)?;
        let mut info = ObjectInfo::file(key, data.len() as i64);
        info.content_type = content_type;
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(info)
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<ObjectInfo> {
        self.check_key(src_key)?;
        let data = self
            .get(src_key)
            .ok_or_else(|| Error::NotFound(src_key.to_string()))?;
        let info = ObjectInfo::file(dst_key, data.len() as i64);
        self.objects
            .lock()
            .unwrap()
            .insert(dst_key.to_string(), data);
        Ok(info)
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>> {
        self.delete_calls.lock().unwrap().push(keys.clone());
        let mut objects = self.objects.lock().unwrap();
        Ok(keys
            .into_iter()
            .filter(|k| objects.remove(k).is_some())
            .collect())
    }
}
