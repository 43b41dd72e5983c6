//! Single-page in-memory ObjectStore for exercising the actions

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use s3h_core::{Error, ListOptions, ListResult, ObjectInfo, ObjectStore, Result};

#[derive(Default)]
pub(crate) struct FakeStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    kept_on_delete: Mutex<HashSet<String>>,
    failing_copies: Mutex<HashSet<String>>,
    delete_calls: Mutex<usize>,
}

impl FakeStore {
    pub(crate) fn with_keys(keys: &[&str]) -> Self {
        let store = Self::default();
        for key in keys {
            store
                .objects
                .lock()
                .unwrap()
                .insert(key.to_string(), key.as_bytes().to_vec());
        }
        store
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Leave `key` in place and leave it out of the delete confirmation
    pub(crate) fn keep_on_delete(&self, key: &str) {
        self.kept_on_delete.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn fail_copy(&self, key: &str) {
        self.failing_copies.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn delete_calls(&self) -> usize {
        *self.delete_calls.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_objects(&self, prefix: &str, options: ListOptions) -> Result<ListResult> {
        let objects = self.objects.lock().unwrap();
        let mut items = Vec::new();
        let mut dirs = BTreeSet::new();

        for (key, data) in objects.iter().filter(|(k, _)| k.starts_with(prefix)) {
            let rest = &key[prefix.len()..];
            match rest.find('/').filter(|_| !options.recursive) {
                Some(pos) => {
                    dirs.insert(format!("{prefix}{}", &rest[..=pos]));
                }
                None => items.push(ObjectInfo::file(key.clone(), data.len() as i64)),
            }
        }
        items.extend(dirs.into_iter().map(ObjectInfo::dir));

        Ok(ListResult {
            items,
            truncated: false,
            continuation_token: None,
        })
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let info = ObjectInfo::file(key, data.len() as i64);
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(info)
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<ObjectInfo> {
        if self.failing_copies.lock().unwrap().contains(src_key) {
            return Err(Error::Auth(format!("AccessDenied copying {src_key}")));
        }
        let data = self.get_object(src_key).await?;
        self.put_object(dst_key, data, None).await
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>> {
        *self.delete_calls.lock().unwrap() += 1;
        let kept = self.kept_on_delete.lock().unwrap();
        let mut objects = self.objects.lock().unwrap();
        Ok(keys
            .into_iter()
            .filter(|k| !kept.contains(k) && objects.remove(k).is_some())
            .collect())
    }
}
