//! An in-process [`ObjectStore`] keeping objects in memory.
//!
//! Listing is lexicographic with a configurable page size, and every
//! request is recorded so tests can assert on what was fetched and when.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::{Error, ObjectAccessError};
use crate::store::{DownloadHandle, ObjectPage, ObjectStore};

/// Default number of keys per listing page, matching the GCS default.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// A request seen by an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    ListPage {
        bucket: String,
        prefix: String,
        page_token: Option<String>,
    },
    Fetch {
        bucket: String,
        key: String,
    },
}

type Buckets = BTreeMap<String, BTreeMap<String, Bytes>>;

/// Objects held in memory, shared between clones.
#[derive(Clone)]
pub struct InMemoryStore {
    buckets: Arc<Mutex<Buckets>>,
    page_size: usize,
    recorded_requests: Arc<Mutex<Vec<StoreRequest>>>,
    error_message: Arc<Mutex<Option<String>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            buckets: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
            recorded_requests: Arc::default(),
            error_message: Arc::default(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of keys per listing page (at least one).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add an object, builder style.
    pub fn with_object(self, bucket: &str, key: &str, body: impl Into<Bytes>) -> Self {
        self.insert(bucket, key, body);
        self
    }

    /// Add or replace an object.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        lock(&self.buckets)
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
    }

    /// Make every list and fetch request fail with `message`.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        *lock(&self.error_message) = Some(message.into());
        self
    }

    /// All requests seen so far, oldest first.
    pub fn recorded_requests(&self) -> Vec<StoreRequest> {
        lock(&self.recorded_requests).clone()
    }

    pub fn clear_recorded(&self) {
        lock(&self.recorded_requests).clear();
    }

    fn record(&self, request: StoreRequest) -> Result<(), Error> {
        lock(&self.recorded_requests).push(request);

        match lock(&self.error_message).clone() {
            Some(message) => Err(ObjectAccessError::Backend { message }.into()),
            None => Ok(()),
        }
    }
}

impl ObjectStore for InMemoryStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_token: Option<&str>,
    ) -> Result<ObjectPage, Error> {
        self.record(StoreRequest::ListPage {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            page_token: page_token.map(str::to_string),
        })?;

        let buckets = lock(&self.buckets);
        let Some(objects) = buckets.get(bucket) else {
            return Ok(ObjectPage::default());
        };

        // the page token is the last key of the previous page
        let start = match page_token {
            Some(token) => Bound::Excluded(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        let mut matching = objects
            .range((start, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_page_token = match (matching.next(), keys.last()) {
            (Some(_), Some(last)) => Some(last.clone()),
            _ => None,
        };

        Ok(ObjectPage {
            keys,
            next_page_token,
        })
    }

    fn download_handle(&self, bucket: &str, key: &str) -> Result<DownloadHandle, Error> {
        Ok(DownloadHandle {
            bucket: bucket.to_string(),
            key: key.to_string(),
            url: format!("memory://{}/{}", bucket, key),
        })
    }

    fn fetch(&self, handle: &DownloadHandle) -> Result<Bytes, Error> {
        self.record(StoreRequest::Fetch {
            bucket: handle.bucket.clone(),
            key: handle.key.clone(),
        })?;

        lock(&self.buckets)
            .get(&handle.bucket)
            .and_then(|objects| objects.get(&handle.key))
            .cloned()
            .ok_or_else(|| {
                ObjectAccessError::Status {
                    status: 404,
                    url: handle.url.clone(),
                    message: format!("No such object: {}/{}", handle.bucket, handle.key),
                }
                .into()
            })
    }
}
