//! The storage capability a provider-bound path needs.
//!
//! This trait is the seam between path semantics and the network. The
//! production implementation is [`GcsClient`](crate::GcsClient); tests and
//! embedders can use [`InMemoryStore`](crate::InMemoryStore) or their own.

use std::iter::FusedIterator;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Error;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Object keys in listing order.
    pub keys: Vec<String>,

    /// Token for the next page, `None` on the last page.
    pub next_page_token: Option<String>,
}

/// A reference usable for a single GET of an object's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHandle {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Read-only access to a bucket/object store.
///
/// One instance is shared by every path bound to it, so implementations
/// must be usable from several threads.
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of keys starting with `prefix`.
    ///
    /// `page_token` is `None` for the first page and the previous page's
    /// `next_page_token` afterwards.
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        page_token: Option<&str>,
    ) -> Result<ObjectPage, Error>;

    /// Resolve a handle for downloading `key`. Does not check existence.
    fn download_handle(&self, bucket: &str, key: &str) -> Result<DownloadHandle, Error>;

    /// Perform one GET against a handle and return the whole body.
    fn fetch(&self, handle: &DownloadHandle) -> Result<Bytes, Error>;
}

/// List every key under `prefix`, one page at a time.
///
/// Pages are requested only when the previous one has been consumed.
pub fn list_objects(store: Arc<dyn ObjectStore>, bucket: &str, prefix: &str) -> Listing {
    Listing {
        store,
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        page: Vec::new().into_iter(),
        state: ListingState::Start,
    }
}

enum ListingState {
    Start,
    Next(String),
    Done,
}

/// Iterator returned by [`list_objects`].
///
/// A failed page is yielded as an `Err` and ends the listing.
pub struct Listing {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    page: std::vec::IntoIter<String>,
    state: ListingState,
}

impl Iterator for Listing {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.page.next() {
                return Some(Ok(key));
            }

            let token = match std::mem::replace(&mut self.state, ListingState::Done) {
                ListingState::Done => return None,
                ListingState::Start => None,
                ListingState::Next(token) => Some(token),
            };

            log::debug!(
                "listing bucket {} prefix {:?} (page token {:?})",
                self.bucket,
                self.prefix,
                token
            );
            match self
                .store
                .list_page(&self.bucket, &self.prefix, token.as_deref())
            {
                Ok(page) => {
                    if let Some(next) = page.next_page_token.filter(|t| !t.is_empty()) {
                        self.state = ListingState::Next(next);
                    }
                    self.page = page.keys.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl FusedIterator for Listing {}
