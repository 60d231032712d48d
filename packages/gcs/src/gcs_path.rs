//! Paths bound to a storage client.

use std::fmt;
use std::io::Cursor;
use std::iter::FusedIterator;
use std::sync::Arc;

use bytes::Bytes;
use remotepath_core::{GlobPattern, JoinOperand, RemotePath};

use crate::error::Error;
use crate::store::{list_objects, Listing, ObjectStore};

/// The fully buffered body of an object. Implements `Read`, `BufRead`
/// and `Seek`.
pub type ObjectReader = Cursor<Bytes>;

/// A [`RemotePath`] that can list and read what it points at.
///
/// Every path derived from this one (by `join`, `parent`, `parents` or
/// `glob`) shares the same store handle. Equality ignores the store.
#[derive(Clone)]
pub struct GcsPath {
    path: RemotePath,
    store: Arc<dyn ObjectStore>,
}

impl GcsPath {
    pub fn new(path: RemotePath, store: Arc<dyn ObjectStore>) -> Self {
        Self { path, store }
    }

    pub fn parse(s: &str, store: Arc<dyn ObjectStore>) -> Result<Self, Error> {
        Ok(Self::new(RemotePath::parse(s)?, store))
    }

    fn derive(&self, path: RemotePath) -> Self {
        Self {
            path,
            store: Arc::clone(&self.store),
        }
    }

    pub fn as_path(&self) -> &RemotePath {
        &self.path
    }

    pub fn into_path(self) -> RemotePath {
        self.path
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn bucket(&self) -> &str {
        self.path.bucket()
    }

    pub fn key(&self) -> String {
        self.path.key()
    }

    pub fn join<'a>(&self, other: impl Into<JoinOperand<'a>>) -> Result<Self, Error> {
        Ok(self.derive(self.path.join(other)?))
    }

    #[must_use]
    pub fn parent(&self) -> Self {
        self.derive(self.path.parent())
    }

    pub fn parents(&self) -> impl ExactSizeIterator<Item = GcsPath> + '_ {
        self.path.parents().map(move |p| self.derive(p))
    }

    pub fn name(&self) -> Result<&str, Error> {
        Ok(self.path.name()?)
    }

    pub fn stem(&self) -> Result<&str, Error> {
        Ok(self.path.stem()?)
    }

    pub fn suffix(&self) -> Result<String, Error> {
        Ok(self.path.suffix()?)
    }

    pub fn suffixes(&self) -> Result<Vec<String>, Error> {
        Ok(self.path.suffixes()?)
    }

    /// Objects under this path whose full key matches `pattern`.
    ///
    /// Lists every key starting with [`key`](Self::key) (note: `dir` also
    /// covers `dir2/...`) and keeps those the pattern matches. The pattern
    /// is applied to the whole key, not the last segment, so `*.tif` finds
    /// `dir/sub/a.tif`. Pages are fetched as the iterator is consumed.
    pub fn glob(&self, pattern: &str) -> Result<Glob, Error> {
        let pattern = GlobPattern::new(pattern)?;
        let listing = list_objects(Arc::clone(&self.store), self.bucket(), &self.key());

        Ok(Glob {
            origin: self.clone(),
            pattern,
            listing,
        })
    }

    /// Download the object in one request and return its bytes.
    ///
    /// A missing object is an error, never an empty reader.
    pub fn open(&self) -> Result<ObjectReader, Error> {
        self.path.name()?;

        let handle = self.store.download_handle(self.bucket(), &self.key())?;
        log::debug!("opening {} via {}", self.path, handle.url);
        let body = self.store.fetch(&handle)?;

        Ok(Cursor::new(body))
    }

    /// Direct media-download URL. Pure formatting: the key is not encoded
    /// and nothing checks that the object exists.
    pub fn download_url(&self) -> String {
        format!(
            "https://storage.googleapis.com/download/storage/v1/{}/{}?alt=media",
            self.bucket(),
            self.key()
        )
    }

    pub fn public_url(&self) -> Result<String, Error> {
        Err(Error::NotImplemented {
            feature: "public_url",
        })
    }
}

impl PartialEq for GcsPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for GcsPath {}

impl fmt::Display for GcsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl fmt::Debug for GcsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcsPath('{}')", self.path)
    }
}

impl AsRef<RemotePath> for GcsPath {
    fn as_ref(&self) -> &RemotePath {
        &self.path
    }
}

impl<'a> From<&'a GcsPath> for JoinOperand<'a> {
    fn from(p: &'a GcsPath) -> Self {
        JoinOperand::Path(&p.path)
    }
}

/// Iterator returned by [`GcsPath::glob`].
///
/// Yields matches in listing order. A listing failure is yielded once as
/// an `Err`, after which the iterator is exhausted. Dropping it early
/// leaves the remaining pages unrequested.
pub struct Glob {
    origin: GcsPath,
    pattern: GlobPattern,
    listing: Listing,
}

impl Glob {
    pub fn pattern(&self) -> &GlobPattern {
        &self.pattern
    }
}

impl Iterator for Glob {
    type Item = Result<GcsPath, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.listing.by_ref() {
            match entry {
                Ok(key) if self.pattern.matches(&key) => {
                    log::trace!("{} matched {}", self.pattern.as_str(), key);
                    let path = self.origin.path.with_key(&key);
                    return Some(Ok(self.origin.derive(path)));
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl FusedIterator for Glob {}
