//! Remote object paths of the form `scheme://bucket/segment/segment`.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Div;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

const SEPARATOR: char = '/';
const SCHEME_DELIMITER: &str = "://";

/// Split an object key into normalized segments.
///
/// Empty components and `.` are dropped. `..` is kept verbatim; object
/// stores have no notion of a parent directory.
pub fn parse_segments(key: &str) -> Vec<String> {
    key.split(SEPARATOR)
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect()
}

/// Strip a `//host` authority from a scheme-less operand.
fn relative_key(s: &str) -> &str {
    match s.strip_prefix("//") {
        Some(rest) => rest.find(SEPARATOR).map_or("", |i| &rest[i..]),
        None => s,
    }
}

/// Check a URI scheme token: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn validate_scheme(input: &str, scheme: &str) -> Result<(), PathError> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err(PathError::malformed(input, "missing scheme")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(PathError::malformed(
                input,
                "scheme must start with a letter",
            ))
        }
        Some(_) => {}
    }

    for c in chars {
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return Err(PathError::malformed(
                input,
                format!("invalid character '{}' in scheme", c),
            ));
        }
    }

    Ok(())
}

/// The location of an object (or a prefix of objects) in a bucket.
///
/// A `RemotePath` is an immutable value: every operation that derives a new
/// path allocates a new one and leaves `self` untouched. Its string form is
/// `scheme://bucket/seg1/seg2`, and parsing that string yields an equal
/// value.
///
/// # Examples
///
/// ```rust
/// use remotepath_core::RemotePath;
///
/// let path = RemotePath::parse("gs://bucket/a/b/c.tif").unwrap();
/// assert_eq!(path.bucket(), "bucket");
/// assert_eq!(path.name().unwrap(), "c.tif");
/// assert_eq!(path.parent().to_string(), "gs://bucket/a/b");
/// ```
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RemotePath {
    scheme: String,
    bucket: String,
    segments: Vec<String>,
}

impl RemotePath {
    /// Parse a `scheme://bucket/key` string.
    ///
    /// The bucket is everything between `://` and the next `/`. The rest is
    /// the key, split on `/` with empty and `.` components dropped. `?` and
    /// `#` have no special meaning; they are legal in object names.
    ///
    /// Fails if the scheme or the bucket is missing or empty.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let (scheme, rest) = s
            .split_once(SCHEME_DELIMITER)
            .ok_or_else(|| PathError::malformed(s, "missing scheme"))?;
        validate_scheme(s, scheme)?;

        let (bucket, key) = rest.split_once(SEPARATOR).unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(PathError::malformed(s, "missing bucket"));
        }

        Ok(RemotePath {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            segments: parse_segments(key),
        })
    }

    /// Build a path from its parts, validating scheme and bucket.
    pub fn new(scheme: &str, bucket: &str, key: &str) -> Result<Self, PathError> {
        let input = format!("{}{}{}/{}", scheme, SCHEME_DELIMITER, bucket, key);
        validate_scheme(&input, scheme)?;
        if bucket.is_empty() {
            return Err(PathError::malformed(&input, "missing bucket"));
        }
        if bucket.contains(SEPARATOR) {
            return Err(PathError::malformed(&input, "bucket must not contain '/'"));
        }

        Ok(RemotePath {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            segments: parse_segments(key),
        })
    }

    fn derive(&self, segments: Vec<String>) -> Self {
        RemotePath {
            scheme: self.scheme.clone(),
            bucket: self.bucket.clone(),
            segments,
        }
    }

    fn truncated(&self, len: usize) -> Self {
        self.derive(self.segments[..len].to_vec())
    }

    fn empty_error(&self) -> PathError {
        PathError::EmptyPath {
            path: self.to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The object key: segments joined by `/`, without a leading or
    /// trailing slash. Empty at the bucket root.
    pub fn key(&self) -> String {
        self.segments.join("/")
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the bucket root (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A path in the same bucket whose segments come from a provider key.
    #[must_use]
    pub fn with_key(&self, key: &str) -> Self {
        self.derive(parse_segments(key))
    }

    /// Append `other`'s segments to this path's, keeping this path's scheme
    /// and bucket.
    ///
    /// A string operand that starts with a valid scheme followed by `://` is
    /// parsed as a full remote path and only its segments are used. Any other
    /// string is a relative key; a leading `//host` authority is dropped.
    pub fn join<'a>(&self, other: impl Into<JoinOperand<'a>>) -> Result<Self, PathError> {
        let tail = match other.into() {
            JoinOperand::Raw(s) => match s.split_once(SCHEME_DELIMITER) {
                Some((scheme, _)) if validate_scheme(s, scheme).is_ok() => {
                    RemotePath::parse(s)?.segments
                }
                _ => parse_segments(relative_key(s)),
            },
            JoinOperand::Path(p) => p.segments.clone(),
        };

        let mut segments = self.segments.clone();
        segments.extend(tail);
        Ok(self.derive(segments))
    }

    /// The path without its last segment. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        self.truncated(self.segments.len().saturating_sub(1))
    }

    /// Successive parents, nearest first, ending with the bucket root.
    ///
    /// Yields one path per segment. Each call starts a fresh iterator.
    pub fn parents(&self) -> Parents<'_> {
        Parents {
            path: self,
            remaining: self.segments.len(),
        }
    }

    /// The last segment.
    pub fn name(&self) -> Result<&str, PathError> {
        self.segments
            .last()
            .map(String::as_str)
            .ok_or_else(|| self.empty_error())
    }

    /// The name up to its first `.`: the stem of `a.b.c` is `a`.
    pub fn stem(&self) -> Result<&str, PathError> {
        let name = self.name()?;
        Ok(name.split_once('.').map_or(name, |(stem, _)| stem))
    }

    /// `.` followed by whatever comes after the last `.` of the name.
    ///
    /// A name without a dot gives `.` plus the whole name.
    pub fn suffix(&self) -> Result<String, PathError> {
        let name = self.name()?;
        let ext = name.rsplit_once('.').map_or(name, |(_, ext)| ext);
        Ok(format!(".{}", ext))
    }

    pub fn suffixes(&self) -> Result<Vec<String>, PathError> {
        Err(PathError::NotImplemented {
            feature: "suffixes",
        })
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}/{}",
            self.scheme,
            SCHEME_DELIMITER,
            self.bucket,
            self.segments.join("/")
        )
    }
}

impl fmt::Debug for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemotePath('{}')", self)
    }
}

impl FromStr for RemotePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RemotePath::parse(s)
    }
}

impl Serialize for RemotePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RemotePath {
    fn deserialize<D>(deserializer: D) -> Result<RemotePath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        RemotePath::parse(&s).map_err(D::Error::custom)
    }
}

impl<'a> Div<&'a str> for &RemotePath {
    type Output = Result<RemotePath, PathError>;

    fn div(self, rhs: &'a str) -> Self::Output {
        self.join(rhs)
    }
}

impl<'a> Div<&'a RemotePath> for &RemotePath {
    type Output = Result<RemotePath, PathError>;

    fn div(self, rhs: &'a RemotePath) -> Self::Output {
        self.join(rhs)
    }
}

/// The right-hand side of [`RemotePath::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperand<'a> {
    /// A string: a full remote path or a relative key.
    Raw(&'a str),
    /// An existing path; only its segments are used.
    Path(&'a RemotePath),
}

impl<'a> From<&'a str> for JoinOperand<'a> {
    fn from(s: &'a str) -> Self {
        JoinOperand::Raw(s)
    }
}

impl<'a> From<&'a String> for JoinOperand<'a> {
    fn from(s: &'a String) -> Self {
        JoinOperand::Raw(s.as_str())
    }
}

impl<'a> From<&'a RemotePath> for JoinOperand<'a> {
    fn from(p: &'a RemotePath) -> Self {
        JoinOperand::Path(p)
    }
}

/// Operands arriving as JSON (config files, request bodies). Only strings
/// can name a path.
impl<'a> TryFrom<&'a serde_json::Value> for JoinOperand<'a> {
    type Error = PathError;

    fn try_from(value: &'a serde_json::Value) -> Result<Self, Self::Error> {
        let kind = match value {
            serde_json::Value::String(s) => return Ok(JoinOperand::Raw(s)),
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Err(PathError::UnsupportedOperand {
            kind: kind.to_string(),
        })
    }
}

/// Iterator returned by [`RemotePath::parents`].
#[derive(Debug, Clone)]
pub struct Parents<'a> {
    path: &'a RemotePath,
    remaining: usize,
}

impl Iterator for Parents<'_> {
    type Item = RemotePath;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.path.truncated(self.remaining))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Parents<'_> {}

impl FusedIterator for Parents<'_> {}

/// Parse a remote path literal, panicking if it is invalid.
///
/// # Example
///
/// ```rust
/// use remotepath_core::remote_path;
///
/// let p = remote_path!("gs://bucket/a/b");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! remote_path {
    ($s:expr) => {
        $crate::RemotePath::parse($s).expect("invalid remote path literal")
    };
}
