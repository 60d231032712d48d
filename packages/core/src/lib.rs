//! # remotepath-core
//!
//! Path values for objects in a cloud object store.
//!
//! This layer is pure data: no I/O, no clients.
//! - `RemotePath`: `scheme://bucket/segment/...` with path algebra
//!   (join, parent, parents, name, stem, suffix)
//! - `JoinOperand`: what can be joined onto a path
//! - `GlobPattern`: shell-style wildcards matched against whole keys
//! - `PathError`: everything that can go wrong above
//!
//! Provider crates bind a `RemotePath` to a storage client.
//!
//! # Example
//!
//! ```rust
//! use remotepath_core::{remote_path, RemotePath};
//!
//! let tile = remote_path!("gs://imagery/nearmap/tile.tif");
//! let sibling = tile.parent().join("tile.json").unwrap();
//! assert_eq!(sibling.to_string(), "gs://imagery/nearmap/tile.json");
//! assert_eq!(tile.suffix().unwrap(), ".tif");
//! ```

mod error;
mod path;
mod pattern;

pub use error::PathError;
pub use path::{parse_segments, JoinOperand, Parents, RemotePath};
pub use pattern::GlobPattern;
