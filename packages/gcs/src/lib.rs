//! # remotepath-gcs
//!
//! Google Cloud Storage binding for [`RemotePath`](remotepath_core::RemotePath).
//!
//! A [`GcsPath`] is a remote path plus a shared handle to an [`ObjectStore`].
//! On top of the usual path algebra it can:
//!
//! - `glob(pattern)`: lazily list the objects under the path whose full key
//!   matches a shell-style pattern
//! - `open()`: download an object and read it from memory
//! - `download_url()`: format a media-download URL without any I/O
//!
//! ## Stores
//!
//! - [`GcsClient`]: the JSON API over a blocking reqwest client
//! - [`InMemoryStore`]: objects in a map, for tests and embedding
//!
//! The store is built once and injected; every path derived from another
//! shares it.
//!
//! ```rust
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! use remotepath_gcs::{GcsPath, InMemoryStore};
//!
//! let store = InMemoryStore::new()
//!     .with_object("imagery", "nearmap/a.tif", "tile a")
//!     .with_object("imagery", "nearmap/a.json", "{}");
//!
//! let dir = GcsPath::parse("gs://imagery/nearmap", Arc::new(store))?;
//! let tiles: Vec<GcsPath> = dir.glob("*.tif")?.collect::<Result<_, _>>()?;
//! assert_eq!(tiles.len(), 1);
//!
//! let mut body = String::new();
//! tiles[0].open()?.read_to_string(&mut body)?;
//! assert_eq!(body, "tile a");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Against the real service:
//!
//! ```ignore
//! use std::sync::Arc;
//! use remotepath_gcs::{GcsClient, GcsConfig, GcsPath};
//!
//! let config = GcsConfig::from_env()?
//!     .with_default_header("Authorization", format!("Bearer {}", token));
//! let store = Arc::new(GcsClient::from_config(&config)?);
//!
//! for tile in GcsPath::parse("gs://za-images/nearmap", store)?.glob("*.tif")? {
//!     println!("{}", tile?);
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

mod gcs_path;

pub use client::GcsClient;
pub use config::GcsConfig;
pub use error::{Error, ObjectAccessError};
pub use gcs_path::{GcsPath, Glob, ObjectReader};
pub use memory::{InMemoryStore, StoreRequest};
pub use store::{list_objects, DownloadHandle, Listing, ObjectPage, ObjectStore};

pub use remotepath_core::{GlobPattern, JoinOperand, PathError, RemotePath};
