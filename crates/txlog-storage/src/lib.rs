//! Object storage for an append-only transaction log.
//!
//! A table log is a sequence of numbered commit files. Writers agree on that
//! sequence through one primitive, [`ObjectStore::rename_if_not_exists`]: a
//! writer stages its commit somewhere private and renames it onto the next
//! commit slot. Exactly one writer wins each slot; everyone else gets
//! [`StorageError::VersionAlreadyExists`] and retries at a higher version.
//! Retrying is the caller's business, never the store's.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FileObjectStore`] -- a directory tree on the local filesystem
//! - [`InMemoryObjectStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! [`open_object_store`] picks one from a [`StoreConfig`].
//!
//! # Conventions
//!
//! 1. Locations are `/`-separated [`Path`]s relative to the store root.
//! 2. Directories are reported like blob-store common prefixes: a trailing
//!    `/` and size 0.
//! 3. Listing a prefix whose directory does not exist yields nothing, not an
//!    error.
//! 4. Errors are matched by variant; the wrapped cause is for diagnostics.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod meta;
pub mod path;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{open_object_store, RenameStrategy, StoreConfig};
pub use error::{StorageError, StorageResult};
pub use file::FileObjectStore;
pub use memory::InMemoryObjectStore;
pub use meta::ObjectMeta;
pub use path::Path;
pub use traits::ObjectStore;
