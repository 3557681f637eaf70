use std::io;

use crate::meta::ObjectMeta;
use crate::path::Path;

/// Errors from object store operations.
///
/// Callers match on the variant; the wrapped `source` is kept for
/// diagnostics only.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Nothing exists at the requested location.
    #[error("object does not exist: {location}")]
    ObjectDoesNotExist {
        location: Path,
        #[source]
        source: Option<io::Error>,
    },

    /// The location resolves to a container, not a leaf object.
    ///
    /// The metadata of the container is still attached.
    #[error("object is a directory: {}", .meta.location)]
    ObjectIsDir { meta: Box<ObjectMeta> },

    /// The destination of a conditional rename is already taken.
    #[error("version already exists: object at {location} already exists")]
    VersionAlreadyExists { location: Path },

    /// Removing an object failed.
    #[error("failed to delete object {location}")]
    DeleteObject {
        location: Path,
        #[source]
        source: io::Error,
    },

    /// Enumerating objects under a prefix failed.
    #[error("failed to list objects under '{prefix}'")]
    ListObjects {
        prefix: Path,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The path cannot be mapped onto this backend.
    #[error("invalid path '{location}': {reason}")]
    InvalidPath { location: Path, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error on {location}")]
    Io {
        location: Path,
        #[source]
        source: io::Error,
    },

    /// Store configuration is unusable.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StorageError {
    pub(crate) fn not_found(location: &Path, source: io::Error) -> Self {
        Self::ObjectDoesNotExist {
            location: location.clone(),
            source: Some(source),
        }
    }

    pub(crate) fn io(location: &Path, source: io::Error) -> Self {
        Self::Io {
            location: location.clone(),
            source,
        }
    }

    /// Returns `true` for [`StorageError::ObjectDoesNotExist`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectDoesNotExist { .. })
    }

    /// Returns `true` when a conditional rename lost to an existing object.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionAlreadyExists { .. })
    }

    /// Returns `true` for [`StorageError::ObjectIsDir`].
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::ObjectIsDir { .. })
    }

    /// Metadata attached to an [`StorageError::ObjectIsDir`] error.
    pub fn dir_meta(&self) -> Option<&ObjectMeta> {
        match self {
            Self::ObjectIsDir { meta } => Some(meta),
            _ => None,
        }
    }
}

/// Result alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;
