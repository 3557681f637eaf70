use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::Path;

/// Descriptive metadata for an object, as returned by `head` and `list`.
///
/// Directory entries follow blob-store listing conventions: their location
/// ends with `/` and their size is always 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Store-relative location of the object.
    pub location: Path,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

impl ObjectMeta {
    /// Metadata for a leaf object.
    pub fn object(location: Path, size: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            location,
            size,
            last_modified,
        }
    }

    /// Metadata for a directory entry: trailing separator, size 0.
    pub fn directory(location: &Path, last_modified: DateTime<Utc>) -> Self {
        Self {
            location: location.as_dir(),
            size: 0,
            last_modified,
        }
    }

    /// Returns `true` if this entry stands for a directory.
    pub fn is_dir(&self) -> bool {
        self.location.is_dir_like()
    }
}
