use bytes::Bytes;

use crate::error::StorageResult;
use crate::meta::ObjectMeta;
use crate::path::Path;

/// Path-addressed object store with a conditional rename.
///
/// All implementations must satisfy these invariants:
/// - `rename_if_not_exists` is the only operation ordered across callers:
///   for a fixed destination at most one concurrent call succeeds, and the
///   destination then holds the winner's content.
/// - Directory entries end with `/` and have size 0.
/// - Locations returned by `head` and `list` are store-relative.
/// - The store never retries and never interprets object contents.
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `location`, creating any
    /// intermediate containers.
    fn put(&self, location: &Path, bytes: &[u8]) -> StorageResult<()>;

    /// Read the full content of an object.
    ///
    /// Fails with `ObjectDoesNotExist` if nothing is stored there, including
    /// when an ancestor of `location` is an object. The store root is not an
    /// object and is rejected with `InvalidPath`.
    fn get(&self, location: &Path) -> StorageResult<Bytes>;

    /// Inspect an object without reading it.
    ///
    /// Fails with `ObjectDoesNotExist` if absent, or with `ObjectIsDir`
    /// (carrying the directory's metadata) if `location` is a container.
    /// The empty location is `InvalidPath`, as for [`get`](Self::get).
    fn head(&self, location: &Path) -> StorageResult<ObjectMeta>;

    /// Remove an object. Absence is reported as `DeleteObject`.
    fn delete(&self, location: &Path) -> StorageResult<()>;

    /// Move an object, overwriting `to` if present.
    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()>;

    /// Move an object only if nothing exists at `to`.
    ///
    /// Losing callers get `VersionAlreadyExists` and `from` is left in
    /// place. This is the primitive a committer uses to claim a log slot:
    /// stage the content somewhere private, then rename it onto the slot.
    fn rename_if_not_exists(&self, from: &Path, to: &Path) -> StorageResult<()>;

    /// List every entry whose location starts with `prefix`, recursing into
    /// directories and including the directories themselves.
    ///
    /// Order is unspecified. A missing directory yields an empty list.
    fn list(&self, prefix: &Path) -> StorageResult<Vec<ObjectMeta>>;

    /// Check whether anything, object or directory, exists at `location`.
    fn exists(&self, location: &Path) -> StorageResult<bool> {
        match self.head(location) {
            Ok(_) => Ok(true),
            Err(e) if e.is_dir() => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
