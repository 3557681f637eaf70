use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::meta::ObjectMeta;
use crate::path::{Path, DELIMITER};
use crate::traits::ObjectStore;

#[derive(Clone, Debug)]
struct Entry {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// In-memory, key/value object store.
///
/// Intended for tests and embedding. Only leaf objects are stored; a
/// "directory" exists whenever some key lives below it, exactly as in a blob
/// store. `rename_if_not_exists` checks and moves under one write lock, so
/// it is atomic across threads.
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.read().values().map(|e| e.data.len() as u64).sum()
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Entry>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Entry>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_object_location(location: &Path) -> StorageResult<()> {
    if location.is_empty() || location.is_dir_like() {
        return Err(StorageError::InvalidPath {
            location: location.clone(),
            reason: "expected an object location, got a directory".into(),
        });
    }
    Ok(())
}

/// Newest modification time of any object below `dir`, if there is one.
fn implied_dir(map: &BTreeMap<String, Entry>, dir: &Path) -> Option<ObjectMeta> {
    let dir = dir.as_dir();
    if dir.is_empty() {
        return None;
    }
    map.range(dir.as_str().to_string()..)
        .take_while(|(key, _)| key.starts_with(dir.as_str()))
        .map(|(_, e)| e.last_modified)
        .max()
        .map(|mtime| ObjectMeta::directory(&dir, mtime))
}

fn check_not_root(location: &Path) -> StorageResult<()> {
    if location.is_empty() {
        return Err(StorageError::InvalidPath {
            location: location.clone(),
            reason: "the store root is not an object".into(),
        });
    }
    Ok(())
}

fn missing(location: &Path) -> StorageError {
    StorageError::ObjectDoesNotExist {
        location: location.clone(),
        source: None,
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, location: &Path, bytes: &[u8]) -> StorageResult<()> {
        check_object_location(location)?;
        let entry = Entry {
            data: Bytes::copy_from_slice(bytes),
            last_modified: Utc::now(),
        };
        self.write().insert(location.as_str().to_string(), entry);
        debug!(%location, len = bytes.len(), "put object");
        Ok(())
    }

    fn get(&self, location: &Path) -> StorageResult<Bytes> {
        check_not_root(location)?;
        let map = self.read();
        if let Some(entry) = map.get(location.as_str()) {
            return Ok(entry.data.clone());
        }
        match implied_dir(&map, location) {
            Some(meta) => Err(StorageError::ObjectIsDir { meta: Box::new(meta) }),
            None => Err(missing(location)),
        }
    }

    fn head(&self, location: &Path) -> StorageResult<ObjectMeta> {
        check_not_root(location)?;
        let map = self.read();
        if let Some(entry) = map.get(location.as_str()) {
            return Ok(ObjectMeta::object(
                location.clone(),
                entry.data.len() as u64,
                entry.last_modified,
            ));
        }
        match implied_dir(&map, location) {
            Some(meta) => Err(StorageError::ObjectIsDir { meta: Box::new(meta) }),
            None => Err(missing(location)),
        }
    }

    fn delete(&self, location: &Path) -> StorageResult<()> {
        match self.write().remove(location.as_str()) {
            Some(_) => {
                debug!(%location, "deleted object");
                Ok(())
            }
            None => Err(StorageError::DeleteObject {
                location: location.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no object at location"),
            }),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        check_object_location(to)?;
        let mut map = self.write();
        let entry = map.remove(from.as_str()).ok_or_else(|| missing(from))?;
        map.insert(to.as_str().to_string(), entry);
        debug!(%from, %to, "renamed object");
        Ok(())
    }

    fn rename_if_not_exists(&self, from: &Path, to: &Path) -> StorageResult<()> {
        check_object_location(to)?;
        let mut map = self.write();
        if map.contains_key(to.as_str()) || implied_dir(&map, to).is_some() {
            debug!(%from, %to, "commit slot already taken");
            return Err(StorageError::VersionAlreadyExists {
                location: to.clone(),
            });
        }
        let entry = map.remove(from.as_str()).ok_or_else(|| missing(from))?;
        map.insert(to.as_str().to_string(), entry);
        debug!(%from, %to, "renamed object (if not exists)");
        Ok(())
    }

    fn list(&self, prefix: &Path) -> StorageResult<Vec<ObjectMeta>> {
        let (dir, name_prefix) = prefix.split_prefix();
        let map = self.read();
        let mut out = Vec::new();
        let mut dirs: BTreeSet<String> = BTreeSet::new();

        for (key, entry) in map.range(dir.to_string()..) {
            let Some(rest) = key.strip_prefix(dir) else {
                break;
            };
            let first = rest.split(DELIMITER).next().unwrap_or_default();
            if !first.starts_with(name_prefix) {
                continue;
            }
            // Every intermediate prefix below `dir` is a directory entry.
            for (idx, _) in rest.match_indices(DELIMITER) {
                dirs.insert(format!("{dir}{}", &rest[..=idx]));
            }
            out.push(ObjectMeta::object(
                Path::new(key),
                entry.data.len() as u64,
                entry.last_modified,
            ));
        }

        if !dir.is_empty() && name_prefix.is_empty() && !out.is_empty() {
            dirs.insert(dir.to_string());
        }
        for d in dirs {
            if let Some(meta) = implied_dir(&map, &Path::new(d)) {
                out.push(meta);
            }
        }

        debug!(%prefix, count = out.len(), "listed objects");
        Ok(out)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
