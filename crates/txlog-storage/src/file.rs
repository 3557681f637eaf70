//! Local filesystem object store.
//!
//! [`FileObjectStore`] maps every [`Path`] onto a file under a root
//! directory. Directories are real filesystem directories, but they are
//! reported the way a blob store reports common prefixes: trailing `/`,
//! size 0.

use std::fs;
use std::io;
use std::path::{Path as FsPath, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::RenameStrategy;
use crate::error::{StorageError, StorageResult};
use crate::meta::ObjectMeta;
use crate::path::Path;
use crate::traits::ObjectStore;

/// An [`ObjectStore`] backed by a directory tree.
#[derive(Clone, Debug)]
pub struct FileObjectStore {
    /// Root directory on the host filesystem.
    root: PathBuf,
    rename_strategy: RenameStrategy,
}

impl FileObjectStore {
    /// Create a store rooted at `root`. The directory is created lazily by
    /// the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rename_strategy: RenameStrategy::default(),
        }
    }

    /// Choose how `rename_if_not_exists` claims its destination.
    pub fn with_rename_strategy(mut self, strategy: RenameStrategy) -> Self {
        self.rename_strategy = strategy;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &FsPath {
        &self.root
    }

    /// The active conditional rename strategy.
    pub fn rename_strategy(&self) -> RenameStrategy {
        self.rename_strategy
    }

    /// Map a store path onto the host filesystem.
    ///
    /// `..` components are rejected so no location escapes the root.
    fn resolve(&self, location: &Path) -> StorageResult<PathBuf> {
        let mut full = self.root.clone();
        for part in location.parts() {
            if part == ".." {
                return Err(StorageError::InvalidPath {
                    location: location.clone(),
                    reason: "parent directory components are not allowed".into(),
                });
            }
            full.push(part);
        }
        Ok(full)
    }

    /// Like [`resolve`](Self::resolve), for locations that must name a leaf.
    fn resolve_object(&self, location: &Path) -> StorageResult<PathBuf> {
        if location.is_empty() || location.is_dir_like() {
            return Err(StorageError::InvalidPath {
                location: location.clone(),
                reason: "expected an object location, got a directory".into(),
            });
        }
        self.resolve(location)
    }

    /// Like [`resolve`](Self::resolve), for `get` and `head`. The store root
    /// has no directory-style location of its own, so it is rejected.
    fn resolve_existing(&self, location: &Path) -> StorageResult<PathBuf> {
        if location.is_empty() {
            return Err(StorageError::InvalidPath {
                location: location.clone(),
                reason: "the store root is not an object".into(),
            });
        }
        self.resolve(location)
    }

    /// Claim `to` with a hard link, then drop the `from` name.
    ///
    /// `link(2)` fails with `EEXIST` if anything is at `to`, so two
    /// processes racing on the same slot cannot both win.
    fn link_then_unlink(&self, from: &Path, to: &Path) -> StorageResult<()> {
        let source = self.resolve_object(from)?;
        let target = self.resolve_object(to)?;

        match fs::hard_link(&source, &target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(%from, %to, "commit slot already taken");
                return Err(StorageError::VersionAlreadyExists {
                    location: to.clone(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(from, e));
            }
            Err(e) => return Err(StorageError::io(from, e)),
        }

        // The slot is ours at this point; a leftover staging name is only
        // garbage, not a failed claim.
        if let Err(e) = fs::remove_file(&source) {
            warn!(%from, %to, error = %e, "claimed slot but could not remove staging object");
        }
        debug!(%from, %to, "renamed object (if not exists)");
        Ok(())
    }

    /// Existence check followed by a plain rename.
    ///
    /// Not atomic across processes: another writer can create `to` between
    /// the two calls. Only safe with a single writer.
    fn check_then_rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        self.resolve_object(to)?;
        match self.head(to) {
            Err(e) if e.is_not_found() => {}
            // Anything other than a clean "absent", including a directory or
            // an unreadable entry, counts as taken.
            _ => {
                debug!(%from, %to, "commit slot already taken");
                return Err(StorageError::VersionAlreadyExists {
                    location: to.clone(),
                });
            }
        }
        self.rename(from, to)
    }

    fn list_error(prefix: &Path, source: impl std::error::Error + Send + Sync + 'static) -> StorageError {
        StorageError::ListObjects {
            prefix: prefix.clone(),
            source: Box::new(source),
        }
    }
}

/// `ENOTDIR` on Unix.
#[cfg(unix)]
const NOT_A_DIRECTORY: i32 = 20;

/// Whether `e` means nothing is stored at the location: either the entry is
/// missing or one of its ancestors is a regular file.
fn is_absent(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::NotFound {
        return true;
    }
    #[cfg(unix)]
    if e.raw_os_error() == Some(NOT_A_DIRECTORY) {
        return true;
    }
    false
}

fn modified(metadata: &fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .into()
}

/// Store-relative location of `entry`, which lives below `full_dir`, the
/// host directory that `dir` resolves to.
fn relative_location(dir: &Path, full_dir: &FsPath, entry: &FsPath) -> Option<Path> {
    let rel = entry.strip_prefix(full_dir).ok()?;
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Some(dir.join(&Path::new(joined)))
}

impl ObjectStore for FileObjectStore {
    fn put(&self, location: &Path, bytes: &[u8]) -> StorageResult<()> {
        let path = self.resolve_object(location)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(location, e))?;
        }
        fs::write(&path, bytes).map_err(|e| StorageError::io(location, e))?;
        debug!(%location, len = bytes.len(), "put object");
        Ok(())
    }

    fn get(&self, location: &Path) -> StorageResult<Bytes> {
        let path = self.resolve_existing(location)?;
        match fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if is_absent(&e) => Err(StorageError::not_found(location, e)),
            Err(e) => match fs::metadata(&path) {
                Ok(md) if md.is_dir() => Err(StorageError::ObjectIsDir {
                    meta: Box::new(ObjectMeta::directory(location, modified(&md))),
                }),
                _ => Err(StorageError::io(location, e)),
            },
        }
    }

    fn head(&self, location: &Path) -> StorageResult<ObjectMeta> {
        let path = self.resolve_existing(location)?;
        let md = fs::metadata(&path).map_err(|e| {
            if is_absent(&e) {
                StorageError::not_found(location, e)
            } else {
                StorageError::io(location, e)
            }
        })?;

        if md.is_dir() {
            return Err(StorageError::ObjectIsDir {
                meta: Box::new(ObjectMeta::directory(location, modified(&md))),
            });
        }

        let leaf = Path::new(location.as_str().trim_end_matches('/'));
        Ok(ObjectMeta::object(leaf, md.len(), modified(&md)))
    }

    fn delete(&self, location: &Path) -> StorageResult<()> {
        let path = self.resolve(location)?;
        fs::remove_file(&path).map_err(|source| StorageError::DeleteObject {
            location: location.clone(),
            source,
        })?;
        debug!(%location, "deleted object");
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        fs::rename(&source, &target).map_err(|e| StorageError::not_found(from, e))?;
        debug!(%from, %to, "renamed object");
        Ok(())
    }

    fn rename_if_not_exists(&self, from: &Path, to: &Path) -> StorageResult<()> {
        match self.rename_strategy {
            RenameStrategy::HardLink => self.link_then_unlink(from, to),
            RenameStrategy::CheckThenRename => self.check_then_rename(from, to),
        }
    }

    fn list(&self, prefix: &Path) -> StorageResult<Vec<ObjectMeta>> {
        let (dir, name_prefix) = prefix.split_prefix();
        let dir = Path::new(dir);
        let full_dir = self.resolve(&dir)?;
        let mut out = Vec::new();

        // Only first-level names are matched against the prefix; everything
        // below a matching directory is included.
        let walker = WalkDir::new(&full_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() > 1 || entry.file_name().to_string_lossy().starts_with(name_prefix)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let vanished = e
                        .io_error()
                        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound);
                    if vanished && e.depth() == 0 {
                        // The directory itself is missing: nothing to list.
                        break;
                    }
                    if vanished {
                        debug!(%prefix, path = ?e.path(), "entry vanished during listing");
                        continue;
                    }
                    return Err(Self::list_error(prefix, e));
                }
            };

            let md = match entry.metadata() {
                Ok(md) => md,
                Err(e)
                    if e.io_error()
                        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound) =>
                {
                    continue;
                }
                Err(e) => return Err(Self::list_error(prefix, e)),
            };

            let Some(location) = relative_location(&dir, &full_dir, entry.path()) else {
                warn!(path = ?entry.path(), "listed entry outside the store root; skipping");
                continue;
            };

            if entry.file_type().is_dir() {
                out.push(ObjectMeta::directory(&location, modified(&md)));
            } else {
                out.push(ObjectMeta::object(location, md.len(), modified(&md)));
            }
        }

        // A pure directory prefix lists the directory itself too, like a
        // common prefix in a blob-store listing.
        if !dir.is_empty() && name_prefix.is_empty() {
            match fs::metadata(&full_dir) {
                Ok(md) if md.is_dir() => out.push(ObjectMeta::directory(&dir, modified(&md))),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Self::list_error(prefix, e)),
            }
        }

        debug!(%prefix, count = out.len(), "listed objects");
        Ok(out)
    }
}
