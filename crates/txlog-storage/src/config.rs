use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::file::FileObjectStore;
use crate::memory::InMemoryObjectStore;
use crate::traits::ObjectStore;

/// How a local store claims the destination of `rename_if_not_exists`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStrategy {
    /// Hard-link the source onto the destination, then unlink the source.
    /// The link fails atomically if the destination exists.
    #[default]
    HardLink,
    /// Check the destination with `head`, then rename. Racy across
    /// processes; for single-writer setups and filesystems without hard
    /// links.
    CheckThenRename,
}

/// Selects and configures an object store backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// A directory tree on the local filesystem.
    Local {
        root: PathBuf,
        #[serde(default)]
        rename_strategy: RenameStrategy,
    },
    /// A process-local store; contents are lost on drop.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Local {
            root: PathBuf::from("."),
            rename_strategy: RenameStrategy::default(),
        }
    }
}

impl StoreConfig {
    /// A local store rooted at `root` with the default rename strategy.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::Local {
            root: root.into(),
            rename_strategy: RenameStrategy::default(),
        }
    }
}

/// Build the object store described by `config`.
pub fn open_object_store(config: &StoreConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        StoreConfig::Local {
            root,
            rename_strategy,
        } => {
            if root.as_os_str().is_empty() {
                return Err(StorageError::Config("local store root is empty".into()));
            }
            if root.exists() && !root.is_dir() {
                return Err(StorageError::Config(format!(
                    "local store root {} is not a directory",
                    root.display()
                )));
            }
            debug!(root = %root.display(), ?rename_strategy, "opening local object store");
            Ok(Arc::new(
                FileObjectStore::new(root).with_rename_strategy(*rename_strategy),
            ))
        }
        StoreConfig::Memory => {
            debug!("opening in-memory object store");
            Ok(Arc::new(InMemoryObjectStore::new()))
        }
    }
}
