use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::file::FileStateStore;
use crate::memory::InMemoryStateStore;
use crate::traits::StateStore;

/// Selects and configures a state store backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StateConfig {
    /// A process-local slot; lost on drop.
    #[default]
    Memory,
    /// A JSON file on the local filesystem.
    File { path: PathBuf },
}

/// Build the state store described by `config`.
pub fn open_state_store(config: &StateConfig) -> Result<Arc<dyn StateStore>> {
    match config {
        StateConfig::Memory => Ok(Arc::new(InMemoryStateStore::new())),
        StateConfig::File { path } => {
            if path.as_os_str().is_empty() || path.is_dir() {
                return Err(StateError::Config(format!(
                    "state file path {:?} is not a file location",
                    path
                )));
            }
            Ok(Arc::new(FileStateStore::new(path)))
        }
    }
}
