//! File-backed state store.
//!
//! The state is a small JSON document, `{"version": N}`. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! target, so a reader sees either the old state or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StateError};
use crate::state::CommitState;
use crate::traits::StateStore;

/// A [`StateStore`] persisted as a JSON file.
#[derive(Clone, Debug)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Use the file at `path`. It does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn get(&self) -> Result<CommitState> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StateError::StateIsEmpty),
            Err(e) => return Err(StateError::read(e)),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(StateError::StateIsEmpty);
        }
        serde_json::from_slice(&data).map_err(StateError::read)
    }

    fn put(&self, state: CommitState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(StateError::write)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(StateError::write)?;
        serde_json::to_writer(&mut tmp, &state).map_err(StateError::write)?;
        tmp.flush().map_err(StateError::write)?;
        tmp.as_file().sync_all().map_err(StateError::write)?;
        tmp.persist(&self.path).map_err(|e| StateError::write(e.error))?;

        debug!(path = %self.path.display(), version = state.version, "recorded commit state");
        Ok(())
    }
}
