use std::fmt;

use serde::{Deserialize, Serialize};

/// Version number of a commit in the table log.
pub type Version = i64;

/// The last commit version a committer observed or claimed.
///
/// Serialized as `{"version": N}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitState {
    /// Version of the commit.
    pub version: Version,
}

impl CommitState {
    /// A state recording `version` as the latest commit.
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "version {}", self.version)
    }
}
