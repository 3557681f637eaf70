//! Store-relative object locations.
//!
//! A [`Path`] is always `/`-separated, whatever the host OS, so locations
//! returned by one backend can be handed to another. A trailing `/` is
//! significant: it marks a directory-like prefix, the way blob stores infer
//! "directories" from key prefixes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used inside every [`Path`].
pub const DELIMITER: char = '/';

/// A normalized location relative to a store's base.
///
/// Normalization strips leading separators, collapses repeated separators
/// and drops `.` components. A trailing separator is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Path {
    raw: String,
}

impl Path {
    /// Build a normalized path from a raw location string.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self {
            raw: normalize(raw.as_ref()),
        }
    }

    /// The normalized location string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` for the empty (store root) path.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns `true` if the location ends with a separator.
    pub fn is_dir_like(&self) -> bool {
        self.raw.ends_with(DELIMITER)
    }

    /// The same location with a trailing separator.
    pub fn as_dir(&self) -> Path {
        if self.raw.is_empty() || self.is_dir_like() {
            return self.clone();
        }
        Self {
            raw: format!("{}{DELIMITER}", self.raw),
        }
    }

    /// Concatenate `other` under `self`.
    ///
    /// ```
    /// use txlog_storage::Path;
    ///
    /// let log = Path::new("table/_log");
    /// assert_eq!(log.join(&Path::new("00000.json")).as_str(), "table/_log/00000.json");
    /// ```
    pub fn join(&self, other: &Path) -> Path {
        if self.raw.is_empty() {
            return other.clone();
        }
        Path::new(format!("{}{DELIMITER}{}", self.raw, other.raw))
    }

    /// Shorthand for joining a single name.
    pub fn child(&self, name: &str) -> Path {
        self.join(&Path::new(name))
    }

    /// Non-empty components between separators.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.raw.split(DELIMITER).filter(|p| !p.is_empty())
    }

    /// Last component, without any trailing separator.
    pub fn filename(&self) -> Option<&str> {
        self.parts().last()
    }

    /// Split into the directory part (ending in a separator, or empty) and
    /// the trailing name prefix (possibly empty).
    ///
    /// ```
    /// use txlog_storage::Path;
    ///
    /// assert_eq!(Path::new("a/b/ab").split_prefix(), ("a/b/", "ab"));
    /// assert_eq!(Path::new("a/b/").split_prefix(), ("a/b/", ""));
    /// assert_eq!(Path::new("ab").split_prefix(), ("", "ab"));
    /// ```
    pub fn split_prefix(&self) -> (&str, &str) {
        match self.raw.rfind(DELIMITER) {
            Some(idx) => self.raw.split_at(idx + 1),
            None => ("", self.raw.as_str()),
        }
    }
}

fn normalize(raw: &str) -> String {
    let trailing = raw.ends_with(DELIMITER);
    let mut out = raw
        .split(DELIMITER)
        .filter(|p| !p.is_empty() && *p != ".")
        .collect::<Vec<_>>()
        .join("/");
    if trailing && !out.is_empty() {
        out.push(DELIMITER);
    }
    out
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.raw
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
