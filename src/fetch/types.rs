//! Listing entry types shared by the fetcher traits.

use serde::{Deserialize, Serialize};

/// The type of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A subdirectory.
    Dir,
}

/// One entry in a directory listing, relative to the listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// The entry's name within its parent directory.
    pub name: String,
    /// Whether the entry is a file or a subdirectory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl ListingEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }

    /// Whether the entry is a subdirectory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}
