//! Byte sources for merged archive entries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::ArchiveEntryName;

/// Where the bytes of an entry come from.
///
/// Sources are lazy: nothing is read until the writer is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    /// A compiled class file on disk.
    File(PathBuf),

    /// The entry at `index` in an existing archive.
    Archive { archive: Arc<Path>, index: usize },

    /// Bytes already in memory.
    Bytes(Arc<[u8]>),
}

impl EntrySource {
    /// Whether this source is a dependency archive entry.
    pub fn is_archive(&self) -> bool {
        matches!(self, EntrySource::Archive { .. })
    }
}

impl From<Vec<u8>> for EntrySource {
    fn from(bytes: Vec<u8>) -> Self {
        EntrySource::Bytes(bytes.into())
    }
}

/// A class entry paired with the source of its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSource {
    pub name: ArchiveEntryName,
    pub source: EntrySource,
}

impl ClassSource {
    pub fn new(name: ArchiveEntryName, source: EntrySource) -> Self {
        ClassSource { name, source }
    }
}
