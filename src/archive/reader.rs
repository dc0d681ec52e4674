//! Streaming access to the entries of an existing archive.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use zip::ZipArchive;

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::core::entry_name::{normalize, ArchiveEntryName};

/// Metadata for one entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// The name exactly as stored in the archive
    pub raw_name: String,
    /// Position of the entry in the central directory
    pub index: usize,
    pub is_dir: bool,
    /// Uncompressed size in bytes
    pub size: u64,
    pub encrypted: bool,
}

impl ArchiveEntry {
    /// The class entry name, or `None` if this entry is not a class.
    pub fn class_name(&self) -> Option<ArchiveEntryName> {
        if self.is_dir {
            return None;
        }
        normalize(&self.raw_name)
    }
}

/// Reads an archive's central directory and hands out its entries.
///
/// Only the central directory is held in memory; entry bytes are read on
/// demand. Zip64 archives (more than 65,535 entries or offsets beyond 4 GiB)
/// are read transparently. The file handle is released when the reader is
/// dropped.
pub struct ArchiveEntryReader {
    path: Arc<Path>,
    archive: ZipArchive<BufReader<File>>,
}

impl ArchiveEntryReader {
    /// Open an archive and parse its central directory.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let file = File::open(path).map_err(|e| ArchiveError::read(path, e))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| ArchiveError::open_failed(path, e))?;

        Ok(ArchiveEntryReader {
            path: Arc::from(path),
            archive,
        })
    }

    /// Path of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the archive path, used by lazy entry sources.
    pub fn shared_path(&self) -> Arc<Path> {
        Arc::clone(&self.path)
    }

    /// Number of entries in the central directory.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Iterate over every entry. Calling this again starts over.
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            path: &self.path,
            archive: &mut self.archive,
            next: 0,
        }
    }

    /// Every class entry with its index, in central-directory order.
    ///
    /// Directories, non-class files and `META-INF` content are skipped.
    /// Encrypted class entries cannot be copied and fail the scan.
    pub fn class_entries(&mut self) -> ArchiveResult<Vec<(ArchiveEntryName, usize)>> {
        let path = Arc::clone(&self.path);
        let mut classes = Vec::new();
        for entry in self.entries() {
            let entry = entry?;
            let Some(name) = entry.class_name() else {
                continue;
            };
            if entry.encrypted {
                return Err(ArchiveError::EntryUnsupported {
                    path: path.to_path_buf(),
                    entry: entry.raw_name,
                    reason: "encrypted entries are not supported".to_string(),
                });
            }
            classes.push((name, entry.index));
        }
        Ok(classes)
    }

    /// Decompress the entry at `index` into `buf`, replacing its contents.
    pub fn read_entry_into(&mut self, index: usize, buf: &mut Vec<u8>) -> ArchiveResult<()> {
        let path: &Path = &self.path;
        let mut file = self
            .archive
            .by_index(index)
            .map_err(|e| ArchiveError::entry_failed(path, format!("#{}", index), e))?;

        buf.clear();
        file.read_to_end(buf)
            .map_err(|e| ArchiveError::content(path, e))?;
        Ok(())
    }

    /// Decompress the entry at `index`.
    pub fn read_entry(&mut self, index: usize) -> ArchiveResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_entry_into(index, &mut buf)?;
        Ok(buf)
    }
}

/// Iterator over the entries of an [`ArchiveEntryReader`].
pub struct Entries<'a> {
    path: &'a Path,
    archive: &'a mut ZipArchive<BufReader<File>>,
    next: usize,
}

impl Iterator for Entries<'_> {
    type Item = ArchiveResult<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.archive.len() {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let path = self.path;
        let entry = self
            .archive
            .by_index_raw(index)
            .map(|file| ArchiveEntry {
                raw_name: file.name().to_string(),
                index,
                is_dir: file.is_dir(),
                size: file.size(),
                encrypted: file.encrypted(),
            })
            .map_err(|e| ArchiveError::entry_failed(path, format!("#{}", index), e));
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.archive.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
