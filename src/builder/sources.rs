//! Scanning merge inputs.
//!
//! Scanning only reads metadata: a dependency archive's central directory or
//! a class directory's listing. The bytes are copied later, when the output
//! archive is closed.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::archive::reader::ArchiveEntryReader;
use crate::archive::source::{ClassSource, EntrySource};
use crate::core::entry_name::normalize_relative;
use crate::core::identity::ArchiveIdentity;

/// Class entries found in one dependency archive.
#[derive(Debug, Clone)]
pub struct ScannedArchive {
    pub identity: ArchiveIdentity,
    pub classes: Vec<ClassSource>,
}

/// Class files found under one compiled-output directory.
#[derive(Debug, Clone)]
pub struct ScannedDirectory {
    pub root: PathBuf,
    pub classes: Vec<ClassSource>,
}

/// Read the class entries of a dependency archive.
///
/// The archive is opened through its canonical path, which is also the path
/// its entries are later copied from.
pub fn scan_archive(path: &Path) -> ArchiveResult<ScannedArchive> {
    let identity = ArchiveIdentity::resolve(path).map_err(|e| ArchiveError::read(path, e))?;

    let mut reader = ArchiveEntryReader::open(identity.path())?;
    let archive = reader.shared_path();
    let classes = reader
        .class_entries()?
        .into_iter()
        .map(|(name, index)| {
            ClassSource::new(
                name,
                EntrySource::Archive {
                    archive: archive.clone(),
                    index,
                },
            )
        })
        .collect::<Vec<_>>();

    tracing::debug!("{}: {} classes", identity, classes.len());
    Ok(ScannedArchive { identity, classes })
}

/// Walk a compiled-output directory for class files.
///
/// Files are visited in file-name order. A directory that does not exist
/// contributes nothing.
pub fn scan_class_dir(root: &Path) -> ArchiveResult<ScannedDirectory> {
    let mut scanned = ScannedDirectory {
        root: root.to_path_buf(),
        classes: Vec::new(),
    };

    if !root.exists() {
        tracing::debug!("class directory {} does not exist, skipping", root.display());
        return Ok(scanned);
    }

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| ArchiveError::DirectoryWalk {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(name) = normalize_relative(root, entry.path()) {
            scanned.classes.push(ClassSource::new(
                name,
                EntrySource::File(entry.path().to_path_buf()),
            ));
        }
    }

    tracing::debug!("{}: {} classes", root.display(), scanned.classes.len());
    Ok(scanned)
}
