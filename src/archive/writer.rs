//! Merged archive output.
//!
//! [`ArchiveWriter`] collects entries by name and only touches bytes when it
//! is closed. Collecting first gives the overwrite semantics the merge needs
//! (a later `put` replaces an earlier one, `remove` drops an entry) without
//! ever rewriting data already written to disk.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::archive::reader::ArchiveEntryReader;
use crate::archive::source::EntrySource;
use crate::core::ArchiveEntryName;
use crate::util::fs::{persist, temp_file_beside};

/// Entries at or above this size need zip64 local headers.
const ZIP64_BYTES_THRESHOLD: u64 = u32::MAX as u64;

/// Class files read ahead of the writer at a time.
const LOOSE_BATCH: usize = 256;

/// Accumulates entries and writes them as a stored (uncompressed) archive.
///
/// The output is produced in a temporary file next to the destination and
/// renamed into place by [`close`](ArchiveWriter::close). Dropping the writer
/// without closing it discards the temporary file.
pub struct ArchiveWriter {
    output: PathBuf,
    temp: NamedTempFile,
    entries: BTreeMap<ArchiveEntryName, EntrySource>,
}

impl ArchiveWriter {
    /// Prepare to write `output`.
    pub fn open(output: &Path) -> ArchiveResult<Self> {
        let temp = temp_file_beside(output).map_err(|e| ArchiveError::write(output, e))?;
        Ok(ArchiveWriter {
            output: output.to_path_buf(),
            temp,
            entries: BTreeMap::new(),
        })
    }

    /// Destination path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Insert or replace the entry for `name`, returning the replaced source.
    pub fn put(&mut self, name: ArchiveEntryName, source: EntrySource) -> Option<EntrySource> {
        self.entries.insert(name, source)
    }

    /// Remove the entry for `name` if present.
    pub fn remove(&mut self, name: &ArchiveEntryName) -> Option<EntrySource> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&EntrySource> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &ArchiveEntryName> {
        self.entries.keys()
    }

    /// Write every entry, finalize the central directory and move the
    /// archive into place. Returns the set of names written.
    ///
    /// Entries are grouped by source so each dependency archive is opened
    /// once: archive-sourced entries first (by archive path, then name), then
    /// files and in-memory entries by name. The order depends only on the
    /// inputs, so identical inputs give identical bytes.
    ///
    /// Entry bytes are decompressed and read on the current rayon pool.
    pub fn close(self) -> ArchiveResult<BTreeSet<ArchiveEntryName>> {
        let ArchiveWriter {
            output,
            mut temp,
            entries,
        } = self;

        let names: BTreeSet<ArchiveEntryName> = entries.keys().cloned().collect();

        let mut by_archive: BTreeMap<Arc<Path>, Vec<(ArchiveEntryName, usize)>> = BTreeMap::new();
        let mut loose: Vec<(ArchiveEntryName, Loose)> = Vec::new();
        for (name, source) in entries {
            match source {
                EntrySource::Archive { archive, index } => {
                    by_archive.entry(archive).or_default().push((name, index));
                }
                EntrySource::File(path) => loose.push((name, Loose::File(path))),
                EntrySource::Bytes(bytes) => loose.push((name, Loose::Bytes(bytes))),
            }
        }

        let by_archive: Vec<_> = by_archive.into_iter().collect();
        let archive_batch = rayon::current_num_threads().max(1);

        {
            let mut zip = ZipWriter::new(BufWriter::new(temp.as_file_mut()));

            // Extraction runs on the rayon pool a batch at a time; writing
            // stays sequential so the output order is fixed.
            for batch in by_archive.chunks(archive_batch) {
                let extracted = batch
                    .par_iter()
                    .map(|(archive, members)| extract(archive, members))
                    .collect::<ArchiveResult<Vec<_>>>()?;
                for ((_, members), contents) in batch.iter().zip(&extracted) {
                    for ((name, _), bytes) in members.iter().zip(contents) {
                        write_entry(&mut zip, &output, name, bytes)?;
                    }
                }
            }

            for batch in loose.chunks(LOOSE_BATCH) {
                let contents = batch
                    .par_iter()
                    .map(|(_, source)| match source {
                        Loose::File(path) => fs::read(path)
                            .map(Cow::<[u8]>::Owned)
                            .map_err(|e| ArchiveError::read(path, e)),
                        Loose::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
                    })
                    .collect::<ArchiveResult<Vec<_>>>()?;
                for ((name, _), bytes) in batch.iter().zip(&contents) {
                    write_entry(&mut zip, &output, name, bytes)?;
                }
            }

            let mut out = zip
                .finish()
                .map_err(|e| ArchiveError::write_failed(&output, e))?;
            out.flush().map_err(|e| ArchiveError::write(&output, e))?;
        }

        persist(temp, &output).map_err(|e| ArchiveError::write(&output, e))?;

        tracing::debug!("wrote {} entries to {}", names.len(), output.display());
        Ok(names)
    }
}

/// Decompress `members` of one archive, in order.
fn extract(
    archive: &Path,
    members: &[(ArchiveEntryName, usize)],
) -> ArchiveResult<Vec<Vec<u8>>> {
    let mut reader = ArchiveEntryReader::open(archive)?;
    members
        .iter()
        .map(|(_, index)| reader.read_entry(*index))
        .collect()
}

/// Entries that are not copied out of another archive.
enum Loose {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

fn stored_options(size: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
        .large_file(size >= ZIP64_BYTES_THRESHOLD)
}

fn write_entry<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    output: &Path,
    name: &ArchiveEntryName,
    bytes: &[u8],
) -> ArchiveResult<()> {
    zip.start_file(name.as_str(), stored_options(bytes.len() as u64))
        .map_err(|e| ArchiveError::write_failed(output, e))?;
    zip.write_all(bytes)
        .map_err(|e| ArchiveError::write(output, e))
}
