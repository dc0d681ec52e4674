//! Test utilities for Jarsplit unit tests.
//!
//! Helpers here build real archives and class directories on disk so the
//! readers and writers are exercised against the `zip` crate itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use jarsplit::test_support::{write_jar, write_class_dir};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     write_jar(&tmp.path().join("lib.jar"), &[("com/Util.class", "util")]);
//!     write_class_dir(&tmp.path().join("classes"), &[("com/App.class", "app")]);
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Write a deflated archive. Names ending in `/` become directory entries.
pub fn write_jar<N: AsRef<str>, B: AsRef<[u8]>>(path: &Path, entries: &[(N, B)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in entries {
        let name = name.as_ref();
        if name.ends_with('/') {
            zip.add_directory(name, options).unwrap();
        } else {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_ref()).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// Write class files below `root`, creating directories as needed.
pub fn write_class_dir<N: AsRef<str>, B: AsRef<[u8]>>(root: &Path, files: &[(N, B)]) {
    std::fs::create_dir_all(root).unwrap();
    for (rel, body) in files {
        let path = root.join(rel.as_ref());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, body.as_ref()).unwrap();
    }
}

/// Read every file entry of an archive into memory, keyed by name.
pub fn read_jar(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        if file.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        entries.insert(file.name().to_string(), buf);
    }
    entries
}

/// Write a one-entry stored archive, then rewrite the entry's compression
/// method and OR `flags` into its general-purpose bits, in both the local and
/// the central-directory header.
///
/// Produces archives the `zip` crate cannot write itself, such as an unknown
/// compression method or the traditional encryption bit.
pub fn write_patched_jar(path: &Path, name: &str, body: &[u8], method: u16, flags: u16) {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file(name, options).unwrap();
    zip.write_all(body).unwrap();
    let mut bytes = zip.finish().unwrap().into_inner();

    let patch = |bytes: &mut [u8], flags_at: usize, method_at: usize| {
        let old = u16::from_le_bytes([bytes[flags_at], bytes[flags_at + 1]]);
        bytes[flags_at..flags_at + 2].copy_from_slice(&(old | flags).to_le_bytes());
        bytes[method_at..method_at + 2].copy_from_slice(&method.to_le_bytes());
    };

    assert_eq!(&bytes[..4], b"PK\x03\x04");
    patch(bytes.as_mut_slice(), 6, 8);
    let central = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .unwrap();
    patch(bytes.as_mut_slice(), central + 8, central + 10);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Entry names of an archive in central-directory order.
pub fn jar_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_jar() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("nested/lib.jar");
        write_jar(&jar, &[("com/", ""), ("com/A.class", "a")]);

        let entries = read_jar(&jar);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["com/A.class"], b"a");
        assert_eq!(jar_names(&jar).len(), 2);
    }

    #[test]
    fn test_write_class_dir() {
        let tmp = TempDir::new().unwrap();
        write_class_dir(tmp.path(), &[("com/x/App.class", "app")]);
        assert!(tmp.path().join("com/x/App.class").is_file());
    }
}
