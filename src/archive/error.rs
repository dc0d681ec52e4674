//! Archive error types and diagnostics.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use zip::result::ZipError;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// A fatal error while reading inputs or producing a merged archive.
///
/// Every variant carries the path that caused it, so a failed build step can
/// say exactly which archive or directory was at fault.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ArchiveError {
    #[error("archive not found: {}", .path.display())]
    #[diagnostic(
        code(jarsplit::archive::not_found),
        help("the dependency must be resolved to an existing file before merging")
    )]
    NotFound { path: PathBuf },

    #[error("corrupt archive {}: {reason}", .path.display())]
    #[diagnostic(
        code(jarsplit::archive::corrupt),
        help("the central directory could not be parsed; rebuild or re-download the archive")
    )]
    Corrupt { path: PathBuf, reason: String },

    #[error("unsupported entry `{entry}` in {}: {reason}", .path.display())]
    #[diagnostic(code(jarsplit::archive::entry_unsupported))]
    EntryUnsupported {
        path: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("failed to write {}", .path.display())]
    #[diagnostic(code(jarsplit::archive::write_failed))]
    FilesystemWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no space left on device while writing {}", .path.display())]
    #[diagnostic(code(jarsplit::archive::disk_full), help("free up disk space and rerun"))]
    DiskSpaceExhausted {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(jarsplit::archive::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk class directory {}", .path.display())]
    #[diagnostic(code(jarsplit::archive::directory_walk))]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read manifest {}", .path.display())]
    #[diagnostic(
        code(jarsplit::archive::manifest_unreadable),
        help("the target variant must be merged before the probe variant")
    )]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// Classify a failed write.
    pub fn write(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::StorageFull {
            ArchiveError::DiskSpaceExhausted {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ArchiveError::FilesystemWrite {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Classify a failed read of an input file.
    pub fn read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ArchiveError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ArchiveError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Classify an I/O error raised while parsing archive content.
    ///
    /// A record cut short or malformed bytes mean the archive is corrupt;
    /// anything else is a genuine read failure.
    pub(crate) fn content(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => ArchiveError::Corrupt {
                path: path.to_path_buf(),
                reason: source.to_string(),
            },
            _ => ArchiveError::read(path, source),
        }
    }

    /// Map an error raised while opening an archive.
    pub(crate) fn open_failed(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => ArchiveError::content(path, source),
            other => ArchiveError::Corrupt {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }

    /// Map an error raised while reading one entry of an archive.
    pub(crate) fn entry_failed(path: &Path, entry: impl Into<String>, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => ArchiveError::content(path, source),
            ZipError::UnsupportedArchive(reason) => ArchiveError::EntryUnsupported {
                path: path.to_path_buf(),
                entry: entry.into(),
                reason: reason.to_string(),
            },
            other => ArchiveError::Corrupt {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }

    /// Map an error raised by the zip writer.
    pub(crate) fn write_failed(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => ArchiveError::write(path, source),
            other => ArchiveError::write(path, io::Error::other(other.to_string())),
        }
    }

    /// The file or directory the error is about.
    pub fn path(&self) -> &Path {
        match self {
            ArchiveError::NotFound { path }
            | ArchiveError::Corrupt { path, .. }
            | ArchiveError::EntryUnsupported { path, .. }
            | ArchiveError::FilesystemWrite { path, .. }
            | ArchiveError::DiskSpaceExhausted { path, .. }
            | ArchiveError::ReadFailed { path, .. }
            | ArchiveError::DirectoryWalk { path, .. }
            | ArchiveError::ManifestUnreadable { path, .. } => path,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_location(self.path());
        match self {
            ArchiveError::NotFound { .. } => diag.with_suggestion(suggestions::MISSING_ARCHIVE),
            ArchiveError::Corrupt { .. } | ArchiveError::EntryUnsupported { .. } => {
                diag.with_suggestion(suggestions::BAD_ARCHIVE)
            }
            ArchiveError::DiskSpaceExhausted { .. } => diag.with_suggestion(suggestions::DISK_FULL),
            ArchiveError::ManifestUnreadable { .. } => {
                diag.with_suggestion(suggestions::TARGET_FIRST)
            }
            ArchiveError::FilesystemWrite { source, .. }
            | ArchiveError::ReadFailed { source, .. } => diag.with_context(source.to_string()),
            ArchiveError::DirectoryWalk { source, .. } => diag.with_context(source.to_string()),
        }
    }
}
