//! Optional diagnostic text files.
//!
//! Diagnostics never fail a build: a file that cannot be written is logged
//! and skipped.

use std::path::{Path, PathBuf};

use crate::util::fs::write_lines;

/// Writes sorted, newline-delimited lists into a diagnostics directory.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsWriter {
    dir: Option<PathBuf>,
}

impl DiagnosticsWriter {
    /// A writer for `dir`, or one that writes nothing when `dir` is `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        DiagnosticsWriter { dir }
    }

    pub fn disabled() -> Self {
        DiagnosticsWriter { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Write `lines`, sorted, to `<dir>/<name>`.
    ///
    /// Returns the path written, or `None` if disabled or the write failed.
    pub fn emit<I, S>(&self, name: &str, lines: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = self.dir.as_ref()?;
        let path = dir.join(name);

        let mut sorted: Vec<String> = lines
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        sorted.sort();

        match write_lines(&path, &sorted) {
            Ok(()) => {
                tracing::debug!("wrote {} ({} lines)", path.display(), sorted.len());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("failed to write diagnostics file {}: {}", path.display(), e);
                None
            }
        }
    }
}
