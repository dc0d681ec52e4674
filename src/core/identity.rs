//! Dependency archive identities.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The identity of a dependency archive: its canonical absolute path.
///
/// Two archives are the same dependency iff their identities are equal. The
/// content is deliberately not part of the identity; a different version of a
/// library resolves to a different file and therefore to a different identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveIdentity(PathBuf);

impl ArchiveIdentity {
    /// Resolve the identity of an archive that must exist.
    pub fn resolve(path: &Path) -> std::io::Result<Self> {
        path.canonicalize().map(ArchiveIdentity)
    }

    /// Compute an identity without requiring the file to exist.
    ///
    /// Falls back to the absolute (non-canonical) path when the file cannot
    /// be canonicalized, and to the path as given if even that fails.
    pub fn of(path: &Path) -> Self {
        match path.canonicalize() {
            Ok(canonical) => ArchiveIdentity(canonical),
            Err(_) => ArchiveIdentity(
                std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
            ),
        }
    }

    /// Rebuild an identity from a persisted manifest line.
    pub fn from_manifest_line(line: &str) -> Self {
        ArchiveIdentity(PathBuf::from(line))
    }

    /// The canonical path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The line written to a dependency manifest.
    pub fn to_manifest_line(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }
}

impl fmt::Display for ArchiveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ArchiveIdentity {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Collapse duplicate identities, keeping the first occurrence of each.
pub fn dedup_identities(paths: &[PathBuf]) -> Vec<(PathBuf, ArchiveIdentity)> {
    let mut seen = std::collections::HashSet::new();
    paths
        .iter()
        .map(|p| (p.clone(), ArchiveIdentity::of(p)))
        .filter(|(_, id)| seen.insert(id.clone()))
        .collect()
}
