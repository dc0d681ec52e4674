//! Merge fingerprinting for incremental builds.
//!
//! A fingerprint captures every input to a merge, allowing the merge to be
//! skipped when nothing has changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::archive::source::EntrySource;
use crate::builder::sources::{ScannedArchive, ScannedDirectory};
use crate::core::entry_name::ArchiveEntryName;
use crate::core::identity::ArchiveIdentity;
use crate::core::variant::VariantKind;
use crate::util::hash::{sha256_file, Fingerprint};

/// Hash of one consumed dependency archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDigest {
    pub identity: ArchiveIdentity,
    pub sha256: String,
}

/// Fingerprint for a variant merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFingerprint {
    /// Version of jarsplit that wrote the archive
    pub version: String,

    pub kind: VariantKind,

    /// Merged archive path
    pub output: PathBuf,

    /// Dependency archives in merge order
    pub archives: Vec<ArchiveDigest>,

    /// Compiled class hashes by entry name (the winning file for each name)
    pub classes: BTreeMap<ArchiveEntryName, String>,
}

impl MergeFingerprint {
    /// Hash the scanned inputs of a merge.
    ///
    /// Archives and class files are hashed in parallel on the current rayon
    /// pool.
    pub fn compute(
        kind: VariantKind,
        output: &Path,
        archives: &[ScannedArchive],
        directories: &[ScannedDirectory],
    ) -> ArchiveResult<Self> {
        let archives = archives
            .par_iter()
            .map(|scanned| {
                let path = scanned.identity.path();
                let sha256 = sha256_file(path).map_err(|e| ArchiveError::read(path, e))?;
                Ok(ArchiveDigest {
                    identity: scanned.identity.clone(),
                    sha256,
                })
            })
            .collect::<ArchiveResult<Vec<_>>>()?;

        let files: Vec<(&ArchiveEntryName, &Path)> = directories
            .iter()
            .flat_map(|dir| dir.classes.iter())
            .filter_map(|class| match &class.source {
                EntrySource::File(path) => Some((&class.name, path.as_path())),
                _ => None,
            })
            .collect();

        let hashes = files
            .par_iter()
            .map(|(name, path)| {
                sha256_file(path)
                    .map(|hash| ((*name).clone(), hash))
                    .map_err(|e| ArchiveError::read(path, e))
            })
            .collect::<ArchiveResult<Vec<_>>>()?;

        // Later directories win, so later hashes replace earlier ones.
        let classes = hashes.into_iter().collect();

        Ok(MergeFingerprint {
            version: env!("CARGO_PKG_VERSION").to_string(),
            kind,
            output: output.to_path_buf(),
            archives,
            classes,
        })
    }

    /// Check if the fingerprint matches (nothing has changed).
    pub fn matches(&self, other: &MergeFingerprint) -> bool {
        self == other
    }

    /// A short digest of every component, for logs.
    pub fn digest(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_pair("version", &self.version)
            .update_pair("kind", self.kind.as_str())
            .update_str(&self.output.to_string_lossy());
        for archive in &self.archives {
            fp.update_pair(&archive.identity.to_manifest_line(), &archive.sha256);
        }
        for (name, hash) in &self.classes {
            fp.update_pair(name.as_str(), hash);
        }
        fp.finish_short()
    }

    /// Load a fingerprint, or `None` if there is no usable one.
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                tracing::debug!("ignoring unreadable fingerprint {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save the fingerprint as pretty JSON.
    pub fn save(&self, path: &Path) -> ArchiveResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ArchiveError::write(path, e.into()))?;
        crate::util::fs::write_lines(path, [content])
            .map_err(|e| ArchiveError::write(path, e))
    }
}
