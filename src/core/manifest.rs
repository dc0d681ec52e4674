//! Persisted variant manifests.
//!
//! A manifest records what went into a merged archive: the sorted class
//! entry names it contains and the identities of the dependency archives it
//! consumed. It is written as two newline-delimited text files so a later,
//! separately scheduled step can use it without reopening the archive.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::core::entry_name::{normalize, ArchiveEntryName};
use crate::core::identity::ArchiveIdentity;
use crate::core::variant::VariantKind;
use crate::util::fs::{read_lines, write_lines};

/// File locations for one variant's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    /// Dependency identities, one canonical path per line
    pub dependencies: PathBuf,
    /// Class entry names, one per line
    pub classes: PathBuf,
    /// Incremental fingerprint (JSON)
    pub fingerprint: PathBuf,
}

impl ManifestPaths {
    /// Manifest files named `<stem>-jars.txt`, `<stem>-classes.txt` and
    /// `<stem>-fingerprint.json` inside `dir`.
    pub fn in_dir(dir: &Path, stem: &str) -> Self {
        ManifestPaths {
            dependencies: dir.join(format!("{}-jars.txt", stem)),
            classes: dir.join(format!("{}-classes.txt", stem)),
            fingerprint: dir.join(format!("{}-fingerprint.json", stem)),
        }
    }

    /// The standard manifest location for a variant.
    pub fn for_variant(dir: &Path, kind: VariantKind) -> Self {
        ManifestPaths::in_dir(dir, kind.as_str())
    }

    /// Whether both text files are present.
    pub fn exist(&self) -> bool {
        self.dependencies.is_file() && self.classes.is_file()
    }
}

/// The classes written to a merged archive and the dependencies consumed.
///
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantManifest {
    classes: BTreeSet<ArchiveEntryName>,
    dependencies: BTreeSet<ArchiveIdentity>,
}

impl VariantManifest {
    pub fn new(
        classes: BTreeSet<ArchiveEntryName>,
        dependencies: BTreeSet<ArchiveIdentity>,
    ) -> Self {
        VariantManifest {
            classes,
            dependencies,
        }
    }

    /// Every class entry in the merged archive, sorted.
    pub fn classes(&self) -> &BTreeSet<ArchiveEntryName> {
        &self.classes
    }

    /// Identities of the dependency archives consumed.
    pub fn dependencies(&self) -> &BTreeSet<ArchiveIdentity> {
        &self.dependencies
    }

    /// Write both manifest files.
    pub fn save(&self, paths: &ManifestPaths) -> ArchiveResult<()> {
        write_lines(
            &paths.dependencies,
            self.dependencies.iter().map(ArchiveIdentity::to_manifest_line),
        )
        .map_err(|e| ArchiveError::write(&paths.dependencies, e))?;

        write_lines(&paths.classes, self.classes.iter().map(ArchiveEntryName::as_str))
            .map_err(|e| ArchiveError::write(&paths.classes, e))?;

        Ok(())
    }

    /// Read both manifest files.
    pub fn load(paths: &ManifestPaths) -> ArchiveResult<Self> {
        Ok(VariantManifest {
            classes: Self::load_classes(&paths.classes)?,
            dependencies: Self::load_dependencies(&paths.dependencies)?,
        })
    }

    /// Read a dependency manifest.
    pub fn load_dependencies(path: &Path) -> ArchiveResult<BTreeSet<ArchiveIdentity>> {
        let lines = read_lines(path).map_err(|source| ArchiveError::ManifestUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(lines
            .iter()
            .map(|l| ArchiveIdentity::from_manifest_line(l))
            .collect())
    }

    /// Read a class manifest. Lines that are not class entry names are skipped.
    pub fn load_classes(path: &Path) -> ArchiveResult<BTreeSet<ArchiveEntryName>> {
        let lines = read_lines(path).map_err(|source| ArchiveError::ManifestUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let mut classes = BTreeSet::new();
        for line in &lines {
            match normalize(line) {
                Some(name) => {
                    classes.insert(name);
                }
                None => tracing::warn!(
                    "ignoring invalid class entry `{}` in {}",
                    line,
                    path.display()
                ),
            }
        }
        Ok(classes)
    }
}
