//! The merge shared by both variant builders.
//!
//! Inputs are scanned in parallel, then applied to a single
//! [`ArchiveWriter`] in input order: dependency archives first, compiled
//! class directories last. Only the applying thread touches the writer.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::archive::writer::ArchiveWriter;
use crate::builder::fingerprint::MergeFingerprint;
use crate::builder::progress::MergeProgress;
use crate::builder::sources::{scan_archive, scan_class_dir, ScannedArchive, ScannedDirectory};
use crate::core::entry_name::ArchiveEntryName;
use crate::core::manifest::{ManifestPaths, VariantManifest};
use crate::core::variant::VariantKind;
use crate::util::config::MergeConfig;
use crate::util::fs::{ensure_dir, remove_file_if_exists};

/// Result of building one merged archive.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Merged archive path
    pub archive: PathBuf,

    /// What was written and consumed
    pub manifest: VariantManifest,

    /// Class entries contributed by dependency archives, before compiled
    /// classes were applied
    pub dependency_classes: BTreeSet<ArchiveEntryName>,

    /// Compiled classes that replaced a dependency class of the same name
    pub overridden: usize,

    /// Whether the merge was skipped because nothing changed
    pub up_to_date: bool,
}

/// Everything one merge needs.
pub(crate) struct MergePlan<'a> {
    pub kind: VariantKind,
    /// Dependency archives, already collapsed by identity
    pub archives: &'a [PathBuf],
    pub class_dirs: &'a [PathBuf],
    pub config: &'a MergeConfig,
    pub progress: &'a MergeProgress,
}

impl MergePlan<'_> {
    pub(crate) fn run(&self, output: &Path, paths: &ManifestPaths) -> ArchiveResult<MergeOutput> {
        let start = Instant::now();
        self.progress.expect(self.archives.len(), self.class_dirs.len());

        let (archives, directories) = with_pool(self.config.jobs, || self.scan())?;

        let dependency_classes: BTreeSet<ArchiveEntryName> = archives
            .iter()
            .flat_map(|a| a.classes.iter().map(|c| c.name.clone()))
            .collect();
        let overridden = overridden_classes(&dependency_classes, &directories);

        let fingerprint = if self.config.incremental {
            let fingerprint = with_pool(self.config.jobs, || {
                MergeFingerprint::compute(self.kind, output, &archives, &directories)
            })?;
            if let Some(manifest) = self.cached(output, paths, &fingerprint) {
                tracing::debug!("{} archive {} is up to date", self.kind, output.display());
                return Ok(MergeOutput {
                    archive: output.to_path_buf(),
                    manifest,
                    dependency_classes,
                    overridden,
                    up_to_date: true,
                });
            }
            Some(fingerprint)
        } else {
            None
        };

        // A stale fingerprint must never describe the archive written below.
        remove_file_if_exists(&paths.fingerprint)
            .map_err(|e| ArchiveError::write(&paths.fingerprint, e))?;

        let classes = with_pool(self.config.jobs, || {
            self.write(output, &archives, &directories)
        })?;
        let dependencies = archives.into_iter().map(|a| a.identity).collect();
        let manifest = VariantManifest::new(classes, dependencies);
        manifest.save(paths)?;

        if let Some(fingerprint) = fingerprint {
            match fingerprint.save(&paths.fingerprint) {
                Ok(()) => tracing::debug!("{} fingerprint {}", self.kind, fingerprint.digest()),
                Err(e) => tracing::warn!("failed to save fingerprint: {}", e),
            }
        }

        tracing::info!(
            "merged {} {} classes from {} archives and {} directories in {:.2}s",
            manifest.classes().len(),
            self.kind,
            manifest.dependencies().len(),
            directories.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(MergeOutput {
            archive: output.to_path_buf(),
            manifest,
            dependency_classes,
            overridden,
            up_to_date: false,
        })
    }

    /// Scan archives and class directories in parallel, keeping input order.
    fn scan(&self) -> ArchiveResult<(Vec<ScannedArchive>, Vec<ScannedDirectory>)> {
        let (archives, directories) = rayon::join(
            || {
                self.archives
                    .par_iter()
                    .map(|path| {
                        let scanned = scan_archive(path);
                        self.progress.archive_scanned();
                        scanned
                    })
                    .collect::<Vec<_>>()
            },
            || {
                self.class_dirs
                    .par_iter()
                    .map(|dir| {
                        let scanned = scan_class_dir(dir);
                        self.progress.directory_walked();
                        scanned
                    })
                    .collect::<Vec<_>>()
            },
        );

        // The first failing input in order decides the error.
        let archives = archives.into_iter().collect::<ArchiveResult<Vec<_>>>()?;
        let directories = directories.into_iter().collect::<ArchiveResult<Vec<_>>>()?;
        Ok((archives, directories))
    }

    /// The persisted manifest, if the last merge had the same fingerprint
    /// and all of its outputs are still present.
    fn cached(
        &self,
        output: &Path,
        paths: &ManifestPaths,
        fingerprint: &MergeFingerprint,
    ) -> Option<VariantManifest> {
        if !output.is_file() || !paths.exist() {
            return None;
        }
        let previous = MergeFingerprint::load(&paths.fingerprint)?;
        if !previous.matches(fingerprint) {
            tracing::debug!("{} inputs changed since the last merge", self.kind);
            return None;
        }
        VariantManifest::load(paths).ok()
    }

    fn write(
        &self,
        output: &Path,
        archives: &[ScannedArchive],
        directories: &[ScannedDirectory],
    ) -> ArchiveResult<BTreeSet<ArchiveEntryName>> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent).map_err(|e| ArchiveError::write(parent, e))?;
        }

        let mut writer = ArchiveWriter::open(output)?;

        for archive in archives {
            for class in &archive.classes {
                writer.put(class.name.clone(), class.source.clone());
            }
        }

        for directory in directories {
            for class in &directory.classes {
                if let Some(previous) = writer.remove(&class.name) {
                    if previous.is_archive() {
                        tracing::trace!(
                            "{} from {} overrides a dependency class",
                            class.name,
                            directory.root.display()
                        );
                    }
                }
                writer.put(class.name.clone(), class.source.clone());
            }
        }

        let written = writer.close()?;
        self.progress.entries_written(written.len());
        Ok(written)
    }
}

/// Number of dependency classes replaced by a compiled class.
fn overridden_classes(
    dependency_classes: &BTreeSet<ArchiveEntryName>,
    directories: &[ScannedDirectory],
) -> usize {
    directories
        .iter()
        .flat_map(|dir| dir.classes.iter().map(|c| &c.name))
        .filter(|name| dependency_classes.contains(*name))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Run `op` on a pool with `jobs` threads, or on the global pool.
fn with_pool<R, F>(jobs: Option<usize>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let pool = jobs.and_then(|j| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j)
            .build()
            .ok() // Fall back to the global pool
    });
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{read_jar, write_class_dir, write_jar};
    use tempfile::TempDir;

    fn plan<'a>(
        archives: &'a [PathBuf],
        class_dirs: &'a [PathBuf],
        config: &'a MergeConfig,
        progress: &'a MergeProgress,
    ) -> MergePlan<'a> {
        MergePlan {
            kind: VariantKind::Target,
            archives,
            class_dirs,
            config,
            progress,
        }
    }

    #[test]
    fn test_compiled_classes_override_dependencies() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("shaded.jar");
        write_jar(
            &jar,
            &[("com/App.class", "from-jar"), ("com/Util.class", "util")],
        );
        let classes = tmp.path().join("classes");
        write_class_dir(&classes, &[("com/App.class", "compiled")]);

        let archives = vec![jar];
        let dirs = vec![classes];
        let config = MergeConfig::default();
        let progress = MergeProgress::new();
        let paths = ManifestPaths::in_dir(tmp.path(), "target");
        let out = tmp.path().join("out/target.jar");

        let merged = plan(&archives, &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();

        assert_eq!(merged.overridden, 1);
        assert_eq!(merged.dependency_classes.len(), 2);
        let entries = read_jar(&out);
        assert_eq!(entries["com/App.class"], b"compiled");
        assert_eq!(entries["com/Util.class"], b"util");
        assert!(progress.is_complete());
        assert_eq!(progress.entry_count(), 2);

        let cached = plan(&archives, &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();
        assert!(cached.up_to_date);
        assert_eq!(cached.overridden, 1);
        assert!(progress.is_complete());
        assert_eq!(progress.progress(), 1.0);
    }

    #[test]
    fn test_overrides_count_each_class_once() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("shaded.jar");
        write_jar(&jar, &[("com/App.class", "from-jar")]);
        let first = tmp.path().join("classes");
        let second = tmp.path().join("more-classes");
        write_class_dir(&first, &[("com/App.class", "compiled")]);
        write_class_dir(&second, &[("com/App.class", "recompiled")]);

        let archives = vec![jar];
        let dirs = vec![first, second];
        let config = MergeConfig::default();
        let progress = MergeProgress::new();
        let paths = ManifestPaths::in_dir(tmp.path(), "target");
        let out = tmp.path().join("target.jar");

        let merged = plan(&archives, &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();
        assert_eq!(merged.overridden, 1);
        assert_eq!(read_jar(&out)["com/App.class"], b"recompiled");
    }

    #[test]
    fn test_later_dependency_wins() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first.jar");
        let second = tmp.path().join("second.jar");
        write_jar(&first, &[("com/Dup.class", "first")]);
        write_jar(&second, &[("com/Dup.class", "second")]);

        let archives = vec![first, second];
        let config = MergeConfig {
            jobs: Some(2),
            incremental: false,
        };
        let progress = MergeProgress::new();
        let paths = ManifestPaths::in_dir(tmp.path(), "target");
        let out = tmp.path().join("target.jar");

        plan(&archives, &[], &config, &progress)
            .run(&out, &paths)
            .unwrap();

        assert_eq!(read_jar(&out)["com/Dup.class"], b"second");
        assert!(!paths.fingerprint.exists());
    }

    #[test]
    fn test_incremental_skips_unchanged_inputs() {
        let tmp = TempDir::new().unwrap();
        let classes = tmp.path().join("classes");
        write_class_dir(&classes, &[("com/App.class", "v1")]);

        let dirs = vec![classes.clone()];
        let config = MergeConfig::default();
        let progress = MergeProgress::new();
        let paths = ManifestPaths::in_dir(tmp.path(), "target");
        let out = tmp.path().join("target.jar");

        let first = plan(&[], &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();
        assert!(!first.up_to_date);
        assert!(paths.fingerprint.is_file());

        let second = plan(&[], &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();
        assert!(second.up_to_date);
        assert_eq!(second.manifest, first.manifest);

        std::fs::write(classes.join("com/App.class"), "v2").unwrap();
        let third = plan(&[], &dirs, &config, &progress)
            .run(&out, &paths)
            .unwrap();
        assert!(!third.up_to_date);
        assert_eq!(read_jar(&out)["com/App.class"], b"v2");
    }

    #[test]
    fn test_failed_archive_aborts_without_output() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.jar");
        write_jar(&good, &[("com/A.class", "a")]);
        let bad = tmp.path().join("bad.jar");
        std::fs::write(&bad, "garbage").unwrap();

        let archives = vec![good, bad.clone()];
        let config = MergeConfig::default();
        let progress = MergeProgress::new();
        let paths = ManifestPaths::in_dir(tmp.path(), "target");
        let out = tmp.path().join("target.jar");

        let err = plan(&archives, &[], &config, &progress)
            .run(&out, &paths)
            .unwrap_err();

        assert!(matches!(err, ArchiveError::Corrupt { .. }));
        assert_eq!(err.path(), bad.canonicalize().unwrap());
        assert!(!out.exists());
        assert!(!paths.exist());
    }
}
