//! The target/probe split pipeline.
//!
//! The target step must finish before the probe step starts: the probe reads
//! the target's persisted dependency manifest from the manifest directory.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::builder::{MergeOutput, ProbeArchiveBuilder, ProbeOutput, VariantArchiveBuilder};
use crate::core::entry_name::ArchiveEntryName;
use crate::core::identity::dedup_identities;
use crate::core::job::Job;
use crate::core::manifest::{ManifestPaths, VariantManifest};
use crate::core::variant::{VariantInputs, VariantKind};
use crate::ops::diagnostics::DiagnosticsWriter;
use crate::ops::diff::empty_diff_diagnostic;
use crate::ops::duplicates::{detect_duplicates, DuplicateClassReport};
use crate::util::config::Config;

/// One variant to merge.
#[derive(Debug, Clone)]
pub struct VariantOptions {
    pub inputs: VariantInputs,

    /// Merged archive to produce
    pub output: PathBuf,
}

/// Options shared by both steps.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Where manifests (and, by default, diagnostics) are kept
    pub manifest_dir: PathBuf,

    pub config: Config,
}

impl SplitOptions {
    fn diagnostics(&self) -> DiagnosticsWriter {
        DiagnosticsWriter::new(self.config.diagnostics.output_dir(&self.manifest_dir))
    }

    fn manifest_paths(&self, kind: VariantKind) -> ManifestPaths {
        ManifestPaths::for_variant(&self.manifest_dir, kind)
    }
}

/// Result of the target step.
#[derive(Debug, Clone)]
pub struct TargetResult {
    pub merge: MergeOutput,

    /// Diagnostics files written
    pub diagnostics: Vec<PathBuf>,
}

/// Result of the probe step.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub probe: ProbeOutput,
    pub duplicates: DuplicateClassReport,

    /// Diagnostics files written
    pub diagnostics: Vec<PathBuf>,
}

/// Result of both steps.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub target: TargetResult,
    pub probe: ProbeResult,
}

/// Merge the target variant and persist its manifest.
pub fn build_target(variant: &VariantOptions, opts: &SplitOptions) -> Result<TargetResult> {
    let paths = opts.manifest_paths(VariantKind::Target);

    let merge = VariantArchiveBuilder::target(variant.inputs.clone())
        .with_config(opts.config.merge.clone())
        .build(&variant.output, &paths)
        .with_context(|| format!("failed to build target archive {}", variant.output.display()))?;

    let writer = opts.diagnostics();
    let diagnostics = [
        writer.emit("classes.txt", names(merge.manifest.classes())),
        writer.emit("dependency_classes.txt", names(&merge.dependency_classes)),
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(TargetResult { merge, diagnostics })
}

/// Merge the probe variant against the target manifest already on disk,
/// then check the two archives for duplicate classes.
///
/// Duplicates are reported as a warning and never fail the step.
pub fn build_probe(variant: &VariantOptions, opts: &SplitOptions) -> Result<ProbeResult> {
    let target_paths = opts.manifest_paths(VariantKind::Target);
    let probe_paths = opts.manifest_paths(VariantKind::Probe);

    let builder = ProbeArchiveBuilder::from_target_manifest(variant.inputs.clone(), &target_paths)
        .with_context(|| {
            format!(
                "failed to load the target manifest from {}",
                opts.manifest_dir.display()
            )
        })?
        .with_config(opts.config.merge.clone());

    let probe = builder
        .build(&variant.output, &probe_paths)
        .with_context(|| format!("failed to build probe archive {}", variant.output.display()))?;

    let raw = &variant.inputs.dependency_archives;
    if let Some(diag) = empty_diff_diagnostic(&probe.distinct, raw) {
        diag.log();
    }

    let writer = opts.diagnostics();
    let mut diagnostics: Vec<PathBuf> = [
        writer.emit(
            "jars.txt",
            dedup_identities(raw)
                .into_iter()
                .map(|(_, identity)| identity.to_manifest_line()),
        ),
        writer.emit("distinct_jars.txt", probe.distinct.sorted_lines()),
        writer.emit("probe_classes.txt", names(probe.merge.manifest.classes())),
    ]
    .into_iter()
    .flatten()
    .collect();

    let duplicates = match VariantManifest::load_classes(&target_paths.classes) {
        Ok(target_classes) => detect_duplicates(
            &target_classes,
            probe.merge.manifest.classes(),
            &opts.config.diagnostics.ignore_duplicates,
        ),
        Err(e) => {
            tracing::warn!("skipping duplicate class check: {}", e);
            DuplicateClassReport::default()
        }
    };

    if !duplicates.is_empty() {
        let report = writer.emit("duplicate_classes.txt", names(duplicates.classes()));
        if let Some(diag) = duplicates.to_diagnostic(report.as_deref()) {
            diag.log();
        }
        diagnostics.extend(report);
    }

    Ok(ProbeResult {
        probe,
        duplicates,
        diagnostics,
    })
}

/// Run the target step, then the probe step.
pub fn split(
    target: &VariantOptions,
    probe: &VariantOptions,
    opts: &SplitOptions,
) -> Result<SplitResult> {
    let start = Instant::now();

    let target = build_target(target, opts)?;
    let probe = build_probe(probe, opts)?;

    tracing::info!(
        "split finished in {:.2}s: {} distinct probe dependencies, {} duplicate classes",
        start.elapsed().as_secs_f64(),
        probe.probe.distinct.len(),
        probe.duplicates.len()
    );

    Ok(SplitResult { target, probe })
}

/// Run both steps as described by a job file.
pub fn run_job(job: &Job) -> Result<SplitResult> {
    let target = VariantOptions {
        inputs: job.target.inputs(),
        output: job.target.output.clone(),
    };
    let probe = VariantOptions {
        inputs: job.probe.inputs(),
        output: job.probe.output.clone(),
    };
    let opts = SplitOptions {
        manifest_dir: job.output.manifest_dir.clone(),
        config: job.config.clone(),
    };
    split(&target, &probe, &opts)
}

fn names(classes: &BTreeSet<ArchiveEntryName>) -> impl Iterator<Item = &str> {
    classes.iter().map(ArchiveEntryName::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{read_jar, write_jar, SplitFixture};
    use tempfile::TempDir;

    fn options(
        fixture: &SplitFixture,
        emit: bool,
    ) -> (VariantOptions, VariantOptions, SplitOptions) {
        let mut config = Config::default();
        config.diagnostics.emit = emit;
        (
            VariantOptions {
                inputs: fixture.target_inputs(),
                output: fixture.target_output(),
            },
            VariantOptions {
                inputs: fixture.probe_inputs(),
                output: fixture.probe_output(),
            },
            SplitOptions {
                manifest_dir: fixture.manifest_dir.clone(),
                config,
            },
        )
    }

    #[test]
    fn test_split_scenario() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        let (target, probe, opts) = options(&fixture, true);

        let result = split(&target, &probe, &opts).unwrap();

        assert!(result.probe.duplicates.is_empty());
        assert_eq!(result.probe.probe.distinct.len(), 1);

        let target_jars =
            std::fs::read_to_string(fixture.manifest_dir.join("target-jars.txt")).unwrap();
        assert_eq!(
            target_jars,
            format!("{}\n", fixture.lib_a.canonicalize().unwrap().display())
        );

        let diagnostics = fixture.manifest_dir.join("diagnostics");
        assert_eq!(
            std::fs::read_to_string(diagnostics.join("classes.txt")).unwrap(),
            "com/example/App.class\ncom/lib/Util.class\n"
        );
        assert_eq!(
            std::fs::read_to_string(diagnostics.join("probe_classes.txt")).unwrap(),
            "com/example/AppTest.class\ncom/helper/Helper.class\n"
        );
        assert_eq!(
            std::fs::read_to_string(diagnostics.join("distinct_jars.txt")).unwrap(),
            format!("{}\n", fixture.lib_b.canonicalize().unwrap().display())
        );
        assert!(!diagnostics.join("duplicate_classes.txt").exists());
        assert_eq!(result.target.diagnostics.len(), 2);
        assert_eq!(result.probe.diagnostics.len(), 3);
    }

    #[test]
    fn test_listed_jars_collapse_by_identity() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        let (target, mut probe, opts) = options(&fixture, true);
        let respelled = fixture.lib_a.parent().unwrap().join(".").join("lib-a.jar");
        probe.inputs = probe
            .inputs
            .dependency(&fixture.lib_b)
            .dependency(respelled);

        split(&target, &probe, &opts).unwrap();

        let listed =
            std::fs::read_to_string(fixture.manifest_dir.join("diagnostics/jars.txt")).unwrap();
        let mut expected = vec![
            fixture.lib_a.canonicalize().unwrap().display().to_string(),
            fixture.lib_b.canonicalize().unwrap().display().to_string(),
        ];
        expected.sort();
        assert_eq!(listed, format!("{}\n", expected.join("\n")));
    }

    #[test]
    fn test_no_diagnostics_by_default() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        let (target, probe, opts) = options(&fixture, false);

        let result = split(&target, &probe, &opts).unwrap();

        assert!(result.target.diagnostics.is_empty());
        assert!(!fixture.manifest_dir.join("diagnostics").exists());
    }

    #[test]
    fn test_duplicates_are_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        // A second artifact shipping the same class as lib-a.
        let fork = tmp.path().join("libs/lib-a-fork.jar");
        write_jar(&fork, &[("com/lib/Util.class", "fork"), ("module-info.class", "m")]);
        write_jar(
            &fixture.lib_a,
            &[("com/lib/Util.class", "util"), ("module-info.class", "m")],
        );

        let (target, mut probe, opts) = options(&fixture, true);
        probe.inputs = probe.inputs.dependency(&fork);

        let result = split(&target, &probe, &opts).unwrap();

        let duplicates: Vec<_> = result
            .probe
            .duplicates
            .classes()
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(duplicates, vec!["com/lib/Util.class"]);
        assert_eq!(
            std::fs::read_to_string(
                fixture
                    .manifest_dir
                    .join("diagnostics/duplicate_classes.txt")
            )
            .unwrap(),
            "com/lib/Util.class\n"
        );
        assert_eq!(read_jar(&fixture.probe_output())["com/lib/Util.class"], b"fork");
    }

    #[test]
    fn test_probe_requires_target() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        let (_, probe, opts) = options(&fixture, false);

        let err = build_probe(&probe, &opts).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("failed to load the target manifest"));
        assert!(message.contains("target-jars.txt"));
        assert!(!fixture.probe_output().exists());
    }

    #[test]
    fn test_run_job() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());
        let job_path = tmp.path().join("job.toml");
        std::fs::write(
            &job_path,
            r#"
[target]
classes = ["classes"]
jars = ["libs/lib-a.jar"]
output = "out/target.jar"

[probe]
classes = ["test-classes"]
jars = ["libs/lib-a.jar", "libs/lib-b.jar"]
output = "out/probe.jar"

[output]
manifest_dir = "out"
"#,
        )
        .unwrap();

        let job = Job::load(&job_path).unwrap();
        let result = run_job(&job).unwrap();

        assert_eq!(result.target.merge.manifest.classes().len(), 2);
        assert!(fixture.probe_output().is_file());
    }
}
