//! Merged archive for the probe variant.

use std::collections::BTreeSet;
use std::path::Path;

use crate::archive::error::ArchiveResult;
use crate::builder::merge::{MergeOutput, MergePlan};
use crate::builder::progress::MergeProgress;
use crate::core::identity::ArchiveIdentity;
use crate::core::manifest::{ManifestPaths, VariantManifest};
use crate::core::variant::{VariantInputs, VariantKind};
use crate::ops::diff::{distinct_dependencies, DistinctDependencySet};
use crate::util::config::MergeConfig;

/// Result of building the probe archive.
#[derive(Debug, Clone)]
pub struct ProbeOutput {
    /// Probe dependencies that were merged
    pub distinct: DistinctDependencySet,
    pub merge: MergeOutput,
}

/// Builds the probe archive from the probe's own classes and only those
/// dependency archives the target does not already consume.
pub struct ProbeArchiveBuilder {
    inputs: VariantInputs,
    target_dependencies: BTreeSet<ArchiveIdentity>,
    config: MergeConfig,
    progress: MergeProgress,
}

impl ProbeArchiveBuilder {
    pub fn new(inputs: VariantInputs, target_dependencies: BTreeSet<ArchiveIdentity>) -> Self {
        ProbeArchiveBuilder {
            inputs,
            target_dependencies,
            config: MergeConfig::default(),
            progress: MergeProgress::new(),
        }
    }

    /// Read the target's dependency set from its persisted manifest.
    pub fn from_target_manifest(
        inputs: VariantInputs,
        target: &ManifestPaths,
    ) -> ArchiveResult<Self> {
        let dependencies = VariantManifest::load_dependencies(&target.dependencies)?;
        Ok(ProbeArchiveBuilder::new(inputs, dependencies))
    }

    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inputs(&self) -> &VariantInputs {
        &self.inputs
    }

    pub fn progress(&self) -> &MergeProgress {
        &self.progress
    }

    /// The probe dependencies that will be merged.
    pub fn distinct(&self) -> DistinctDependencySet {
        distinct_dependencies(&self.target_dependencies, &self.inputs.dependency_archives)
    }

    /// Write the probe archive to `output` and its manifest to `paths`.
    pub fn build(&self, output: &Path, paths: &ManifestPaths) -> ArchiveResult<ProbeOutput> {
        let distinct = self.distinct();
        let archives = distinct.paths();

        let merge = MergePlan {
            kind: VariantKind::Probe,
            archives: &archives,
            class_dirs: &self.inputs.class_dirs,
            config: &self.config,
            progress: &self.progress,
        }
        .run(output, paths)?;

        Ok(ProbeOutput { distinct, merge })
    }
}
