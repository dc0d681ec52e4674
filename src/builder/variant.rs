//! Merged archive for a single variant.

use std::path::{Path, PathBuf};

use crate::archive::error::ArchiveResult;
use crate::builder::merge::{MergeOutput, MergePlan};
use crate::builder::progress::MergeProgress;
use crate::core::identity::dedup_identities;
use crate::core::manifest::ManifestPaths;
use crate::core::variant::{VariantInputs, VariantKind};
use crate::util::config::MergeConfig;

/// Flattens a variant's class directories and dependency archives into one
/// archive and records what went in.
///
/// Dependency archives are applied in the order given, after collapsing
/// duplicates by identity, and class directories after them. A class file in
/// a compiled-output directory therefore always replaces a dependency class
/// of the same name.
pub struct VariantArchiveBuilder {
    kind: VariantKind,
    inputs: VariantInputs,
    config: MergeConfig,
    progress: MergeProgress,
}

impl VariantArchiveBuilder {
    pub fn new(kind: VariantKind, inputs: VariantInputs) -> Self {
        VariantArchiveBuilder {
            kind,
            inputs,
            config: MergeConfig::default(),
            progress: MergeProgress::new(),
        }
    }

    /// A builder for the target variant.
    pub fn target(inputs: VariantInputs) -> Self {
        VariantArchiveBuilder::new(VariantKind::Target, inputs)
    }

    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inputs(&self) -> &VariantInputs {
        &self.inputs
    }

    /// Progress counters, updated while [`build`](Self::build) runs.
    pub fn progress(&self) -> &MergeProgress {
        &self.progress
    }

    /// Write the merged archive to `output` and the manifest to `paths`.
    ///
    /// Any unreadable input fails the build; no archive or manifest is
    /// written in that case.
    pub fn build(&self, output: &Path, paths: &ManifestPaths) -> ArchiveResult<MergeOutput> {
        let archives: Vec<PathBuf> = dedup_identities(&self.inputs.dependency_archives)
            .into_iter()
            .map(|(path, _)| path)
            .collect();

        let collapsed = self.inputs.dependency_archives.len() - archives.len();
        if collapsed > 0 {
            tracing::debug!("collapsed {} duplicate dependency archives", collapsed);
        }

        MergePlan {
            kind: self.kind,
            archives: &archives,
            class_dirs: &self.inputs.class_dirs,
            config: &self.config,
            progress: &self.progress,
        }
        .run(output, paths)
    }
}
