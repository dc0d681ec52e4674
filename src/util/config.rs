//! Merge configuration.
//!
//! The library takes a [`Config`] value directly; the `jarsplit` binary reads
//! the same structure from the `[merge]` and `[diagnostics]` tables of a job
//! file.
//!
//! ```toml
//! [merge]
//! jobs = 8
//! incremental = true
//!
//! [diagnostics]
//! emit = true
//! dir = "build/jarsplit/diagnostics"
//! ignore_duplicates = ["kotlin/Metadata.class"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Jarsplit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Merge settings
    pub merge: MergeConfig,

    /// Diagnostic output settings
    pub diagnostics: DiagnosticsConfig,
}

/// Settings for building merged archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Worker threads for scanning inputs (None = one per core)
    pub jobs: Option<usize>,

    /// Skip merging when the inputs match the last recorded fingerprint
    pub incremental: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            jobs: None,
            incremental: true,
        }
    }
}

/// Settings for the optional diagnostic text files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write class lists, dependency lists and duplicate reports
    pub emit: bool,

    /// Where to write them (defaults to `<manifest dir>/diagnostics`)
    pub dir: Option<PathBuf>,

    /// Extra entry names to leave out of the duplicate-class report
    pub ignore_duplicates: Vec<String>,
}

impl DiagnosticsConfig {
    /// The directory diagnostics go to, or `None` when disabled.
    pub fn output_dir(&self, manifest_dir: &Path) -> Option<PathBuf> {
        if !self.emit {
            return None;
        }
        Some(
            self.dir
                .clone()
                .unwrap_or_else(|| manifest_dir.join("diagnostics")),
        )
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Enable or disable diagnostics, keeping the other settings.
    pub fn with_diagnostics(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.diagnostics.emit = true;
            self.diagnostics.dir = Some(dir);
        }
        self
    }

    /// Override the worker count.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if jobs.is_some() {
            self.merge.jobs = jobs;
        }
        self
    }
}
