//! Variant inputs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which side of the split a variant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// The artifact under analysis, e.g. an application.
    Target,
    /// The artifact whose usages are traced against it, e.g. its test suite.
    Probe,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Target => "target",
            VariantKind::Probe => "probe",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The compiled output and resolved dependencies of one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInputs {
    /// Roots of compiled class output, in precedence order (later wins)
    #[serde(default)]
    pub class_dirs: Vec<PathBuf>,

    /// Resolved dependency archives, in precedence order (later wins)
    #[serde(default)]
    pub dependency_archives: Vec<PathBuf>,
}

impl VariantInputs {
    pub fn new() -> Self {
        VariantInputs::default()
    }

    /// Add a compiled class directory.
    pub fn class_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.class_dirs.push(dir.into());
        self
    }

    /// Add a dependency archive.
    pub fn dependency(mut self, archive: impl Into<PathBuf>) -> Self {
        self.dependency_archives.push(archive.into());
        self
    }
}
