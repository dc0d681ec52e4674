//! Job files for the `jarsplit run` command.
//!
//! A job file describes both variants and where the outputs go:
//!
//! ```toml
//! [target]
//! classes = ["app/build/classes"]
//! jars = ["libs/lib-a.jar"]
//! output = "build/jarsplit/target.jar"
//!
//! [probe]
//! classes = ["app/build/test-classes"]
//! jars = ["libs/lib-a.jar", "libs/lib-b.jar"]
//! output = "build/jarsplit/probe.jar"
//!
//! [output]
//! manifest_dir = "build/jarsplit"
//!
//! [diagnostics]
//! emit = true
//! ```
//!
//! Relative paths are resolved against the directory containing the job file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::variant::VariantInputs;
use crate::util::config::Config;

/// One variant in a job file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantJob {
    /// Compiled class directories
    #[serde(default)]
    pub classes: Vec<PathBuf>,

    /// Dependency archives
    #[serde(default)]
    pub jars: Vec<PathBuf>,

    /// Merged archive to produce
    pub output: PathBuf,
}

impl VariantJob {
    pub fn inputs(&self) -> VariantInputs {
        VariantInputs {
            class_dirs: self.classes.clone(),
            dependency_archives: self.jars.clone(),
        }
    }

    fn resolve(&mut self, base: &Path) {
        for dir in &mut self.classes {
            *dir = base.join(&*dir);
        }
        for jar in &mut self.jars {
            *jar = base.join(&*jar);
        }
        self.output = base.join(&self.output);
    }
}

/// Where manifests are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputJob {
    pub manifest_dir: PathBuf,
}

/// A complete split job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub target: VariantJob,
    pub probe: VariantJob,
    pub output: OutputJob,

    #[serde(flatten)]
    pub config: Config,
}

impl Job {
    /// Load a job file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read job file: {}", path.display()))?;

        let mut job: Job = toml::from_str(&contents)
            .with_context(|| format!("failed to parse job file: {}", path.display()))?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        job.resolve(base);
        Ok(job)
    }

    fn resolve(&mut self, base: &Path) {
        self.target.resolve(base);
        self.probe.resolve(base);
        self.output.manifest_dir = base.join(&self.output.manifest_dir);
        if let Some(dir) = self.config.diagnostics.dir.as_mut() {
            *dir = base.join(&*dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JOB: &str = r#"
[target]
classes = ["app/classes"]
jars = ["libs/lib-a.jar"]
output = "out/target.jar"

[probe]
classes = ["app/test-classes"]
jars = ["libs/lib-a.jar", "/abs/lib-b.jar"]
output = "out/probe.jar"

[output]
manifest_dir = "out"

[merge]
jobs = 4

[diagnostics]
emit = true
"#;

    #[test]
    fn test_load_resolves_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("job.toml");
        std::fs::write(&path, JOB).unwrap();

        let job = Job::load(&path).unwrap();

        assert_eq!(job.target.classes, vec![tmp.path().join("app/classes")]);
        assert_eq!(job.target.output, tmp.path().join("out/target.jar"));
        assert_eq!(job.probe.jars[1], PathBuf::from("/abs/lib-b.jar"));
        assert_eq!(job.output.manifest_dir, tmp.path().join("out"));
        assert_eq!(job.config.merge.jobs, Some(4));
        assert!(job.config.merge.incremental);
        assert!(job.config.diagnostics.emit);
    }

    #[test]
    fn test_inputs() {
        let job: Job = toml::from_str(JOB).unwrap();
        let inputs = job.probe.inputs();
        assert_eq!(inputs.class_dirs, vec![PathBuf::from("app/test-classes")]);
        assert_eq!(inputs.dependency_archives.len(), 2);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("job.toml");
        std::fs::write(&path, "[target]\noutput = \"t.jar\"\n").unwrap();

        let err = Job::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse job file"));
    }
}
