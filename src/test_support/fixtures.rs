//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built application layouts for split tests.

use std::path::{Path, PathBuf};

use super::{write_class_dir, write_jar};
use crate::core::VariantInputs;

/// An application with a test suite, laid out on disk.
///
/// ```text
/// classes/com/example/App.class
/// test-classes/com/example/AppTest.class
/// libs/lib-a.jar   com/lib/Util.class
/// libs/lib-b.jar   com/helper/Helper.class
/// ```
///
/// The application depends on `lib-a`; the tests depend on `lib-a` and
/// `lib-b`.
#[derive(Debug, Clone)]
pub struct SplitFixture {
    pub root: PathBuf,
    pub classes: PathBuf,
    pub test_classes: PathBuf,
    pub lib_a: PathBuf,
    pub lib_b: PathBuf,
    pub manifest_dir: PathBuf,
}

impl SplitFixture {
    /// Write the layout below `root`.
    pub fn write_to(root: &Path) -> Self {
        let fixture = SplitFixture {
            root: root.to_path_buf(),
            classes: root.join("classes"),
            test_classes: root.join("test-classes"),
            lib_a: root.join("libs/lib-a.jar"),
            lib_b: root.join("libs/lib-b.jar"),
            manifest_dir: root.join("out"),
        };

        write_class_dir(&fixture.classes, &[("com/example/App.class", "app")]);
        write_class_dir(
            &fixture.test_classes,
            &[("com/example/AppTest.class", "app-test")],
        );
        write_jar(
            &fixture.lib_a,
            &[
                ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
                ("com/lib/Util.class", "util"),
            ],
        );
        write_jar(&fixture.lib_b, &[("com/helper/Helper.class", "helper")]);

        fixture
    }

    pub fn target_inputs(&self) -> VariantInputs {
        VariantInputs::new()
            .class_dir(&self.classes)
            .dependency(&self.lib_a)
    }

    pub fn probe_inputs(&self) -> VariantInputs {
        VariantInputs::new()
            .class_dir(&self.test_classes)
            .dependency(&self.lib_a)
            .dependency(&self.lib_b)
    }

    pub fn target_output(&self) -> PathBuf {
        self.root.join("out/target.jar")
    }

    pub fn probe_output(&self) -> PathBuf {
        self.root.join("out/probe.jar")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_fixture_layout() {
        let tmp = TempDir::new().unwrap();
        let fixture = SplitFixture::write_to(tmp.path());

        assert!(fixture.classes.join("com/example/App.class").is_file());
        assert!(fixture.lib_a.is_file());
        assert_eq!(fixture.probe_inputs().dependency_archives.len(), 2);
        assert_eq!(fixture.target_inputs().class_dirs, vec![fixture.classes]);
    }
}
