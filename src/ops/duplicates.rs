//! Duplicate class detection.
//!
//! After the probe archive is built, any class entry that also exists in the
//! target archive came in through a different dependency on each side. Both
//! copies end up on the runtime classpath of the probe, and only one of them
//! is seen by whatever processes the target archive.

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::entry_name::{ArchiveEntryName, MODULE_INFO};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Class entries present in both the target and the probe archive.
///
/// Empty is the healthy state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateClassReport {
    classes: BTreeSet<ArchiveEntryName>,
}

impl DuplicateClassReport {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Duplicated entries, sorted.
    pub fn classes(&self) -> &BTreeSet<ArchiveEntryName> {
        &self.classes
    }

    /// A warning describing the duplicates, or `None` when there are none.
    ///
    /// `report` is the diagnostics file listing them, if one was written.
    pub fn to_diagnostic(&self, report: Option<&Path>) -> Option<Diagnostic> {
        if self.is_empty() {
            return None;
        }

        let mut diag = Diagnostic::warning(format!(
            "{} {} defined in both the target and the probe archive",
            self.len(),
            if self.len() == 1 { "class is" } else { "classes are" }
        ))
        .with_context(
            "the probe's copy is the one used at runtime, while only the target's copy is analyzed",
        )
        .with_suggestion(suggestions::ALIGN_DEPENDENCIES);

        match report {
            Some(path) => diag = diag.with_location(path),
            None => {
                for class in self.classes.iter().take(5) {
                    diag = diag.with_context(format!("duplicate: {}", class));
                }
            }
        }
        Some(diag)
    }
}

/// Intersect the target's classes with the probe's merged classes.
///
/// `module-info.class` is never reported, nor is anything in `ignore`.
pub fn detect_duplicates(
    target: &BTreeSet<ArchiveEntryName>,
    probe: &BTreeSet<ArchiveEntryName>,
    ignore: &[String],
) -> DuplicateClassReport {
    let classes = target
        .intersection(probe)
        .filter(|name| name.as_str() != MODULE_INFO)
        .filter(|name| !ignore.iter().any(|i| i == name.as_str()))
        .cloned()
        .collect();

    DuplicateClassReport { classes }
}
