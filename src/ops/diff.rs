//! Dependency differencing between the target and probe variants.
//!
//! The probe only needs the dependency archives the target does not already
//! consume. Archives are compared by [`ArchiveIdentity`] (canonical path),
//! never by content.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::identity::{dedup_identities, ArchiveIdentity};
use crate::util::diagnostic::Diagnostic;

/// Probe dependency archives that the target does not consume.
///
/// Keeps the probe's first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctDependencySet {
    archives: Vec<(PathBuf, ArchiveIdentity)>,
}

impl DistinctDependencySet {
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Archive paths as supplied by the caller, in probe order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.archives.iter().map(|(path, _)| path.clone()).collect()
    }

    /// Identities in probe order.
    pub fn identities(&self) -> impl Iterator<Item = &ArchiveIdentity> {
        self.archives.iter().map(|(_, id)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ArchiveIdentity)> {
        self.archives.iter().map(|(path, id)| (path.as_path(), id))
    }

    pub fn contains(&self, identity: &ArchiveIdentity) -> bool {
        self.archives.iter().any(|(_, id)| id == identity)
    }

    /// Sorted identity lines for the diagnostics output.
    pub fn sorted_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.identities().map(|id| id.to_manifest_line()).collect();
        lines.sort();
        lines
    }
}

/// Compute the probe archives whose identity is absent from `target`.
///
/// The probe list is deduplicated by identity first. The result is a subset
/// of `probe`, disjoint from `target`, in `probe`'s first-occurrence order.
pub fn distinct_dependencies(
    target: &BTreeSet<ArchiveIdentity>,
    probe: &[PathBuf],
) -> DistinctDependencySet {
    let archives = dedup_identities(probe)
        .into_iter()
        .filter(|(_, id)| !target.contains(id))
        .collect::<Vec<_>>();

    tracing::debug!(
        "{} of {} probe dependencies are not used by the target",
        archives.len(),
        probe.len()
    );

    DistinctDependencySet { archives }
}

/// A warning when the probe had dependencies but none were distinct.
///
/// This is valid (the probe may depend only on what the target already
/// ships) but usually points at mismatched inputs.
pub fn empty_diff_diagnostic(
    distinct: &DistinctDependencySet,
    probe: &[PathBuf],
) -> Option<Diagnostic> {
    if !distinct.is_empty() || probe.is_empty() {
        return None;
    }
    Some(
        Diagnostic::warning(format!(
            "all {} probe dependencies are already used by the target",
            probe.len()
        ))
        .with_context("the probe archive will only contain the probe's own classes"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(lines: &[&str]) -> BTreeSet<ArchiveIdentity> {
        lines
            .iter()
            .map(|l| ArchiveIdentity::from_manifest_line(l))
            .collect()
    }

    fn paths(lines: &[&str]) -> Vec<PathBuf> {
        lines.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_filters_target_archives() {
        let target = ids(&["/deps/lib-a.jar"]);
        let probe = paths(&["/deps/lib-a.jar", "/deps/lib-b.jar"]);

        let distinct = distinct_dependencies(&target, &probe);

        assert_eq!(distinct.paths(), paths(&["/deps/lib-b.jar"]));
        assert_eq!(distinct.sorted_lines(), vec!["/deps/lib-b.jar"]);
    }

    #[test]
    fn test_keeps_probe_order_and_dedups() {
        let target = ids(&["/deps/x.jar"]);
        let probe = paths(&["/deps/c.jar", "/deps/a.jar", "/deps/c.jar", "/deps/b.jar"]);

        let distinct = distinct_dependencies(&target, &probe);

        assert_eq!(
            distinct.paths(),
            paths(&["/deps/c.jar", "/deps/a.jar", "/deps/b.jar"])
        );
        assert_eq!(
            distinct.sorted_lines(),
            vec!["/deps/a.jar", "/deps/b.jar", "/deps/c.jar"]
        );
    }

    #[test]
    fn test_same_name_different_path_is_distinct() {
        let target = ids(&["/repo/v1/lib.jar"]);
        let probe = paths(&["/repo/v2/lib.jar"]);

        assert_eq!(distinct_dependencies(&target, &probe).len(), 1);
    }

    #[test]
    fn test_empty_diff_warning() {
        let target = ids(&["/deps/a.jar"]);
        let probe = paths(&["/deps/a.jar"]);
        let distinct = distinct_dependencies(&target, &probe);

        let diag = empty_diff_diagnostic(&distinct, &probe).unwrap();
        assert!(diag.format(false).starts_with("warning: all 1 probe"));

        assert!(empty_diff_diagnostic(&distinct, &[]).is_none());
    }

    proptest! {
        #[test]
        fn diff_is_subset_disjoint_and_ordered(
            target in prop::collection::btree_set("[a-e]", 0..5),
            probe in prop::collection::vec("[a-h]", 0..12),
        ) {
            let target: BTreeSet<ArchiveIdentity> = target
                .iter()
                .map(|n| ArchiveIdentity::from_manifest_line(&format!("/deps/{}.jar", n)))
                .collect();
            let probe: Vec<PathBuf> = probe
                .iter()
                .map(|n| PathBuf::from(format!("/deps/{}.jar", n)))
                .collect();

            let distinct = distinct_dependencies(&target, &probe);
            let result = distinct.paths();

            for path in &result {
                prop_assert!(probe.contains(path));
            }
            for id in distinct.identities() {
                prop_assert!(!target.contains(id));
            }

            let mut expected: Vec<PathBuf> = Vec::new();
            for path in &probe {
                let id = ArchiveIdentity::of(path);
                if !target.contains(&id) && !expected.contains(path) {
                    expected.push(path.clone());
                }
            }
            prop_assert_eq!(result, expected);
        }
    }
}
