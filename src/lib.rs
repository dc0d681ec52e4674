//! Jarsplit - classpath materialization and differencing for JVM builds
//!
//! This crate merges the compiled classes and dependency archives of two
//! build variants (a target artifact and a probe that exercises it) into
//! one archive each, keeping the probe free of dependencies the target
//! already ships and reporting classes defined on both sides.

pub mod archive;
pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for Jarsplit unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It builds real archives and class directories on disk.
#[cfg(test)]
pub mod test_support;

pub use archive::{ArchiveEntryReader, ArchiveError, ArchiveWriter};
pub use builder::{ProbeArchiveBuilder, VariantArchiveBuilder};
pub use crate::core::{ArchiveEntryName, ArchiveIdentity, VariantInputs, VariantManifest};
pub use ops::{detect_duplicates, distinct_dependencies, split};
pub use util::config::Config;
