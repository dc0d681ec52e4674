//! High-level operations.
//!
//! This module contains the dependency diff, duplicate detection and the
//! split pipeline the `jarsplit` commands run.

pub mod diagnostics;
pub mod diff;
pub mod duplicates;
pub mod split;

pub use diagnostics::DiagnosticsWriter;
pub use diff::{distinct_dependencies, DistinctDependencySet};
pub use duplicates::{detect_duplicates, DuplicateClassReport};
pub use split::{
    build_probe, build_target, run_job, split, ProbeResult, SplitOptions, SplitResult,
    TargetResult, VariantOptions,
};
