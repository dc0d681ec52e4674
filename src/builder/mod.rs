//! Merged archive builders.
//!
//! This module turns a variant's compiled class directories and dependency
//! archives into a single merged archive plus its manifest.

pub mod fingerprint;
mod merge;
pub mod probe;
pub mod progress;
pub mod sources;
pub mod variant;

pub use fingerprint::MergeFingerprint;
pub use merge::MergeOutput;
pub use probe::{ProbeArchiveBuilder, ProbeOutput};
pub use progress::MergeProgress;
pub use variant::VariantArchiveBuilder;
