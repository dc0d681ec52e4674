//! Core data structures for Jarsplit.
//!
//! This module contains the foundational types used throughout Jarsplit:
//! - Class entry names and their normalization
//! - Dependency archive identities
//! - Variant inputs and persisted manifests
//! - Job files for the command-line driver

pub mod entry_name;
pub mod identity;
pub mod job;
pub mod manifest;
pub mod variant;

pub use entry_name::{normalize, ArchiveEntryName, MODULE_INFO};
pub use identity::ArchiveIdentity;
pub use job::Job;
pub use manifest::{ManifestPaths, VariantManifest};
pub use variant::{VariantInputs, VariantKind};
