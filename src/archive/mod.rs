//! Jar/zip container access.
//!
//! Reading existing dependency archives, and writing merged archives with
//! stored class entries and zip64 support.

pub mod error;
pub mod reader;
pub mod source;
pub mod writer;

pub use error::{ArchiveError, ArchiveResult};
pub use reader::{ArchiveEntry, ArchiveEntryReader};
pub use source::{ClassSource, EntrySource};
pub use writer::ArchiveWriter;
