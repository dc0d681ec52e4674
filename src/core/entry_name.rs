//! Canonical class entry names.
//!
//! Every class that ends up in a merged archive is keyed by an
//! [`ArchiveEntryName`]: a forward-slash separated relative path ending in
//! `.class`. Names coming from a filesystem walk and names coming from an
//! existing archive go through the same [`normalize`] function, so the two
//! kinds of sources agree on what "the same class" means.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Suffix every class entry must carry.
pub const CLASS_SUFFIX: &str = ".class";

/// Path segment that marks archive metadata rather than classes.
pub const META_INF: &str = "META-INF";

/// Module descriptor class. Present in many archives and never a real
/// duplicate, so the duplicate report always skips it.
pub const MODULE_INFO: &str = "module-info.class";

/// A normalized class entry name, e.g. `com/example/App.class`.
///
/// Invariants: no leading slash, no drive letter, only `/` separators, no
/// empty, `.` or `..` segments, no `META-INF` segment, ends in `.class`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchiveEntryName(String);

impl ArchiveEntryName {
    /// Normalize a raw name, see [`normalize`].
    pub fn parse(raw: &str) -> Option<Self> {
        normalize(raw)
    }

    /// The entry name as stored in the archive.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, e.g. `App.class`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ArchiveEntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArchiveEntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ArchiveEntryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<ArchiveEntryName> for String {
    fn from(name: ArchiveEntryName) -> String {
        name.0
    }
}

impl TryFrom<String> for ArchiveEntryName {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        normalize(&raw).ok_or_else(|| format!("`{}` is not a class entry name", raw))
    }
}

/// Convert a raw path or archive entry name into a class entry name.
///
/// Returns `None` for directories (trailing separator), anything that does
/// not end in `.class`, any name with a `META-INF` segment, and names that
/// escape their root with `..`. Both `/` and `\` are treated as separators,
/// so the result does not depend on the host platform.
///
/// Never panics, and `normalize(n.as_str()) == Some(n)` for every returned `n`.
pub fn normalize(raw: &str) -> Option<ArchiveEntryName> {
    let unified = raw.replace('\\', "/");
    if unified.ends_with('/') {
        return None;
    }

    let mut segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    // Drive prefixes (`C:`) may be stacked, or exposed again once a leading
    // slash is gone, so strip until the first segment is clean.
    while let Some(first) = segments.first().copied() {
        match strip_drive(first) {
            Some(rest) if rest.is_empty() || rest == "." => {
                segments.remove(0);
            }
            Some(rest) => segments[0] = rest,
            None => break,
        }
    }

    if segments.iter().any(|s| *s == ".." || *s == META_INF) {
        return None;
    }

    let file_name = segments.last()?;
    if file_name.len() <= CLASS_SUFFIX.len() || !file_name.ends_with(CLASS_SUFFIX) {
        return None;
    }

    Some(ArchiveEntryName(segments.join("/")))
}

/// Normalize a file found under `root` into its entry name.
///
/// The entry name is the path relative to `root`; files outside `root`
/// are rejected.
pub fn normalize_relative(root: &Path, file: &Path) -> Option<ArchiveEntryName> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => continue,
            _ => return None,
        }
    }
    normalize(&parts.join("/"))
}

/// Strip a leading `X:` drive designator.
fn strip_drive(segment: &str) -> Option<&str> {
    let bytes = segment.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(&segment[2..])
    } else {
        None
    }
}
