//! Filesystem utilities.
//!
//! Everything that lands next to a build output goes through a temporary
//! file in the destination directory and is renamed into place, so an
//! interrupted step never leaves a half-written file behind.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Create a temporary file in the directory that will hold `dest`.
pub fn temp_file_beside(dest: &Path) -> io::Result<NamedTempFile> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;
    tempfile::Builder::new()
        .prefix(".jarsplit-")
        .suffix(".tmp")
        .tempfile_in(parent)
}

/// Atomically move a finished temporary file to `dest`.
pub fn persist(temp: NamedTempFile, dest: &Path) -> io::Result<()> {
    temp.persist(dest).map(|_| ()).map_err(|e| e.error)
}

/// Write one item per line, LF-terminated, replacing `path` atomically.
pub fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut temp = temp_file_beside(path)?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        for line in lines {
            out.write_all(line.as_ref().as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
    }
    persist(temp, path)
}

/// Read the non-empty lines of a text file.
///
/// Tolerates CRLF line endings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
