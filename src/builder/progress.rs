//! Merge progress counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Progress of a merge, shared with the scanning workers.
///
/// Clones share the same counters.
#[derive(Clone, Default)]
pub struct MergeProgress {
    archives: Arc<AtomicUsize>,
    directories: Arc<AtomicUsize>,
    entries: Arc<AtomicUsize>,
    total_archives: Arc<AtomicUsize>,
    total_directories: Arc<AtomicUsize>,
}

impl MergeProgress {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        MergeProgress::default()
    }

    /// Start a new merge expecting `archives` and `directories` inputs.
    ///
    /// Counters from a previous merge are cleared.
    pub fn expect(&self, archives: usize, directories: usize) {
        self.archives.store(0, Ordering::SeqCst);
        self.directories.store(0, Ordering::SeqCst);
        self.entries.store(0, Ordering::SeqCst);
        self.total_archives.store(archives, Ordering::SeqCst);
        self.total_directories.store(directories, Ordering::SeqCst);
    }

    /// Record a scanned dependency archive.
    pub fn archive_scanned(&self) {
        self.archives.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a walked class directory.
    pub fn directory_walked(&self) {
        self.directories.fetch_add(1, Ordering::SeqCst);
    }

    /// Record entries written to the output.
    pub fn entries_written(&self, count: usize) {
        self.entries.fetch_add(count, Ordering::SeqCst);
    }

    pub fn archive_count(&self) -> usize {
        self.archives.load(Ordering::SeqCst)
    }

    pub fn directory_count(&self) -> usize {
        self.directories.load(Ordering::SeqCst)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.load(Ordering::SeqCst)
    }

    /// Total expected inputs (archives + directories).
    pub fn total(&self) -> usize {
        self.total_archives.load(Ordering::SeqCst) + self.total_directories.load(Ordering::SeqCst)
    }

    /// Scanned inputs as a fraction of the expected total.
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            (self.archive_count() + self.directory_count()) as f64 / total as f64
        }
    }

    /// Check if every expected input has been scanned.
    pub fn is_complete(&self) -> bool {
        self.archive_count() >= self.total_archives.load(Ordering::SeqCst)
            && self.directory_count() >= self.total_directories.load(Ordering::SeqCst)
    }
}
