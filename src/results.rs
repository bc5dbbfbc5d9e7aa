use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::entry::EntryKind;

/// Live counters for one scan.
///
/// Shared between the directory tasks and whoever holds the
/// [`ScanStream`](crate::ScanStream). All counters are monotonic except
/// `active_reads`, which tracks directory reads currently holding a permit.
#[derive(Debug, Default)]
pub struct ScanStats {
    dirs_read:         AtomicU64,
    entries:           AtomicU64,
    errors:            AtomicU64,
    active_reads:      AtomicUsize,
    peak_active_reads: AtomicUsize,
    cancelled:         AtomicBool,
}

impl ScanStats {
    /// Directories whose listing was read to the end.
    pub fn dirs_read(&self) -> u64 {
        self.dirs_read.load(Ordering::Relaxed)
    }

    /// Entries sent on the entry stream, the root included.
    pub fn entries(&self) -> u64 {
        self.entries.load(Ordering::Relaxed)
    }

    /// Errors sent on the error stream.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Directory reads holding a permit right now.
    pub fn active_reads(&self) -> usize {
        self.active_reads.load(Ordering::SeqCst)
    }

    /// Highest number of directory reads that held a permit at once.
    pub fn peak_active_reads(&self) -> usize {
        self.peak_active_reads.load(Ordering::SeqCst)
    }

    /// Whether the scan was cut short by cancellation or a dropped receiver.
    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn record_dir(&self) {
        self.dirs_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_entries(&self, count: usize) {
        self.entries.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn read_started(&self) {
        let now = self.active_reads.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_reads.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn read_finished(&self) {
        self.active_reads.fetch_sub(1, Ordering::SeqCst);
    }

    /// Returns `true` only for the call that first marks the scan cancelled.
    pub(crate) fn mark_cancelled(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }
}

/// Number of entries seen per [`EntryKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindCounts {
    counts: [u64; EntryKind::ALL.len()],
}

impl KindCounts {
    pub fn record(&mut self, kind: EntryKind) {
        self.counts[kind.index()] += 1;
    }

    pub fn get(&self, kind: EntryKind) -> u64 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Kinds with a non-zero count, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryKind, u64)> + '_ {
        EntryKind::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind)))
            .filter(|&(_, count)| count != 0)
    }
}
