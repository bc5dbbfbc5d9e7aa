use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;

use crate::builder::ScannerBuilder;
use crate::coordinator::{ReadLimiter, ScanCancel, TaskTracker};
use crate::engine::{spawn_dir_task, Outputs, ScanContext};
use crate::entry::PathEntry;
use crate::error::ScanError;
use crate::results::ScanStats;
use crate::traits::Filesystem;

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// A validated scan configuration rooted at an existing directory.
///
/// Construction stats the root once. Each call to [`stream()`](Scanner::stream)
/// starts a fresh, independent traversal from that root.
pub struct Scanner {
    pub(crate) root:             PathEntry,
    pub(crate) concurrency:      usize,
    pub(crate) batch_size:       usize,
    pub(crate) channel_capacity: usize,
    pub(crate) fs:               Arc<dyn Filesystem>,
}

impl Scanner {
    /// Scan `root` reading at most `concurrency` directories in parallel.
    ///
    /// # Errors
    ///
    /// [`ScanError::NotFound`] if `root` does not exist,
    /// [`ScanError::NotADirectory`] if it is not a directory,
    /// [`ScanError::InvalidConcurrency`] if `concurrency` is zero.
    pub fn new(root: impl Into<PathBuf>, concurrency: usize) -> Result<Self, ScanError> {
        Self::builder(root).concurrency(concurrency).build()
    }

    /// Start configuring a scanner for `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ScannerBuilder {
        ScannerBuilder::new(root.into())
    }

    /// The root directory, as it will be emitted first by every scan.
    pub fn root(&self) -> &PathEntry {
        &self.root
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Start a traversal in the background and return its output streams.
    ///
    /// The caller must drain both streams (see [`drain`](crate::drain)), or
    /// drop them to stop the scan: producers block once a bounded stream is
    /// full. Both streams close together once every directory task has
    /// finished.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn stream(&self) -> ScanStream {
        let (entry_tx, entry_rx) = mpsc::channel(self.channel_capacity);
        let (error_tx, error_rx) = mpsc::channel(self.channel_capacity);
        let outputs = Outputs::new(entry_tx, error_tx);

        let stats = Arc::new(ScanStats::default());
        let cancel = ScanCancel::default();

        // The master senders live in the completion action. Dropping them
        // there, after the last task has dropped its own, closes the streams.
        let master = outputs.clone();
        let done_stats = Arc::clone(&stats);
        let root = self.root.path().to_path_buf();
        let started = Instant::now();
        let tracker = TaskTracker::new(move || {
            drop(master);
            debug!(
                root = %root.display(),
                entries = done_stats.entries(),
                dirs = done_stats.dirs_read(),
                errors = done_stats.errors(),
                cancelled = done_stats.cancelled(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Scan finished, streams closed"
            );
        });

        let ctx = Arc::new(ScanContext {
            fs:         Arc::clone(&self.fs),
            limiter:    ReadLimiter::new(self.concurrency, Arc::clone(&stats)),
            tracker,
            stats:      Arc::clone(&stats),
            cancel:     cancel.clone(),
            batch_size: self.batch_size,
        });

        debug!(
            root = %self.root.path().display(),
            concurrency = self.concurrency,
            batch_size = self.batch_size,
            "Starting scan"
        );

        spawn_dir_task(&ctx, self.root.clone(), outputs);

        ScanStream {
            entries: entry_rx,
            errors: error_rx,
            stats,
            cancel,
            tracker: Arc::clone(&ctx.tracker),
        }
    }
}

// ---------------------------------------------------------------------------
// ScanStream
// ---------------------------------------------------------------------------

/// The output of one running scan.
///
/// `entries` yields one `Vec` per directory read (plus a one-element batch
/// for each directory itself, the root included). `errors` yields one
/// [`ScanError`] per directory that could not be opened or read.
pub struct ScanStream {
    pub entries: mpsc::Receiver<Vec<PathEntry>>,
    pub errors:  mpsc::Receiver<ScanError>,
    stats:       Arc<ScanStats>,
    cancel:      ScanCancel,
    tracker:     Arc<TaskTracker>,
}

impl ScanStream {
    /// Live counters for this scan.
    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    /// Directory tasks spawned but not yet finished.
    pub fn pending_dirs(&self) -> usize {
        self.tracker.outstanding()
    }

    /// Whether every directory task has finished and the streams are closed
    /// (buffered items may still be waiting to be received).
    pub fn is_finished(&self) -> bool {
        self.tracker.is_done()
    }

    /// A handle that can stop this scan from elsewhere (e.g. a signal handler).
    pub fn cancel_handle(&self) -> ScanCancel {
        self.cancel.clone()
    }

    /// Stop the scan. Streams still close once running tasks wind down.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Split into the entry and error receivers.
    pub fn into_parts(self) -> (mpsc::Receiver<Vec<PathEntry>>, mpsc::Receiver<ScanError>) {
        (self.entries, self.errors)
    }
}
