use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::entry::{EntryKind, PathEntry};
use crate::error::ScanError;
use crate::scanner::Scanner;
use crate::traits::{Filesystem, LocalFs};

/// Entries requested per directory-read call.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

// ---------------------------------------------------------------------------
// ScannerBuilder
// ---------------------------------------------------------------------------

/// Configures a [`Scanner`].
///
/// Created via [`Scanner::builder()`] or [`treescan::scan()`](crate::scan).
/// Configure with chained builder methods, then call
/// [`build()`](ScannerBuilder::build) to validate.
///
/// # Example
///
/// ```rust,ignore
/// let scanner = treescan::scan("/var/log")
///     .concurrency(16)
///     .batch_size(256)
///     .build()?;
/// ```
pub struct ScannerBuilder {
    root:             PathBuf,
    concurrency:      usize,
    batch_size:       usize,
    channel_capacity: Option<usize>,
    fs:               Arc<dyn Filesystem>,
}

impl ScannerBuilder {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self {
            root,
            concurrency:      default_concurrency(),
            batch_size:       DEFAULT_BATCH_SIZE,
            channel_capacity: None,
            fs:               Arc::new(LocalFs),
        }
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Maximum number of directories read in parallel.
    ///
    /// Defaults to twice the number of logical CPU cores. The number of
    /// pending directory tasks is not bounded by this, only the reads.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Entries requested per directory-read call. Very wide directories are
    /// emitted as several batches of at most this size.
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Capacity of each output stream, in batches (entries) or errors.
    ///
    /// Defaults to twice the concurrency. When a stream is full, directory
    /// tasks wait, which in turn holds back new reads.
    pub fn channel_capacity(mut self, n: usize) -> Self {
        self.channel_capacity = Some(n);
        self
    }

    /// Scan through a custom [`Filesystem`] instead of the local one.
    pub fn filesystem(mut self, fs: impl Filesystem) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Validate the options and stat the root.
    ///
    /// # Errors
    ///
    /// Returns `Err` for invalid options, a root that cannot be stat'd
    /// ([`ScanError::NotFound`]), or a root that is not a directory. These
    /// are never recoverable; nothing has been traversed at that point.
    pub fn build(self) -> Result<Scanner, ScanError> {
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(self.concurrency));
        }
        if self.batch_size == 0 {
            return Err(ScanError::InvalidBatchSize(self.batch_size));
        }
        let channel_capacity = self
            .channel_capacity
            .unwrap_or_else(|| self.concurrency.saturating_mul(2));
        if channel_capacity == 0 {
            return Err(ScanError::InvalidChannelCapacity(channel_capacity));
        }

        match self.fs.stat(&self.root) {
            Ok(EntryKind::Dir) => {}
            Ok(_) => return Err(ScanError::NotADirectory(self.root)),
            // A path running through a file, e.g. `a.txt/x`.
            Err(err) if err.kind() == io::ErrorKind::NotADirectory => {
                return Err(ScanError::NotADirectory(self.root));
            }
            // Anything else that cannot be stat'd is unreachable as a root.
            Err(err) => {
                debug!(root = %self.root.display(), error = %err, "root stat failed");
                return Err(ScanError::NotFound(self.root));
            }
        }

        Ok(Scanner {
            root: PathEntry::new(self.root, EntryKind::Dir),
            concurrency: self.concurrency,
            batch_size: self.batch_size,
            channel_capacity,
            fs: self.fs,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Twice the logical CPU count, with a safe fallback.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
}
