//! # treescan
//!
//! Concurrent directory tree scanner: bounded parallel reads, streamed results.
//!
//! treescan walks every entry below a root directory exactly once (directories,
//! files, symlinks, devices, sockets, pipes) and streams what it finds while
//! it finds it. Each directory is its own task; a semaphore bounds how many
//! directories are read at the same time, and an outstanding-task count
//! decides when the walk is over and both output streams close.
//!
//! Symlinks are reported, never followed. The root itself is the first entry
//! of every scan.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use treescan::{drain, EntryKind, Scanner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = Scanner::new("/usr/share", 8)?;
//!
//! let mut files = 0;
//! let errors = drain(scanner.stream(), |batch| {
//!     files += batch.iter().filter(|e| e.kind() == EntryKind::File).count();
//!     Ok(())
//! })
//! .await?;
//!
//! println!("{files} files, {} unreadable directories", errors.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Streams and backpressure
//!
//! [`Scanner::stream`] returns a [`ScanStream`] with two bounded receivers:
//! entry batches and per-directory errors. Drain both, or drop them to stop
//! the scan; a full stream blocks the directory tasks feeding it.
//!
//! # Custom filesystems
//!
//! Implement [`Filesystem`] and [`DirHandle`] to scan something other than
//! the local disk, then pass it with [`ScannerBuilder::filesystem`].

#![forbid(unsafe_code)]

mod builder;
mod coordinator;
mod engine;
mod entry;
mod error;
mod output;
mod results;
mod scanner;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{default_concurrency, ScannerBuilder, DEFAULT_BATCH_SIZE};
pub use coordinator::ScanCancel;
pub use entry::{EntryKind, PathEntry};
pub use error::ScanError;
pub use output::{collect, drain, write_counts, ScanReport, TreePrinter};
pub use results::{KindCounts, ScanStats};
pub use scanner::{ScanStream, Scanner};
pub use traits::{DirChild, DirHandle, Filesystem, LocalFs};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a [`ScannerBuilder`] for `root`.
///
/// # Example
///
/// ```rust,no_run
/// # fn main() -> Result<(), treescan::ScanError> {
/// let scanner = treescan::scan("/var/log").concurrency(4).build()?;
/// assert_eq!(scanner.concurrency(), 4);
/// # Ok(())
/// # }
/// ```
pub fn scan(root: impl Into<std::path::PathBuf>) -> ScannerBuilder {
    Scanner::builder(root)
}
