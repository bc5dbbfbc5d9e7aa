//! Task coordination for a scan.
//!
//! Three small pieces keep the recursive fan-out in check:
//!
//! - [`TaskTracker`] counts outstanding directory tasks. Each task holds a
//!   [`TaskGuard`]; the guard that takes the count to zero runs the
//!   completion action, exactly once.
//! - [`ReadLimiter`] bounds how many directories are read at the same time.
//!   It is independent of the number of tasks, which is unbounded.
//! - [`ScanCancel`] is the shared stop flag tasks poll between reads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::results::ScanStats;

type OnIdle = Box<dyn FnOnce() + Send>;

/// Reference count on the lifetime of a traversal.
pub(crate) struct TaskTracker {
    outstanding: AtomicUsize,
    on_idle:     Mutex<Option<OnIdle>>,
    done:        AtomicBool,
}

impl TaskTracker {
    /// `on_idle` runs once, on the thread that drops the last guard.
    pub(crate) fn new(on_idle: impl FnOnce() + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            outstanding: AtomicUsize::new(0),
            on_idle:     Mutex::new(Some(Box::new(on_idle))),
            done:        AtomicBool::new(false),
        })
    }

    /// Count a new task. Must happen before the task is handed to the
    /// runtime, so its parent cannot reach zero in between.
    pub(crate) fn register(self: &Arc<Self>) -> TaskGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            tracker: Arc::clone(self),
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Whether the completion action has run to the end.
    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    fn finish_one(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) != 1 {
            return;
        }

        // Only the 1 -> 0 transition gets here, but the take() keeps the
        // action single-fire even if the tracker were re-armed afterwards.
        let on_idle = self
            .on_idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(on_idle) = on_idle {
            on_idle();
            self.done.store(true, Ordering::SeqCst);
        }
    }
}

/// Marks one outstanding task. Dropping it finishes the task.
pub(crate) struct TaskGuard {
    tracker: Arc<TaskTracker>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.finish_one();
    }
}

/// Counting semaphore over directory reads, with a probe that records how
/// many reads hold a permit.
pub(crate) struct ReadLimiter {
    semaphore: Semaphore,
    stats:     Arc<ScanStats>,
}

impl ReadLimiter {
    pub(crate) fn new(permits: usize, stats: Arc<ScanStats>) -> Self {
        Self {
            semaphore: Semaphore::new(permits),
            stats,
        }
    }

    /// Wait for a free permit. Suspends only the calling task.
    ///
    /// Returns `None` if the semaphore was closed.
    pub(crate) async fn acquire(&self) -> Option<ReadPermit<'_>> {
        let permit = self.semaphore.acquire().await.ok()?;
        self.stats.read_started();
        Some(ReadPermit {
            _permit: permit,
            stats:   &self.stats,
        })
    }
}

pub(crate) struct ReadPermit<'a> {
    _permit: SemaphorePermit<'a>,
    stats:   &'a ScanStats,
}

impl Drop for ReadPermit<'_> {
    fn drop(&mut self) {
        // Runs before the semaphore permit is returned.
        self.stats.read_finished();
    }
}

/// Handle that stops a running scan.
///
/// Cancelled tasks stop reading and spawn no further children, but still
/// finish normally, so both output streams still close.
#[derive(Debug, Clone, Default)]
pub struct ScanCancel {
    flag: Arc<AtomicBool>,
}

impl ScanCancel {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
