use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::coordinator::{ReadLimiter, ScanCancel, TaskTracker};
use crate::entry::PathEntry;
use crate::error::ScanError;
use crate::results::ScanStats;
use crate::traits::{DirChild, DirHandle, Filesystem};

// ---------------------------------------------------------------------------
// Shared scan state
// ---------------------------------------------------------------------------

/// Everything a directory task needs, shared by all tasks of one scan.
pub(crate) struct ScanContext {
    pub fs:         Arc<dyn Filesystem>,
    pub limiter:    ReadLimiter,
    pub tracker:    Arc<TaskTracker>,
    pub stats:      Arc<ScanStats>,
    pub cancel:     ScanCancel,
    pub batch_size: usize,
}

impl ScanContext {
    fn should_stop(&self) -> bool {
        if !self.cancel.is_cancelled() {
            return false;
        }
        if self.stats.mark_cancelled() {
            warn!("scan cancelled, winding down directory tasks");
        }
        true
    }

    /// A receiver went away: nobody is listening, so stop everything.
    fn consumer_gone(&self) {
        self.cancel.cancel();
        if self.stats.mark_cancelled() {
            warn!("output stream dropped, cancelling scan");
        }
    }
}

/// Sending halves of the two output streams.
///
/// The streams close when every clone is dropped: one per running task plus
/// the master copy held by the tracker's completion action.
#[derive(Clone)]
pub(crate) struct Outputs {
    entries: mpsc::Sender<Vec<PathEntry>>,
    errors:  mpsc::Sender<ScanError>,
}

impl Outputs {
    pub(crate) fn new(
        entries: mpsc::Sender<Vec<PathEntry>>,
        errors: mpsc::Sender<ScanError>,
    ) -> Self {
        Self { entries, errors }
    }

    /// Returns `false` if the entry receiver was dropped.
    async fn send_entries(&self, ctx: &ScanContext, batch: Vec<PathEntry>) -> bool {
        let count = batch.len();
        if self.entries.send(batch).await.is_err() {
            ctx.consumer_gone();
            return false;
        }
        ctx.stats.record_entries(count);
        true
    }

    async fn send_error(&self, ctx: &ScanContext, err: ScanError) {
        warn!(error = %err, "directory scan failed");
        if self.errors.send(err).await.is_err() {
            ctx.consumer_gone();
            return;
        }
        ctx.stats.record_error();
    }
}

// ---------------------------------------------------------------------------
// Directory tasks
// ---------------------------------------------------------------------------

/// Register `dir` on the tracker and hand its task to the runtime.
///
/// Does not wait for the task. The guard is taken before spawning, so the
/// caller's own guard cannot be the last one while this child is pending.
pub(crate) fn spawn_dir_task(ctx: &Arc<ScanContext>, dir: PathEntry, outputs: Outputs) {
    let guard = ctx.tracker.register();
    let ctx = Arc::clone(ctx);

    tokio::spawn(async move {
        scan_dir(&ctx, dir, &outputs).await;

        // Output handles go before the guard: when the last guard runs the
        // completion action, no task still holds a sender.
        drop(outputs);
        drop(guard);
    });
}

/// Emit `dir`, then read it batch by batch while holding a read permit.
///
/// Child directories become new tasks; everything else is sent on the
/// entry stream as one batch per read. Any failure to open or read `dir`
/// is reported once and ends this directory only.
async fn scan_dir(ctx: &Arc<ScanContext>, dir: PathEntry, outputs: &Outputs) {
    let path = dir.path().to_path_buf();

    if !outputs.send_entries(ctx, vec![dir]).await || ctx.should_stop() {
        return;
    }

    let Some(_permit) = ctx.limiter.acquire().await else {
        return;
    };
    if ctx.should_stop() {
        return;
    }

    trace!(path = %path.display(), "reading directory");

    let mut handle = match open_dir(ctx, &path).await {
        Ok(handle) => handle,
        Err(err) => {
            outputs.send_error(ctx, ScanError::from_io(&path, err)).await;
            return;
        }
    };

    loop {
        if ctx.should_stop() {
            debug!(path = %path.display(), "scan cancelled, abandoning directory");
            return;
        }

        let (returned, result) = match read_batch(handle, ctx.batch_size).await {
            Ok(pair) => pair,
            Err(err) => {
                outputs.send_error(ctx, ScanError::from_io(&path, err)).await;
                return;
            }
        };
        handle = returned;

        let children = match result {
            Ok(children) => children,
            Err(err) => {
                outputs.send_error(ctx, ScanError::from_io(&path, err)).await;
                return;
            }
        };
        if children.is_empty() {
            break;
        }

        trace!(path = %path.display(), count = children.len(), "read batch");

        let mut batch = Vec::with_capacity(children.len());
        for child in children {
            let entry = PathEntry::new(path.join(&child.name), child.kind);
            if entry.is_dir() {
                spawn_dir_task(ctx, entry, outputs.clone());
            } else {
                batch.push(entry);
            }
        }

        if !batch.is_empty() && !outputs.send_entries(ctx, batch).await {
            return;
        }
    }

    ctx.stats.record_dir();
}

// ---------------------------------------------------------------------------
// Blocking filesystem calls
// ---------------------------------------------------------------------------

async fn open_dir(ctx: &ScanContext, path: &Path) -> io::Result<Box<dyn DirHandle>> {
    let fs = Arc::clone(&ctx.fs);
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || fs.open_dir(&path))
        .await
        .map_err(io::Error::other)?
}

/// Read one batch on the blocking pool. The handle travels with the call
/// and comes back with the result; it is lost only if the read panicked.
async fn read_batch(
    mut handle: Box<dyn DirHandle>,
    max: usize,
) -> io::Result<(Box<dyn DirHandle>, io::Result<Vec<DirChild>>)> {
    tokio::task::spawn_blocking(move || {
        let result = handle.read_batch(max);
        (handle, result)
    })
    .await
    .map_err(io::Error::other)
}
