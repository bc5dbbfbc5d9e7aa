use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::io;
use std::path::Path;

use crate::entry::EntryKind;

/// One child returned by [`DirHandle::read_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirChild {
    pub name: OsString,
    pub kind: EntryKind,
}

/// The filesystem primitives a scan is built on.
///
/// All calls are blocking; the scanner runs them on tokio's blocking pool.
/// [`LocalFs`] is the implementation over `std::fs`. Implement this to scan
/// something else, or to wrap `LocalFs` with fault injection in tests.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one instance is shared by every directory
/// task of a scan.
pub trait Filesystem: Send + Sync + 'static {
    /// Kind of the object at `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<EntryKind>;

    /// Open a directory for batched reading.
    fn open_dir(&self, path: &Path) -> io::Result<Box<dyn DirHandle>>;
}

/// An open directory.
pub trait DirHandle: Send {
    /// Read up to `max` children, without following symlinks.
    ///
    /// An empty batch means the end of the directory. If a read fails after
    /// some children were already collected, those children are returned and
    /// the failure is reported by the next call.
    fn read_batch(&mut self, max: usize) -> io::Result<Vec<DirChild>>;
}

/// [`Filesystem`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        Ok(EntryKind::from_file_type(fs::metadata(path)?.file_type()))
    }

    fn open_dir(&self, path: &Path) -> io::Result<Box<dyn DirHandle>> {
        Ok(Box::new(LocalDir {
            inner:   fs::read_dir(path)?,
            pending: None,
        }))
    }
}

struct LocalDir {
    inner:   ReadDir,
    pending: Option<io::Error>,
}

impl DirHandle for LocalDir {
    fn read_batch(&mut self, max: usize) -> io::Result<Vec<DirChild>> {
        let children = self.inner.by_ref().map(|next| {
            next.and_then(|entry| {
                let kind = EntryKind::from_file_type(entry.file_type()?);
                Ok(DirChild {
                    name: entry.file_name(),
                    kind,
                })
            })
        });
        fill_batch(children, max, &mut self.pending)
    }
}

/// Collect up to `max` children from `children`.
///
/// Children removed between listing and lstat (`NotFound`) are skipped. Any
/// other failure ends the batch; it is returned directly when nothing was
/// collected yet, otherwise parked in `pending` for the next call.
fn fill_batch<I>(
    mut children: I,
    max: usize,
    pending: &mut Option<io::Error>,
) -> io::Result<Vec<DirChild>>
where
    I: Iterator<Item = io::Result<DirChild>>,
{
    if let Some(err) = pending.take() {
        return Err(err);
    }

    let mut batch = Vec::with_capacity(max.min(1024));
    while batch.len() < max {
        let Some(child) = children.next() else {
            break;
        };

        match child {
            Ok(child) => batch.push(child),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) if batch.is_empty() => return Err(err),
            Err(err) => {
                *pending = Some(err);
                break;
            }
        }
    }

    Ok(batch)
}
