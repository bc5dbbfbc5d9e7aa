use std::fs::FileType;
use std::path::{Path, PathBuf};

/// A single filesystem object discovered during a scan.
///
/// Immutable once produced. The kind is captured from the directory listing
/// (without following symlinks) and is never re-queried, so a `PathEntry`
/// describes the object as it was when its parent was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEntry {
    path: PathBuf,
    kind: EntryKind,
}

impl PathEntry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Full path to the entry. Relative if the scan root was given relative.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// The kind of a scanned entry.
///
/// Variant order is the display order used by the count printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A block device.
    BlockDevice,

    /// A character device.
    CharDevice,

    /// A directory.
    Dir,

    /// A symbolic link. Never followed.
    Symlink,

    /// A unix domain socket.
    Socket,

    /// A named pipe.
    Fifo,

    /// Anything the platform reports that fits none of the above.
    Other,
}

impl EntryKind {
    /// Every kind, in display order.
    pub const ALL: [EntryKind; 8] = [
        EntryKind::File,
        EntryKind::BlockDevice,
        EntryKind::CharDevice,
        EntryKind::Dir,
        EntryKind::Symlink,
        EntryKind::Socket,
        EntryKind::Fifo,
        EntryKind::Other,
    ];

    /// Classify a `std::fs::FileType` as obtained from `DirEntry::file_type`
    /// or `symlink_metadata`.
    pub fn from_file_type(ft: FileType) -> Self {
        if ft.is_dir() {
            return EntryKind::Dir;
        }
        if ft.is_file() {
            return EntryKind::File;
        }
        if ft.is_symlink() {
            return EntryKind::Symlink;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            if ft.is_block_device() {
                return EntryKind::BlockDevice;
            }
            if ft.is_char_device() {
                return EntryKind::CharDevice;
            }
            if ft.is_socket() {
                return EntryKind::Socket;
            }
            if ft.is_fifo() {
                return EntryKind::Fifo;
            }
        }

        EntryKind::Other
    }

    /// Position of this kind in [`EntryKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-character indicator used by the list printer.
    pub fn indicator(self) -> char {
        match self {
            EntryKind::File        => '-',
            EntryKind::BlockDevice => 'b',
            EntryKind::CharDevice  => 'c',
            EntryKind::Dir         => 'd',
            EntryKind::Symlink     => 'l',
            EntryKind::Socket      => 'M',
            EntryKind::Fifo        => 'P',
            EntryKind::Other       => '?',
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            EntryKind::File        => "Regular file",
            EntryKind::BlockDevice => "Block device",
            EntryKind::CharDevice  => "Character device",
            EntryKind::Dir         => "Directory",
            EntryKind::Symlink     => "Symbolic link",
            EntryKind::Socket      => "Socket",
            EntryKind::Fifo        => "FIFO (named pipe) file",
            EntryKind::Other       => "Other",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntryKind::File        => "Regular files",
            EntryKind::BlockDevice => "Block devices",
            EntryKind::CharDevice  => "Character devices",
            EntryKind::Dir         => "Directories",
            EntryKind::Symlink     => "Symbolic links",
            EntryKind::Socket      => "Sockets",
            EntryKind::Fifo        => "FIFOs (named pipe)",
            EntryKind::Other       => "Other",
        }
    }
}
