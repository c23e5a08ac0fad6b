use jfs_path::InternalPath;

/// The public error taxonomy (§7): every failure a `FileSystemInstance`
/// operation can raise, named by what went wrong rather than by which
/// internal layer noticed it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Syntactic parse failure of a path or URI string.
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// A named path does not exist in a commit tree.
    #[error("no such file: {0}")]
    NoSuchFile(InternalPath),
    /// A resolved object that is not a tree was used where a directory
    /// was required (e.g. `newDirectoryStream` on a regular file).
    #[error("not a directory: {0}")]
    NotADirectory(InternalPath),
    /// `readSymbolicLink` was called on an object that is not a symlink.
    #[error("not a symbolic link: {0}")]
    NotALink(InternalPath),
    /// A symlink's stored target begins with `/`.
    #[error("symbolic link target is absolute: {target}")]
    AbsoluteLink { target: String },
    /// Existence is ambiguous because a `no-follow` resolution crossed a
    /// symlink it was not permitted to expand.
    #[error("path could not be determined: {0}")]
    PathCouldNotBeFound(InternalPath),
    /// Any write attempt against this read-only file system.
    #[error("file system is read-only")]
    ReadOnlyFs,
    /// An operation was attempted after `close()`.
    #[error("file system is closed")]
    ClosedFs,
    /// Registry construction found a key already bound to a live instance.
    #[error("already registered: {0}")]
    AlreadyExists(String),
    /// Registry or URI lookup found no live instance for the given key.
    #[error("no such registered instance: {0}")]
    NotFound(String),
    /// An API surface this file system deliberately does not implement
    /// (no glob matcher, no file-store enumeration, no watch service, ...).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// `checkAccess` requested a mode the path's file-mode does not grant.
    #[error("access denied: {0}")]
    AccessDenied(InternalPath),
    /// Underlying object-store I/O failure.
    #[error(transparent)]
    Io(#[from] jfs_odb::Error),
}

impl From<jfs_resolve::Error> for Error {
    fn from(err: jfs_resolve::Error) -> Self {
        match err {
            jfs_resolve::Error::NotFound(p) => Error::NoSuchFile(p),
            jfs_resolve::Error::PathCouldNotBeFound(p) => Error::PathCouldNotBeFound(p),
            jfs_resolve::Error::SymlinkCycle(p) => Error::PathCouldNotBeFound(p),
            jfs_resolve::Error::AbsoluteSymlinkTarget(p) => Error::PathCouldNotBeFound(p),
            jfs_resolve::Error::InvalidSymlinkTarget(p) => Error::PathCouldNotBeFound(p),
            jfs_resolve::Error::Odb(e) => Error::Io(e),
        }
    }
}

impl From<jfs_path::Error> for Error {
    fn from(err: jfs_path::Error) -> Self {
        Error::InvalidPath(err.to_string())
    }
}

impl From<jfs_graph::Error> for Error {
    fn from(err: jfs_graph::Error) -> Self {
        match err {
            jfs_graph::Error::Odb(e) => Error::Io(e),
        }
    }
}
