use jfs_path::InternalPath;

/// Resolver-internal failures, in the resolver's own vocabulary (§4.4's
/// step rules); `jfs-fs` maps these onto the public §7 error taxonomy at
/// the file-system-instance boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A named path does not exist in the tree, including "descended into
    /// a non-tree" (a regular file or gitlink with names still remaining).
    #[error("no such file or directory: {0}")]
    NotFound(InternalPath),
    /// A symlink crossing under `no-follow` made existence ambiguous:
    /// either an intermediate symlink was not followed, or a final
    /// symlink's absolute target made it un-traversable.
    #[error("path could not be determined past a symlink: {0}")]
    PathCouldNotBeFound(InternalPath),
    #[error("too many levels of symbolic links while resolving {0}")]
    SymlinkCycle(InternalPath),
    #[error("symbolic link {0} resolves outside the tree (absolute target)")]
    AbsoluteSymlinkTarget(InternalPath),
    #[error("symbolic link target is not valid UTF-8 at {0}")]
    InvalidSymlinkTarget(InternalPath),
    #[error(transparent)]
    Odb(#[from] jfs_odb::Error),
}
