//! `gitjfs`: a read-only virtual file system over a git repository's commit
//! history, in the shape of `java.nio.file.FileSystem` — directories are
//! trees, files are blobs, symbolic links are followed per a configurable
//! policy, and every absolute path is rooted at a commit rather than at the
//! working tree's `HEAD`.
//!
//! # Layout
//!
//! - [`jfs_path`] — the path model: [`RevisionToken`], [`InternalPath`],
//!   [`LogicalPath`]. Pure, no I/O.
//! - [`jfs_odb`] — the object-store collaborator contract ([`ObjectStore`])
//!   plus a `gix`-backed disk store and an in-memory store for tests and
//!   `DFS`-authority instances.
//! - [`jfs_resolve`] — the tree resolver and the per-path resolution cache.
//! - [`jfs_graph`] — the commit graph builder, memoized per instance.
//! - [`jfs_fs`] — the live [`FileSystemInstance`], its byte channels and
//!   directory streams, and the [`Registry`] mediating URI-addressed
//!   lookup.
//!
//! # Getting a handle
//!
//! ```no_run
//! use jfs::Registry;
//!
//! let fs = Registry::global().open_on_disk(std::path::Path::new("."), false)?;
//! let root = fs.refs()?.into_iter().next().expect("at least one ref");
//! let mut stream = fs.new_directory_stream(&root)?;
//! for entry in &mut stream {
//!     let _path = entry?;
//! }
//! fs.close()?;
//! # Ok::<(), jfs::Error>(())
//! ```
#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use jfs_fs::{
    from_uri, AccessMode, Attributes, ByteChannel, DirectoryStream, Error, FileSystemInstance, Identity, Registry,
};
pub use jfs_graph::{CommitGraph, GraphCache};
pub use jfs_odb::{
    ChangeType, CommitInfo, DiffEntry, FileMode, GitObjectRef, GixStore, MemoryStore, ObjectStore, TreeEntry,
};
pub use jfs_path::{InternalPath, LogicalPath, RevisionToken};
pub use jfs_resolve::FollowPolicy;
