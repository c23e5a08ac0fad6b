use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jfs_graph::{CommitGraph, GraphCache};
use jfs_odb::{DiffEntry, FileMode, ObjectStore};
use jfs_path::{InternalPath, LogicalPath, RevisionToken};
use jfs_resolve::{FollowPolicy, PathCache, Slot};
use parking_lot::Mutex;

use crate::dirstream::DirectoryStream;
use crate::error::Error;
use crate::uri::Identity;
use crate::ByteChannel;

/// The basic, read-only attribute set this file system exposes (§4.7,
/// `readAttributes`): commit time stands in for both modification and
/// creation time, since a git object carries no timestamps of its own
/// beyond the commit that introduced it.
#[derive(Clone, Debug)]
pub struct Attributes {
    pub size: u64,
    pub last_modified: gix_date::Time,
    pub creation_time: gix_date::Time,
    pub is_regular_file: bool,
    pub is_directory: bool,
    pub is_symbolic_link: bool,
    pub is_other: bool,
}

/// The access modes [`FileSystemInstance::check_access`] understands.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum AccessMode {
    Read,
    Write,
    Execute,
}

struct Inner {
    identity: Identity,
    store: Arc<dyn ObjectStore>,
    graph_cache: GraphCache,
    path_cache: PathCache,
    open: Mutex<bool>,
    streams: Mutex<Vec<Arc<AtomicBool>>>,
    on_close: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// A live, read-only view of a git repository's commit history as a
/// hierarchical file system (C7).
///
/// Cloning is cheap (an `Arc` bump) and gives another handle to the same
/// underlying instance; equality and the "same file-system instance" half
/// of [`LogicalPath`]'s equality contract are by pointer identity, not by
/// which handle was cloned from which.
#[derive(Clone)]
pub struct FileSystemInstance(Arc<Inner>);

impl PartialEq for FileSystemInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for FileSystemInstance {}

impl std::fmt::Debug for FileSystemInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemInstance").field("identity", &self.0.identity).finish_non_exhaustive()
    }
}

impl FileSystemInstance {
    /// Creates a new, open instance. `on_close` is invoked exactly once,
    /// the first time [`FileSystemInstance::close`] succeeds, so the
    /// registry can drop its own mapping.
    pub(crate) fn new(
        identity: Identity,
        store: Arc<dyn ObjectStore>,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Self {
        FileSystemInstance(Arc::new(Inner {
            identity,
            store,
            graph_cache: GraphCache::new(),
            path_cache: PathCache::new(),
            open: Mutex::new(true),
            streams: Mutex::new(Vec::new()),
            on_close: Mutex::new(Some(Box::new(on_close))),
        }))
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.0.identity
    }

    fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.0.store
    }

    fn with_open<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&Self) -> Result<R, Error>,
    {
        let open = self.0.open.lock();
        if !*open {
            return Err(Error::ClosedFs);
        }
        f(self)
    }

    fn resolve_root_commit(&self, token: &RevisionToken) -> Result<gix_hash::ObjectId, Error> {
        match token {
            RevisionToken::CommitId(id) => {
                self.store().read_commit(*id)?;
                Ok(*id)
            }
            RevisionToken::RefName(name) => self
                .store()
                .enumerate_refs()?
                .into_iter()
                .find(|(ref_name, _)| ref_name == name)
                .map(|(_, id)| id)
                .ok_or_else(|| Error::NoSuchFile(InternalPath::root())),
        }
    }

    /// Resolves `path` under `policy`, consulting and updating the path
    /// cache for the two cached policies (§4.6); `no-follow` queries bypass
    /// the cache entirely since it has no slot reserved for them.
    fn resolve_object(
        &self,
        path: &LogicalPath<Self>,
        policy: FollowPolicy,
    ) -> Result<(gix_hash::ObjectId, jfs_odb::GitObjectRef), Error> {
        let abs = path.to_absolute_path();
        let token = abs
            .root_token()
            .expect("to_absolute_path always yields an absolute path")
            .clone();
        let root_commit = self.resolve_root_commit(&token)?;
        let commit = self.store().read_commit(root_commit)?;

        if policy == FollowPolicy::NoFollow {
            let object = jfs_resolve::resolve(self.store().as_ref(), commit.tree, abs.internal(), policy)?;
            return Ok((root_commit, object));
        }

        let slot = match policy {
            FollowPolicy::FollowExceptFinal => Slot::Real,
            FollowPolicy::FollowAll => Slot::Link,
            FollowPolicy::NoFollow => unreachable!("handled above"),
        };

        if let Some(cached) = self.0.path_cache.get(abs.internal(), root_commit, slot) {
            return Ok((root_commit, cached));
        }
        let object = jfs_resolve::resolve(self.store().as_ref(), commit.tree, abs.internal(), policy)?;
        self.0
            .path_cache
            .put(abs.internal().clone(), root_commit, slot, object.clone());
        Ok((root_commit, object))
    }

    /// Joins `first` and `more` the way [`InternalPath::join`] does, then
    /// dispatches to absolute or relative parsing depending on whether the
    /// joined form starts with `/`.
    pub fn get_path(&self, first: &str, more: &[&str]) -> Result<LogicalPath<Self>, Error> {
        let mut joined = String::from(first);
        for segment in more {
            if !joined.is_empty() && !joined.ends_with('/') {
                joined.push('/');
            }
            joined.push_str(segment);
        }
        if joined.starts_with('/') {
            self.get_absolute_path(&joined)
        } else {
            Ok(LogicalPath::relative(self.clone(), InternalPath::parse(joined.as_bytes())))
        }
    }

    /// Parses a full `/root//internal` string into an absolute path.
    pub fn get_absolute_path(&self, s: &str) -> Result<LogicalPath<Self>, Error> {
        let (token, internal) = jfs_path::split_absolute(s.as_bytes())?;
        Ok(LogicalPath::absolute(self.clone(), token, internal))
    }

    /// The path-root naming `commit_id` directly; no object-store access.
    pub fn get_path_root(&self, commit_id: gix_hash::ObjectId) -> LogicalPath<Self> {
        LogicalPath::absolute(self.clone(), RevisionToken::commit_id(commit_id), InternalPath::root())
    }

    /// Opens a read-only, random-access byte channel over a blob's bytes.
    pub fn new_byte_channel(&self, path: &LogicalPath<Self>, follow_links: bool) -> Result<ByteChannel, Error> {
        self.with_open(|this| {
            let policy = if follow_links { FollowPolicy::FollowAll } else { FollowPolicy::FollowExceptFinal };
            let (_, object) = this.resolve_object(path, policy)?;
            match object.file_mode {
                FileMode::RegularFile | FileMode::Executable => {
                    let bytes = this.store().blob_bytes(object.object_id)?;
                    Ok(ByteChannel::new(bytes))
                }
                FileMode::Tree | FileMode::Gitlink => Err(Error::NotADirectory(path.internal().clone())),
                FileMode::Symlink => Err(Error::PathCouldNotBeFound(path.internal().clone())),
            }
        })
    }

    /// Lists `dir`'s entries as a single-use, read-ahead-by-one stream.
    pub fn new_directory_stream(&self, dir: &LogicalPath<Self>) -> Result<DirectoryStream, Error> {
        self.with_open(|this| {
            let (_, object) = this.resolve_object(dir, FollowPolicy::FollowAll)?;
            if !object.file_mode.is_tree() {
                return Err(Error::NotADirectory(dir.internal().clone()));
            }
            let entries = this.store().read_tree(object.object_id)?;
            let closed = Arc::new(AtomicBool::new(false));
            this.0.streams.lock().push(Arc::clone(&closed));
            Ok(DirectoryStream::new(this.clone(), dir.clone(), entries, closed))
        })
    }

    pub(crate) fn stream_dropped(&self, flag: &Arc<AtomicBool>) {
        self.0.streams.lock().retain(|f| !Arc::ptr_eq(f, flag));
    }

    /// Basic attributes (§4.7): size, commit time standing in for both
    /// modification and creation time, and the usual kind booleans.
    pub fn read_attributes(&self, path: &LogicalPath<Self>, follow_links: bool) -> Result<Attributes, Error> {
        self.with_open(|this| {
            let policy = if follow_links { FollowPolicy::FollowAll } else { FollowPolicy::FollowExceptFinal };
            let (root_commit, object) = this.resolve_object(path, policy)?;
            let commit = this.store().read_commit(root_commit)?;
            let size = match object.file_mode {
                FileMode::RegularFile | FileMode::Executable => this.store().blob_size(object.object_id)?,
                _ => 0,
            };
            Ok(Attributes {
                size,
                last_modified: commit.committer.time.clone(),
                creation_time: commit.committer.time.clone(),
                is_regular_file: object.file_mode.is_regular_file(),
                is_directory: object.file_mode.is_tree(),
                is_symbolic_link: object.file_mode.is_symlink(),
                is_other: false,
            })
        })
    }

    /// The relative target of a symlink. A stored absolute target fails
    /// with [`Error::AbsoluteLink`], carrying the raw target string.
    pub fn read_symbolic_link(&self, path: &LogicalPath<Self>) -> Result<InternalPath, Error> {
        self.with_open(|this| {
            let (_, object) = this.resolve_object(path, FollowPolicy::FollowExceptFinal)?;
            if !object.file_mode.is_symlink() {
                return Err(Error::NotALink(path.internal().clone()));
            }
            let bytes = this.store().blob_bytes(object.object_id)?;
            let target = std::str::from_utf8(&bytes).map_err(|_| Error::NotALink(path.internal().clone()))?;
            if let Some(stripped) = target.strip_prefix('/') {
                let _ = stripped;
                return Err(Error::AbsoluteLink { target: target.to_string() });
            }
            Ok(InternalPath::parse(target.as_bytes()))
        })
    }

    /// The absolute path with every link resolved, unless `follow_links`
    /// is false, in which case a trailing link fails.
    pub fn to_real_path(&self, path: &LogicalPath<Self>, follow_links: bool) -> Result<LogicalPath<Self>, Error> {
        self.with_open(|this| {
            let abs = path.to_absolute_path();
            let token = abs
                .root_token()
                .expect("to_absolute_path always yields an absolute path")
                .clone();
            let policy = if follow_links { FollowPolicy::FollowAll } else { FollowPolicy::FollowExceptFinal };
            let (_, object) = this.resolve_object(path, policy)?;
            if !follow_links && object.file_mode.is_symlink() {
                return Err(Error::PathCouldNotBeFound(path.internal().clone()));
            }
            Ok(LogicalPath::absolute(this.clone(), token, object.real_path))
        })
    }

    /// The commit graph over every commit reachable from any ref (§4.5),
    /// memoized for the instance's lifetime.
    pub fn graph(&self) -> Result<Arc<CommitGraph>, Error> {
        self.with_open(|this| Ok(this.0.graph_cache.get_or_build(this.store().as_ref())?))
    }

    /// One path-root per `refs/...` entry.
    pub fn refs(&self) -> Result<Vec<LogicalPath<Self>>, Error> {
        self.with_open(|this| {
            let mut out = Vec::new();
            for (name, _id) in this.store().enumerate_refs()? {
                let token = RevisionToken::ref_name(&name)?;
                out.push(LogicalPath::absolute(this.clone(), token, InternalPath::root()));
            }
            Ok(out)
        })
    }

    /// The tree-to-tree diff between the commits two path-roots name.
    pub fn diff(&self, a: &LogicalPath<Self>, b: &LogicalPath<Self>) -> Result<Vec<DiffEntry>, Error> {
        self.with_open(|this| {
            let a_abs = a.to_absolute_path();
            let b_abs = b.to_absolute_path();
            let a_token = a_abs.root_token().expect("absolute").clone();
            let b_token = b_abs.root_token().expect("absolute").clone();
            let a_commit = this.resolve_root_commit(&a_token)?;
            let b_commit = this.resolve_root_commit(&b_token)?;
            Ok(this.store().diff_trees(a_commit, b_commit)?)
        })
    }

    /// Whether `path` resolves to an object at all, following links by
    /// default the same way `java.nio.file.Files::exists` does; pass
    /// `follow_links = false` for the `NOFOLLOW_LINKS` behavior (a
    /// trailing symlink itself counts as existing; see S4).
    ///
    /// Ambiguous-existence failures (a `no-follow` walk crossing a link it
    /// may not expand, or a cycle under `follow-all`) are reported as
    /// `false` rather than propagated, matching `Files::exists`'s own
    /// "any failure during the check means false" contract; any other
    /// object-store failure still propagates.
    pub fn exists(&self, path: &LogicalPath<Self>, follow_links: bool) -> Result<bool, Error> {
        self.with_open(|this| {
            let policy = if follow_links { FollowPolicy::FollowAll } else { FollowPolicy::FollowExceptFinal };
            match this.resolve_object(path, policy) {
                Ok(_) => Ok(true),
                Err(Error::NoSuchFile(_)) | Err(Error::PathCouldNotBeFound(_)) => Ok(false),
                Err(other) => Err(other),
            }
        })
    }

    /// Succeeds iff `path` exists and `modes` only asks for read/execute
    /// access the resolved object's file-mode actually grants.
    pub fn check_access(&self, path: &LogicalPath<Self>, modes: &[AccessMode]) -> Result<(), Error> {
        self.with_open(|this| {
            if modes.contains(&AccessMode::Write) {
                return Err(Error::ReadOnlyFs);
            }
            let (_, object) = this.resolve_object(path, FollowPolicy::FollowAll)?;
            if modes.contains(&AccessMode::Execute) && !matches!(object.file_mode, FileMode::Executable) {
                return Err(Error::AccessDenied(path.internal().clone()));
            }
            Ok(())
        })
    }

    pub fn is_open(&self) -> bool {
        *self.0.open.lock()
    }

    /// Idempotent. Releases every open directory stream best-effort, then
    /// notifies the registry so its mapping for this instance is dropped.
    pub fn close(&self) -> Result<(), Error> {
        let mut open = self.0.open.lock();
        if !*open {
            return Ok(());
        }
        *open = false;
        drop(open);

        let streams = std::mem::take(&mut *self.0.streams.lock());
        if !streams.is_empty() {
            tracing::debug!(count = streams.len(), "closing file system, releasing open directory streams");
        }
        for flag in streams {
            flag.store(true, Ordering::Release);
        }

        if let Some(on_close) = self.0.on_close.lock().take() {
            on_close();
        }
        Ok(())
    }

    // -- Mutating operations: this file system is always read-only. --

    pub fn create_directory(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn create_link(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn create_symbolic_link(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn delete(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn delete_if_exists(&self) -> Result<bool, Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn copy(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn move_path(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }
    pub fn set_attribute(&self) -> Result<(), Error> {
        Err(Error::ReadOnlyFs)
    }

    // -- Unsupported read surfaces: named and failing, not omitted. --

    pub fn get_file_stores(&self) -> Result<(), Error> {
        Err(Error::Unsupported("getFileStores"))
    }
    pub fn new_watch_service(&self) -> Result<(), Error> {
        Err(Error::Unsupported("newWatchService"))
    }
    pub fn get_user_principal_lookup_service(&self) -> Result<(), Error> {
        Err(Error::Unsupported("getUserPrincipalLookupService"))
    }
    pub fn get_path_matcher(&self, _syntax_and_pattern: &str) -> Result<(), Error> {
        Err(Error::Unsupported("getPathMatcher"))
    }
    pub fn is_hidden(&self, _path: &LogicalPath<Self>) -> Result<bool, Error> {
        Err(Error::Unsupported("isHidden"))
    }
    pub fn is_same_file(&self, _a: &LogicalPath<Self>, _b: &LogicalPath<Self>) -> Result<bool, Error> {
        Err(Error::Unsupported("isSameFile"))
    }
    pub fn get_file_store(&self, _path: &LogicalPath<Self>) -> Result<(), Error> {
        Err(Error::Unsupported("getFileStore"))
    }
    pub fn get_file_attribute_view(&self, name: &str) -> Result<(), Error> {
        if name == "basic" {
            return Err(Error::Unsupported("getFileAttributeView only exposes readAttributes, not a live view"));
        }
        Err(Error::Unsupported("getFileAttributeView beyond basic"))
    }
    pub fn read_attribute_by_name(&self, _path: &LogicalPath<Self>, _name: &str) -> Result<(), Error> {
        Err(Error::Unsupported("attribute-by-name reads"))
    }
}
