//! A disk-backed [`ObjectStore`] wrapping the `gix` crate.

use std::path::Path;

use bstr::{BString, ByteSlice};

use crate::error::{backend_error, Error};
use crate::store::ObjectStore;
use crate::types::{ChangeType, CommitInfo, DiffEntry, FileMode, TreeEntry};

/// Opens a repository the same way `gix::open` does: it handles both a
/// regular `.git` directory and a worktree's `.git` file transparently, so
/// this store never special-cases either.
pub struct GixStore {
    repo: gix::Repository,
    refuse_unreachable: bool,
}

impl GixStore {
    /// Opens the repository at `path`, which may be any directory inside it.
    pub fn discover(path: &Path) -> Result<Self, Error> {
        let repo = gix::discover(path).map_err(backend_error)?;
        Ok(Self {
            repo,
            refuse_unreachable: false,
        })
    }

    /// Opens the repository rooted exactly at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let repo = gix::open(path).map_err(backend_error)?;
        Ok(Self {
            repo,
            refuse_unreachable: false,
        })
    }

    /// Returns a store that additionally refuses to serve objects it cannot
    /// prove are reachable from some `refs/...` entry.
    pub fn refusing_unreachable(mut self) -> Self {
        self.refuse_unreachable = true;
        self
    }

    fn find_commit(&self, id: gix_hash::ObjectId) -> Result<gix::Commit<'_>, Error> {
        self.repo
            .find_object(id)
            .map_err(|_| Error::NotFound(id))?
            .try_into_commit()
            .map_err(|_| Error::WrongType(id, "commit"))
    }

    fn find_tree(&self, id: gix_hash::ObjectId) -> Result<gix::Tree<'_>, Error> {
        self.repo
            .find_object(id)
            .map_err(|_| Error::NotFound(id))?
            .try_into_tree()
            .map_err(|_| Error::WrongType(id, "tree"))
    }

    /// Every commit id reachable from some `refs/...` entry, walked fresh
    /// each time rather than cached: only consulted when
    /// `refuse_unreachable` is set.
    fn reachable_commit_ids(&self) -> Result<std::collections::HashSet<gix_hash::ObjectId>, Error> {
        let platform = self.repo.references().map_err(backend_error)?;
        let mut seen = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        for reference in platform.all().map_err(backend_error)? {
            let mut reference = reference.map_err(backend_error)?;
            if !reference.name().as_bstr().starts_with(b"refs/") {
                continue;
            }
            let id = reference.peel_to_id_in_place().map_err(backend_error)?.detach();
            if seen.insert(id) {
                queue.push_back(id);
            }
        }
        while let Some(id) = queue.pop_front() {
            if let Ok(commit) = self.find_commit(id) {
                for parent in commit.parent_ids() {
                    let parent = parent.detach();
                    if seen.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
        }
        Ok(seen)
    }
}

/// `gix`'s diff locations are tree-relative (`dir/file`, no leading `/`);
/// [`DiffEntry`] paths are rooted at the commit tree the way `jfs-resolve`
/// and `MemoryStore::diff_trees` both produce them, so every caller can
/// render `old_path`/`new_path` without first checking which store built
/// the diff.
fn absolute_internal_path(location: &[u8]) -> jfs_path::InternalPath {
    let mut bytes = Vec::with_capacity(location.len() + 1);
    bytes.push(b'/');
    bytes.extend_from_slice(location);
    jfs_path::InternalPath::parse(&bytes)
}

fn mode_from_entry_kind(kind: gix::object::tree::EntryKind) -> FileMode {
    use gix::object::tree::EntryKind;
    match kind {
        EntryKind::Tree => FileMode::Tree,
        EntryKind::Blob => FileMode::RegularFile,
        EntryKind::BlobExecutable => FileMode::Executable,
        EntryKind::Link => FileMode::Symlink,
        EntryKind::Commit => FileMode::Gitlink,
    }
}

impl ObjectStore for GixStore {
    fn blob_bytes(&self, id: gix_hash::ObjectId) -> Result<Vec<u8>, Error> {
        let object = self.repo.find_object(id).map_err(|_| Error::NotFound(id))?;
        if !object.kind.is_blob() {
            return Err(Error::WrongType(id, "blob"));
        }
        Ok(object.data.to_vec())
    }

    fn blob_size(&self, id: gix_hash::ObjectId) -> Result<u64, Error> {
        let header = self
            .repo
            .find_header(id)
            .map_err(|_| Error::NotFound(id))?;
        Ok(header.size())
    }

    fn read_commit(&self, id: gix_hash::ObjectId) -> Result<CommitInfo, Error> {
        if self.refuse_unreachable && !self.reachable_commit_ids()?.contains(&id) {
            return Err(Error::Unreachable(id));
        }
        let commit = self.find_commit(id)?;
        let tree = commit
            .tree_id()
            .map_err(|_| Error::WrongType(id, "commit with tree"))?
            .detach();
        let author = commit
            .author()
            .map_err(backend_error)?
            .to_owned()
            .map_err(backend_error)?;
        let committer = commit
            .committer()
            .map_err(backend_error)?
            .to_owned()
            .map_err(backend_error)?;
        let parents = commit.parent_ids().map(|id| id.detach()).collect();
        Ok(CommitInfo {
            id,
            tree,
            author,
            committer,
            parents,
        })
    }

    fn read_tree(&self, id: gix_hash::ObjectId) -> Result<Vec<TreeEntry>, Error> {
        let tree = self.find_tree(id)?;
        let mut entries = Vec::new();
        for entry in tree.iter() {
            let entry = entry.map_err(backend_error)?;
            entries.push(TreeEntry {
                name: BString::from(entry.filename().to_owned()),
                id: entry.object_id(),
                mode: mode_from_entry_kind(entry.mode().kind()),
            });
        }
        Ok(entries)
    }

    fn enumerate_refs(&self) -> Result<Vec<(BString, gix_hash::ObjectId)>, Error> {
        let platform = self.repo.references().map_err(backend_error)?;
        let mut out = Vec::new();
        for reference in platform.all().map_err(backend_error)? {
            let mut reference = reference.map_err(backend_error)?;
            let name = BString::from(reference.name().as_bstr().to_owned());
            if !name.starts_with(b"refs/") {
                continue;
            }
            let id = reference.peel_to_id_in_place().map_err(backend_error)?;
            out.push((name, id.detach()));
        }
        Ok(out)
    }

    fn diff_trees(
        &self,
        old_commit: gix_hash::ObjectId,
        new_commit: gix_hash::ObjectId,
    ) -> Result<Vec<DiffEntry>, Error> {
        use gix::object::tree::diff::ChangeDetached;

        let old_tree = self.find_tree(self.find_commit(old_commit)?.tree_id().map_err(backend_error)?.detach())?;
        let new_tree = self.find_tree(self.find_commit(new_commit)?.tree_id().map_err(backend_error)?.detach())?;

        let changes = self
            .repo
            .diff_tree_to_tree(&old_tree, &new_tree, None)
            .map_err(backend_error)?;

        let mut entries = Vec::new();
        for change in changes {
            let entry = match change {
                ChangeDetached::Addition { location, .. } => DiffEntry {
                    change_type: ChangeType::Add,
                    old_path: None,
                    new_path: Some(absolute_internal_path(location.as_bytes())),
                },
                ChangeDetached::Deletion { location, .. } => DiffEntry {
                    change_type: ChangeType::Delete,
                    old_path: Some(absolute_internal_path(location.as_bytes())),
                    new_path: None,
                },
                ChangeDetached::Modification { location, .. } => DiffEntry {
                    change_type: ChangeType::Modify,
                    old_path: Some(absolute_internal_path(location.as_bytes())),
                    new_path: Some(absolute_internal_path(location.as_bytes())),
                },
                ChangeDetached::Rewrite {
                    source_location,
                    location,
                    copy,
                    ..
                } => DiffEntry {
                    change_type: if copy { ChangeType::Copy } else { ChangeType::Rename },
                    old_path: Some(absolute_internal_path(source_location.as_bytes())),
                    new_path: Some(absolute_internal_path(location.as_bytes())),
                },
            };
            entries.push(entry);
        }
        entries.sort_by(|a, b| {
            let key = |d: &DiffEntry| d.new_path.clone().or_else(|| d.old_path.clone());
            key(a).cmp(&key(b))
        });
        Ok(entries)
    }

    fn refuses_unreachable(&self) -> bool {
        self.refuse_unreachable
    }
}
