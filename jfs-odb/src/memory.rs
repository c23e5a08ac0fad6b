//! An in-memory [`ObjectStore`], built by hand rather than by shelling out
//! to `git`, for use in tests and for `DFS`-registered (non-disk-backed)
//! file-system instances.

use std::collections::{HashMap, HashSet, VecDeque};

use bstr::{BString, ByteSlice};
use parking_lot::RwLock;
use sha1::{Digest, Sha1};

use crate::error::Error;
use crate::store::ObjectStore;
use crate::types::{ChangeType, CommitInfo, DiffEntry, FileMode, TreeEntry};

#[derive(Clone)]
enum StoredObject {
    Blob(Vec<u8>),
    Tree(Vec<TreeEntry>),
    Commit(CommitInfo),
}

/// A hand-built object graph, addressed the same way a real repository
/// would be: object ids are the SHA-1 of the object's canonical git
/// encoding, computed as objects are inserted.
pub struct MemoryStore {
    objects: RwLock<HashMap<gix_hash::ObjectId, StoredObject>>,
    refs: RwLock<HashMap<BString, gix_hash::ObjectId>>,
    refuse_unreachable: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            objects: RwLock::new(HashMap::new()),
            refs: RwLock::new(HashMap::new()),
            refuse_unreachable: false,
        }
    }

    /// Returns a store that additionally refuses to serve objects it cannot
    /// prove are reachable from some `refs/...` entry.
    pub fn refusing_unreachable(mut self) -> Self {
        self.refuse_unreachable = true;
        self
    }

    fn hash(kind: &str, body: &[u8]) -> gix_hash::ObjectId {
        let header = format!("{kind} {}\0", body.len());
        let mut hasher = Sha1::new();
        hasher.update(header.as_bytes());
        hasher.update(body);
        let digest = hasher.finalize();
        gix_hash::ObjectId::from_bytes_or_panic(&digest)
    }

    /// Inserts a blob, returning its computed id.
    pub fn put_blob(&self, content: &[u8]) -> gix_hash::ObjectId {
        let id = Self::hash("blob", content);
        self.objects
            .write()
            .insert(id, StoredObject::Blob(content.to_vec()));
        id
    }

    /// Inserts a tree, returning its computed id. Entries must already be
    /// sorted the way git requires (directory entries sort as though their
    /// name carried a trailing `/`); callers are expected to pass entries in
    /// that order since this store does not re-sort them.
    pub fn put_tree(&self, entries: Vec<TreeEntry>) -> gix_hash::ObjectId {
        let mut body = Vec::new();
        for entry in &entries {
            let mode_str = match entry.mode {
                FileMode::Tree => "40000",
                FileMode::RegularFile => "100644",
                FileMode::Executable => "100755",
                FileMode::Symlink => "120000",
                FileMode::Gitlink => "160000",
            };
            body.extend_from_slice(mode_str.as_bytes());
            body.push(b' ');
            body.extend_from_slice(&entry.name);
            body.push(0);
            body.extend_from_slice(entry.id.as_bytes());
        }
        let id = Self::hash("tree", &body);
        self.objects.write().insert(id, StoredObject::Tree(entries));
        id
    }

    /// Inserts a commit, returning its computed id.
    pub fn put_commit(&self, mut info: CommitInfo) -> gix_hash::ObjectId {
        let mut body = Vec::new();
        body.extend_from_slice(format!("tree {}\n", info.tree).as_bytes());
        for parent in &info.parents {
            body.extend_from_slice(format!("parent {parent}\n").as_bytes());
        }
        body.extend_from_slice(format!("author {}\n", signature_line(&info.author)).as_bytes());
        body.extend_from_slice(format!("committer {}\n", signature_line(&info.committer)).as_bytes());
        let id = Self::hash("commit", &body);
        info.id = id;
        self.objects.write().insert(id, StoredObject::Commit(info));
        id
    }

    /// Points a ref at a commit, creating or overwriting it.
    pub fn put_ref(&self, name: impl Into<BString>, target: gix_hash::ObjectId) {
        self.refs.write().insert(name.into(), target);
    }

    /// Every commit id reachable from some `refs/...` entry, walked fresh
    /// each time rather than cached: only consulted when
    /// `refuse_unreachable` is set, which is off by default and off for
    /// every store built outside that explicit opt-in.
    fn reachable_commit_ids(&self) -> HashSet<gix_hash::ObjectId> {
        let mut queue: VecDeque<gix_hash::ObjectId> = self.refs.read().values().copied().collect();
        let mut seen: HashSet<gix_hash::ObjectId> = queue.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if let Some(StoredObject::Commit(info)) = self.objects.read().get(&id) {
                for parent in &info.parents {
                    if seen.insert(*parent) {
                        queue.push_back(*parent);
                    }
                }
            }
        }
        seen
    }

    /// Recursively walks `tree_id`, collecting every leaf (blob, symlink,
    /// gitlink) under its full path. Used by `diff_trees` so a change deep
    /// inside a subtree is reported by the file it touched, not by the
    /// subtree object that happens to wrap it.
    fn flatten_tree(
        &self,
        tree_id: gix_hash::ObjectId,
        prefix: &jfs_path::InternalPath,
        out: &mut Vec<(jfs_path::InternalPath, TreeEntry)>,
    ) -> Result<(), Error> {
        for entry in self.read_tree(tree_id)? {
            let path = prefix.resolve(&jfs_path::InternalPath::parse(&entry.name));
            match entry.mode {
                FileMode::Tree => self.flatten_tree(entry.id, &path, out)?,
                _ => out.push((path, entry)),
            }
        }
        Ok(())
    }
}

/// Renders a signature the way git's commit object format requires:
/// `name <email> seconds offset`.
fn signature_line(sig: &gix_actor::Signature) -> String {
    let sign = match sig.time.sign {
        gix_date::time::Sign::Plus => '+',
        gix_date::time::Sign::Minus => '-',
    };
    let offset_minutes = sig.time.offset.unsigned_abs() / 60;
    format!(
        "{} <{}> {} {}{:02}{:02}",
        sig.name,
        sig.email,
        sig.time.seconds,
        sign,
        offset_minutes / 60,
        offset_minutes % 60,
    )
}

impl ObjectStore for MemoryStore {
    fn blob_bytes(&self, id: gix_hash::ObjectId) -> Result<Vec<u8>, Error> {
        match self.objects.read().get(&id) {
            Some(StoredObject::Blob(bytes)) => Ok(bytes.clone()),
            Some(_) => Err(Error::WrongType(id, "blob")),
            None => Err(Error::NotFound(id)),
        }
    }

    fn blob_size(&self, id: gix_hash::ObjectId) -> Result<u64, Error> {
        self.blob_bytes(id).map(|bytes| bytes.len() as u64)
    }

    fn read_commit(&self, id: gix_hash::ObjectId) -> Result<CommitInfo, Error> {
        match self.objects.read().get(&id) {
            Some(StoredObject::Commit(info)) => {
                if self.refuse_unreachable && !self.reachable_commit_ids().contains(&id) {
                    return Err(Error::Unreachable(id));
                }
                Ok(info.clone())
            }
            Some(_) => Err(Error::WrongType(id, "commit")),
            None => Err(Error::NotFound(id)),
        }
    }

    fn read_tree(&self, id: gix_hash::ObjectId) -> Result<Vec<TreeEntry>, Error> {
        match self.objects.read().get(&id) {
            Some(StoredObject::Tree(entries)) => Ok(entries.clone()),
            Some(_) => Err(Error::WrongType(id, "tree")),
            None => Err(Error::NotFound(id)),
        }
    }

    fn enumerate_refs(&self) -> Result<Vec<(BString, gix_hash::ObjectId)>, Error> {
        Ok(self
            .refs
            .read()
            .iter()
            .filter(|(name, _)| name.starts_with(b"refs/"))
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }

    fn diff_trees(
        &self,
        old_commit: gix_hash::ObjectId,
        new_commit: gix_hash::ObjectId,
    ) -> Result<Vec<DiffEntry>, Error> {
        let old_tree = self.read_commit(old_commit)?.tree;
        let new_tree = self.read_commit(new_commit)?.tree;

        let mut old_entries = Vec::new();
        self.flatten_tree(old_tree, &jfs_path::InternalPath::root(), &mut old_entries)?;
        let mut new_entries = Vec::new();
        self.flatten_tree(new_tree, &jfs_path::InternalPath::root(), &mut new_entries)?;

        let old_by_path: HashMap<&jfs_path::InternalPath, &TreeEntry> =
            old_entries.iter().map(|(path, entry)| (path, entry)).collect();
        let new_by_path: HashMap<&jfs_path::InternalPath, &TreeEntry> =
            new_entries.iter().map(|(path, entry)| (path, entry)).collect();

        let mut diffs = Vec::new();
        for (path, entry) in &new_entries {
            match old_by_path.get(path) {
                None => diffs.push(DiffEntry {
                    change_type: ChangeType::Add,
                    old_path: None,
                    new_path: Some(path.clone()),
                }),
                Some(old_entry) if old_entry.id != entry.id || old_entry.mode != entry.mode => {
                    diffs.push(DiffEntry {
                        change_type: ChangeType::Modify,
                        old_path: Some(path.clone()),
                        new_path: Some(path.clone()),
                    })
                }
                Some(_) => {}
            }
        }
        for (path, _entry) in &old_entries {
            if !new_by_path.contains_key(path) {
                diffs.push(DiffEntry {
                    change_type: ChangeType::Delete,
                    old_path: Some(path.clone()),
                    new_path: None,
                });
            }
        }
        diffs.sort_by(|a, b| {
            let key = |d: &DiffEntry| d.new_path.clone().or_else(|| d.old_path.clone());
            key(a).cmp(&key(b))
        });
        Ok(diffs)
    }

    fn refuses_unreachable(&self) -> bool {
        self.refuse_unreachable
    }
}
