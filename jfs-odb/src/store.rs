use crate::error::Error;
use crate::types::{CommitInfo, DiffEntry, TreeEntry};
use bstr::BString;

/// The object-store collaborator contract (§6 of the design): commit/tree
/// parsing, blob streaming, ref enumeration, and tree-to-tree diffing,
/// treated as opaque capabilities the core (path model, tree resolver,
/// commit graph, file-system instance) never reaches past.
///
/// Implementations decide for themselves what "unreachable" means and
/// whether to refuse such objects; [`ObjectStore::refuses_unreachable`]
/// only reports the current policy so callers (and tests) can assert on
/// it, it does not configure it.
pub trait ObjectStore: Send + Sync {
    /// The full bytes of a blob object.
    fn blob_bytes(&self, id: gix_hash::ObjectId) -> Result<Vec<u8>, Error>;

    /// The size of a blob object without necessarily reading its content.
    fn blob_size(&self, id: gix_hash::ObjectId) -> Result<u64, Error>;

    /// Parses a commit object into `(tree, parents, author, committer)`.
    fn read_commit(&self, id: gix_hash::ObjectId) -> Result<CommitInfo, Error>;

    /// Parses a tree object into its ordered `(name, id, mode)` entries.
    fn read_tree(&self, id: gix_hash::ObjectId) -> Result<Vec<TreeEntry>, Error>;

    /// Direct `refs/...` entries (no symbolic refs), each peeled to the
    /// commit it ultimately names.
    fn enumerate_refs(&self) -> Result<Vec<(BString, gix_hash::ObjectId)>, Error>;

    /// The tree-to-tree diff between two commits' trees, in canonical
    /// (path-sorted) order, with rename/copy detection where the backend
    /// supports it.
    fn diff_trees(&self, old_commit: gix_hash::ObjectId, new_commit: gix_hash::ObjectId) -> Result<Vec<DiffEntry>, Error>;

    /// Whether this store refuses to return objects it cannot prove are
    /// reachable from some `refs/...` entry.
    fn refuses_unreachable(&self) -> bool;
}
