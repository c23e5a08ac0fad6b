use bstr::BString;
use jfs_path::InternalPath;

/// The mode of a tree entry, as distinguished by the object store.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileMode {
    Tree,
    RegularFile,
    Executable,
    Symlink,
    Gitlink,
}

impl FileMode {
    pub fn is_tree(self) -> bool {
        matches!(self, FileMode::Tree)
    }

    pub fn is_symlink(self) -> bool {
        matches!(self, FileMode::Symlink)
    }

    pub fn is_regular_file(self) -> bool {
        matches!(self, FileMode::RegularFile | FileMode::Executable)
    }
}

/// A single entry as read directly out of a tree object, prior to any
/// resolution of `.`/`..`/symlinks.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeEntry {
    pub name: BString,
    pub id: gix_hash::ObjectId,
    pub mode: FileMode,
}

/// The outcome of resolving a path within a commit's tree: the absolute
/// internal path the resolver actually traversed to (with all but the
/// final symlink followed), the object's id, and its mode.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GitObjectRef {
    pub real_path: InternalPath,
    pub object_id: gix_hash::ObjectId,
    pub file_mode: FileMode,
}

/// A parsed git commit, retaining its body (author/committer/parents) the
/// way the commit graph builder needs for every reachable node.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitInfo {
    pub id: gix_hash::ObjectId,
    pub tree: gix_hash::ObjectId,
    pub author: gix_actor::Signature,
    pub committer: gix_actor::Signature,
    pub parents: Vec<gix_hash::ObjectId>,
}

impl PartialEq for CommitInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.tree == other.tree
            && self.author == other.author
            && self.committer == other.committer
            && self.parents == other.parents
    }
}
impl Eq for CommitInfo {}

/// The kind of change a tree-to-tree diff entry describes.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeType {
    Add,
    Delete,
    Modify,
    Rename,
    Copy,
}

/// A single file change between two commit trees.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffEntry {
    pub change_type: ChangeType,
    pub old_path: Option<InternalPath>,
    pub new_path: Option<InternalPath>,
}
