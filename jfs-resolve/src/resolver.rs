use std::collections::{HashSet, VecDeque};

use bstr::BString;
use jfs_odb::{FileMode, GitObjectRef, ObjectStore};
use jfs_path::InternalPath;

use crate::error::Error;
use crate::policy::FollowPolicy;

const MAX_SYMLINK_HOPS: usize = 40;

/// Resolves `path` to the object it names under `root_tree`, following
/// intermediate directories and symbolic links per `policy`.
///
/// Only `path`'s name sequence is consulted, not its absolute/relative
/// flag: the names are always interpreted as a chain under `root_tree`,
/// the same way a `LogicalPath`'s internal path is interpreted relative to
/// its revision's commit tree regardless of how that internal path itself
/// was constructed.
///
/// The walk keeps an explicit stack of tree ids rather than resetting to
/// `root_tree` on every `..`, since tree objects carry no parent pointer of
/// their own. Cycle detection keys on `(top_of_stack, remaining_names)`, the
/// same pair a legitimately-revisited tree can reach via two different
/// residual name sequences, so only a genuine repeat trips it.
pub fn resolve(
    store: &dyn ObjectStore,
    root_tree: gix_hash::ObjectId,
    path: &InternalPath,
    policy: FollowPolicy,
) -> Result<GitObjectRef, Error> {
    let mut tree_stack: Vec<gix_hash::ObjectId> = vec![root_tree];
    let mut current_path = InternalPath::root();
    let mut remaining: VecDeque<BString> = path.names().map(|n| n.to_owned()).collect();
    let mut visited: HashSet<(gix_hash::ObjectId, Vec<BString>)> = HashSet::new();
    let mut hops = 0usize;

    loop {
        if remaining.is_empty() {
            return Ok(GitObjectRef {
                real_path: current_path,
                object_id: *tree_stack.last().expect("tree_stack is never emptied without failing"),
                file_mode: FileMode::Tree,
            });
        }

        let key = (
            *tree_stack.last().expect("tree_stack is never emptied without failing"),
            remaining.iter().cloned().collect::<Vec<_>>(),
        );
        if !visited.insert(key) {
            return Err(Error::SymlinkCycle(path.clone()));
        }

        let name = remaining.pop_front().expect("checked non-empty above");

        if name.is_empty() || name.as_slice() == b".".as_slice() {
            continue;
        }
        if name.as_slice() == b"..".as_slice() {
            tree_stack.pop();
            if tree_stack.is_empty() {
                return Err(Error::NotFound(path.clone()));
            }
            current_path = current_path.parent().unwrap_or_else(InternalPath::root);
            continue;
        }

        let is_final = remaining.is_empty();
        let current_tree = *tree_stack.last().expect("tree_stack is never emptied without failing");
        let entries = store.read_tree(current_tree)?;
        let entry = entries
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::NotFound(path.clone()))?;
        let entry_path = current_path.resolve(&InternalPath::parse(&name));

        match entry.mode {
            FileMode::RegularFile | FileMode::Executable | FileMode::Gitlink => {
                if !is_final {
                    return Err(Error::NotFound(path.clone()));
                }
                return Ok(GitObjectRef {
                    real_path: entry_path,
                    object_id: entry.id,
                    file_mode: entry.mode,
                });
            }
            FileMode::Tree => {
                tree_stack.push(entry.id);
                current_path = entry_path;
            }
            FileMode::Symlink => {
                let should_follow = if is_final {
                    policy.follows_final()
                } else {
                    policy.follows_intermediate()
                };

                if !should_follow {
                    if !is_final {
                        return Err(Error::PathCouldNotBeFound(path.clone()));
                    }
                    return Ok(GitObjectRef {
                        real_path: entry_path,
                        object_id: entry.id,
                        file_mode: FileMode::Symlink,
                    });
                }

                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(Error::SymlinkCycle(path.clone()));
                }

                let target_bytes = store.blob_bytes(entry.id)?;
                let target = std::str::from_utf8(&target_bytes)
                    .map_err(|_| Error::InvalidSymlinkTarget(path.clone()))?;
                if target.starts_with('/') {
                    return Err(Error::AbsoluteSymlinkTarget(path.clone()));
                }

                let target_path = InternalPath::parse(target.as_bytes());
                let mut spliced: VecDeque<BString> =
                    target_path.names().map(|n| n.to_owned()).collect();
                spliced.extend(remaining.drain(..));
                remaining = spliced;
            }
        }
    }
}
