use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use bstr::BString;
use jfs_odb::{CommitInfo, ObjectStore};

use crate::error::Error;

/// An immutable view of every commit reachable from a repository's
/// `refs/...` entries at the moment it was built, plus the ref entries
/// themselves.
///
/// A graph never changes once built; a ref moving to a new commit is
/// observed by building a new graph, not by mutating this one (see
/// [`GraphCache`] for the memoized, auto-rebuilding entry point).
#[derive(Debug)]
pub struct CommitGraph {
    commits: HashMap<gix_hash::ObjectId, CommitInfo>,
    refs: HashMap<BString, gix_hash::ObjectId>,
}

impl CommitGraph {
    /// Enumerates every `refs/...` entry and walks the full history
    /// reachable from each, recording every commit's parents and body.
    pub fn build(store: &dyn ObjectStore) -> Result<Self, Error> {
        let refs: HashMap<BString, gix_hash::ObjectId> =
            store.enumerate_refs()?.into_iter().collect();

        let mut commits = HashMap::new();
        let mut queue: VecDeque<gix_hash::ObjectId> = refs.values().copied().collect();
        let mut queued: HashSet<gix_hash::ObjectId> = queue.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            if commits.contains_key(&id) {
                continue;
            }
            let info = store.read_commit(id)?;
            for parent in &info.parents {
                if queued.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
            commits.insert(id, info);
        }

        Ok(CommitGraph { commits, refs })
    }

    /// The parsed commit for `id`, if it is reachable from any ref.
    pub fn commit(&self, id: gix_hash::ObjectId) -> Option<&CommitInfo> {
        self.commits.get(&id)
    }

    /// The parent ids of `id`, empty both when `id` is a root commit and
    /// when it is not part of this graph.
    pub fn parents(&self, id: gix_hash::ObjectId) -> &[gix_hash::ObjectId] {
        self.commits
            .get(&id)
            .map(|info| info.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `id` is reachable from some ref in this graph.
    pub fn contains(&self, id: gix_hash::ObjectId) -> bool {
        self.commits.contains_key(&id)
    }

    /// The ref name to commit id mapping this graph was built from.
    pub fn refs(&self) -> &HashMap<BString, gix_hash::ObjectId> {
        &self.refs
    }

    /// The number of distinct commits reachable from any ref.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Memoizes the most recently built [`CommitGraph`], rebuilding only when
/// the observed `refs/...` tips have changed since the last build.
pub struct GraphCache {
    inner: arc_swap::ArcSwapOption<(Vec<(BString, gix_hash::ObjectId)>, Arc<CommitGraph>)>,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphCache {
    pub fn new() -> Self {
        GraphCache {
            inner: arc_swap::ArcSwapOption::from(None),
        }
    }

    /// Returns the cached graph if the store's ref tips match the last
    /// build, otherwise rebuilds and caches the result.
    pub fn get_or_build(&self, store: &dyn ObjectStore) -> Result<Arc<CommitGraph>, Error> {
        let mut current_refs = store.enumerate_refs()?;
        current_refs.sort();

        if let Some(entry) = self.inner.load_full() {
            if entry.0 == current_refs {
                return Ok(Arc::clone(&entry.1));
            }
        }

        let graph = Arc::new(CommitGraph::build(store)?);
        self.inner
            .store(Some(Arc::new((current_refs, Arc::clone(&graph)))));
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gix_date::{time::Sign, Time};
    use jfs_odb::MemoryStore;

    fn sig(name: &str) -> gix_actor::Signature {
        gix_actor::Signature {
            name: name.into(),
            email: format!("{name}@example.com").into(),
            time: Time {
                seconds: 1_700_000_000,
                offset: 0,
                sign: Sign::Plus,
            },
        }
    }

    fn commit(store: &MemoryStore, parents: Vec<gix_hash::ObjectId>) -> gix_hash::ObjectId {
        let tree = store.put_tree(vec![]);
        store.put_commit(CommitInfo {
            id: gix_hash::ObjectId::null(gix_hash::Kind::Sha1),
            tree,
            author: sig("a"),
            committer: sig("a"),
            parents,
        })
    }

    #[test]
    fn walks_full_history_reachable_from_a_ref() {
        let store = MemoryStore::new();
        let root = commit(&store, vec![]);
        let middle = commit(&store, vec![root]);
        let tip = commit(&store, vec![middle]);
        store.put_ref("refs/heads/main", tip);

        let graph = CommitGraph::build(&store).unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph.contains(root));
        assert_eq!(graph.parents(tip), &[middle]);
        assert_eq!(graph.refs().get(&BString::from("refs/heads/main")), Some(&tip));
    }

    #[test]
    fn merge_commit_reaches_both_parent_lines() {
        let store = MemoryStore::new();
        let base = commit(&store, vec![]);
        let left = commit(&store, vec![base]);
        let right = commit(&store, vec![base]);
        let merge = commit(&store, vec![left, right]);
        store.put_ref("refs/heads/main", merge);

        let graph = CommitGraph::build(&store).unwrap();
        assert_eq!(graph.len(), 4);
        assert!(graph.contains(left));
        assert!(graph.contains(right));
    }

    #[test]
    fn cache_reuses_result_until_refs_move() {
        let store = MemoryStore::new();
        let first = commit(&store, vec![]);
        store.put_ref("refs/heads/main", first);

        let cache = GraphCache::new();
        let graph_a = cache.get_or_build(&store).unwrap();
        let graph_b = cache.get_or_build(&store).unwrap();
        assert!(Arc::ptr_eq(&graph_a, &graph_b));

        let second = commit(&store, vec![first]);
        store.put_ref("refs/heads/main", second);
        let graph_c = cache.get_or_build(&store).unwrap();
        assert!(!Arc::ptr_eq(&graph_a, &graph_c));
        assert_eq!(graph_c.len(), 2);
    }
}
