use std::collections::HashMap;

use jfs_odb::GitObjectRef;
use jfs_path::InternalPath;
use parking_lot::Mutex;

/// The two resolver-result slots a cached absolute path carries (§4.6): the
/// `follow-except-final` result and the `follow-all` result. When the
/// resolved object is not itself a symlink the two coincide; when it is,
/// only `real` is populated until a `follow-all` pass fills `link` too.
#[derive(Clone, Default)]
struct Slots {
    real: Option<GitObjectRef>,
    link: Option<GitObjectRef>,
}

struct Entry {
    root_sha: gix_hash::ObjectId,
    slots: Slots,
}

/// Memoizes [`crate::resolve`] results per absolute path, each entry
/// carrying its own snapshot of the root commit it was computed against.
/// A ref moving forward between two lookups of the same path is observed
/// as a cache miss for that path alone — other cached paths, possibly
/// rooted at different revisions, are unaffected.
#[derive(Default)]
pub struct PathCache {
    entries: Mutex<HashMap<InternalPath, Entry>>,
}

/// Which of the two resolver passes a cache lookup or store concerns.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Slot {
    /// The `follow-except-final` result.
    Real,
    /// The `follow-all` result.
    Link,
}

impl PathCache {
    pub fn new() -> Self {
        PathCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `slot` at `path`, provided the entry's
    /// snapshot matches `observed_root`; otherwise `None` (a miss, whether
    /// because nothing is cached yet or because the root moved on).
    pub fn get(
        &self,
        path: &InternalPath,
        observed_root: gix_hash::ObjectId,
        slot: Slot,
    ) -> Option<GitObjectRef> {
        let entries = self.entries.lock();
        let entry = entries.get(path)?;
        if entry.root_sha != observed_root {
            return None;
        }
        match slot {
            Slot::Real => entry.slots.real.clone(),
            Slot::Link => entry.slots.link.clone(),
        }
    }

    /// Records a fresh resolution. If `result` is not itself a symlink,
    /// both slots are set to it (a non-symlink resolves the same way under
    /// either follow policy); otherwise only `slot` is populated, leaving
    /// the other to be filled by a subsequent pass under the other policy.
    /// A stale entry for a different root is discarded, not merged with.
    pub fn put(
        &self,
        path: InternalPath,
        observed_root: gix_hash::ObjectId,
        slot: Slot,
        result: GitObjectRef,
    ) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(path).or_insert_with(|| Entry {
            root_sha: observed_root,
            slots: Slots::default(),
        });
        if entry.root_sha != observed_root {
            entry.root_sha = observed_root;
            entry.slots = Slots::default();
        }
        if result.file_mode.is_symlink() {
            match slot {
                Slot::Real => entry.slots.real = Some(result),
                Slot::Link => entry.slots.link = Some(result),
            }
        } else {
            entry.slots.real = Some(result.clone());
            entry.slots.link = Some(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jfs_odb::FileMode;

    fn object_ref(id: gix_hash::ObjectId, mode: FileMode) -> GitObjectRef {
        GitObjectRef {
            real_path: InternalPath::root(),
            object_id: id,
            file_mode: mode,
        }
    }

    #[test]
    fn returns_cached_value_for_matching_root() {
        let cache = PathCache::new();
        let root = gix_hash::ObjectId::null(gix_hash::Kind::Sha1);
        let path = InternalPath::parse(b"/a/b");
        assert!(cache.get(&path, root, Slot::Real).is_none());
        cache.put(path.clone(), root, Slot::Real, object_ref(root, FileMode::RegularFile));
        assert!(cache.get(&path, root, Slot::Real).is_some());
    }

    #[test]
    fn non_symlink_result_fills_both_slots() {
        let cache = PathCache::new();
        let root = gix_hash::ObjectId::null(gix_hash::Kind::Sha1);
        let path = InternalPath::parse(b"/a");
        cache.put(path.clone(), root, Slot::Real, object_ref(root, FileMode::RegularFile));
        assert!(cache.get(&path, root, Slot::Link).is_some());
    }

    #[test]
    fn symlink_result_only_fills_requested_slot() {
        let cache = PathCache::new();
        let root = gix_hash::ObjectId::null(gix_hash::Kind::Sha1);
        let path = InternalPath::parse(b"/link");
        cache.put(path.clone(), root, Slot::Real, object_ref(root, FileMode::Symlink));
        assert!(cache.get(&path, root, Slot::Real).is_some());
        assert!(cache.get(&path, root, Slot::Link).is_none());
    }

    #[test]
    fn distinct_paths_at_distinct_roots_do_not_thrash_each_other() {
        let cache = PathCache::new();
        let root_a = gix_hash::ObjectId::null(gix_hash::Kind::Sha1);
        let root_b = gix_hash::ObjectId::from_hex(b"0123456789abcdef0123456789abcdef01234567").unwrap();
        let path_a = InternalPath::parse(b"/a");
        let path_b = InternalPath::parse(b"/b");

        cache.put(path_a.clone(), root_a, Slot::Real, object_ref(root_a, FileMode::RegularFile));
        cache.put(path_b.clone(), root_b, Slot::Real, object_ref(root_b, FileMode::RegularFile));

        assert!(cache.get(&path_a, root_a, Slot::Real).is_some());
        assert!(cache.get(&path_b, root_b, Slot::Real).is_some());
    }

    #[test]
    fn stale_root_is_a_miss_and_is_discarded_on_next_write() {
        let cache = PathCache::new();
        let root_a = gix_hash::ObjectId::null(gix_hash::Kind::Sha1);
        let root_b = gix_hash::ObjectId::from_hex(b"0123456789abcdef0123456789abcdef01234567").unwrap();
        let path = InternalPath::parse(b"/a");

        cache.put(path.clone(), root_a, Slot::Real, object_ref(root_a, FileMode::RegularFile));
        assert!(cache.get(&path, root_b, Slot::Real).is_none());

        cache.put(path.clone(), root_b, Slot::Real, object_ref(root_b, FileMode::RegularFile));
        assert!(cache.get(&path, root_a, Slot::Real).is_none());
        assert!(cache.get(&path, root_b, Slot::Real).is_some());
    }
}
