//! A process-wide name interner.
//!
//! Tree entry names and ref-path segments repeat heavily within a process
//! (the same `"src"`, `"Cargo.toml"`, `"refs/heads/main"` segments recur
//! across thousands of resolved paths), so we keep one canonical allocation
//! per distinct byte string, similar to how `jimfs` interns its `Name`
//! values. The table is global and only ever grows for the process
//! lifetime; paths are immutable and pervasively cloned, so this trades a
//! little memory bookkeeping for a lot of cheap `Arc` clones instead of
//! fresh `Vec<u8>` allocations.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// An interned path component.
pub type Name = Arc<[u8]>;

static TABLE: Lazy<Mutex<HashSet<Name>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Interns `bytes`, returning the process-wide shared handle for it.
pub fn name(bytes: &[u8]) -> Name {
    let mut table = TABLE.lock();
    if let Some(existing) = table.get(bytes) {
        return existing.clone();
    }
    let arc: Name = Arc::from(bytes);
    table.insert(arc.clone());
    arc
}

/// The unique interned empty name, used by the empty path.
pub fn empty_name() -> Name {
    name(b"")
}
