//! The process-wide multi-instance registry (C8, §4.8): two disjoint
//! mappings, `on_disk_dir → fs` and `repo_name → fs`, each behind its own
//! lock (§5) so construction and lookup on one authority never blocks the
//! other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use jfs_odb::ObjectStore;
use parking_lot::Mutex;

use crate::error::Error;
use crate::instance::FileSystemInstance;
use crate::uri::Identity;

/// The global registry. Initialized on first use, matching the "installed
/// file-system provider" pattern §9 asks for without hiding it behind
/// magic: call [`Registry::global`] explicitly rather than relying on
/// ambient state threaded invisibly through every operation.
pub struct Registry {
    on_disk: Mutex<HashMap<PathBuf, FileSystemInstance>>,
    dfs: Mutex<HashMap<String, FileSystemInstance>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(|| Registry {
            on_disk: Mutex::new(HashMap::new()),
            dfs: Mutex::new(HashMap::new()),
        })
    }

    /// Opens the repository `gix::discover` would find starting at `dir`,
    /// and binds it to `dir`'s canonicalized form. Fails with
    /// `already-exists` if that key already names a live instance.
    pub fn open_on_disk(&self, dir: &Path, refuse_unreachable: bool) -> Result<FileSystemInstance, Error> {
        let canonical = dir.canonicalize().map_err(jfs_odb::Error::from)?;
        let mut map = self.on_disk.lock();
        if map.contains_key(&canonical) {
            tracing::warn!(dir = %canonical.display(), "refusing to reopen a live on-disk instance");
            return Err(Error::AlreadyExists(canonical.display().to_string()));
        }

        let mut store = jfs_odb::GixStore::discover(&canonical)?;
        if refuse_unreachable {
            store = store.refusing_unreachable();
        }

        let key = canonical.clone();
        let fs = FileSystemInstance::new(Identity::File(canonical.clone()), Arc::new(store), move || {
            Registry::global().on_disk.lock().remove(&key);
            tracing::debug!(dir = %key.display(), "on-disk instance closed, registry entry removed");
        });
        tracing::debug!(dir = %canonical.display(), "on-disk instance registered");
        map.insert(canonical, fs.clone());
        Ok(fs)
    }

    /// Binds an already-constructed object store as a `DFS`-authority
    /// instance named `name` (the path a `MemoryStore`-backed instance
    /// takes, per §4.8's "in-memory instance by its descriptive name").
    pub fn register_dfs(
        &self,
        name: impl Into<String>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<FileSystemInstance, Error> {
        let name = name.into();
        let mut map = self.dfs.lock();
        if map.contains_key(&name) {
            tracing::warn!(name = %name, "refusing to reopen a live DFS instance");
            return Err(Error::AlreadyExists(name));
        }

        let key = name.clone();
        let fs = FileSystemInstance::new(Identity::Dfs(name.clone()), store, move || {
            Registry::global().dfs.lock().remove(&key);
            tracing::debug!(name = %key, "DFS instance closed, registry entry removed");
        });
        tracing::debug!(name = %name, "DFS instance registered");
        map.insert(name, fs.clone());
        Ok(fs)
    }

    pub fn lookup_on_disk(&self, dir: &Path) -> Result<FileSystemInstance, Error> {
        let canonical = dir.canonicalize().map_err(jfs_odb::Error::from)?;
        self.on_disk
            .lock()
            .get(&canonical)
            .cloned()
            .ok_or_else(|| Error::NotFound(canonical.display().to_string()))
    }

    pub fn lookup_dfs(&self, name: &str) -> Result<FileSystemInstance, Error> {
        self.dfs
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jfs_odb::MemoryStore;

    #[test]
    fn reopening_a_live_dfs_name_fails_already_exists() {
        let registry = Registry::global();
        let fs = registry
            .register_dfs("registry-duplicate-example", Arc::new(MemoryStore::new()))
            .unwrap();
        let err = registry
            .register_dfs("registry-duplicate-example", Arc::new(MemoryStore::new()))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        fs.close().unwrap();
    }

    #[test]
    fn closing_frees_the_name_for_reuse() {
        let registry = Registry::global();
        let fs = registry
            .register_dfs("registry-reuse-example", Arc::new(MemoryStore::new()))
            .unwrap();
        fs.close().unwrap();
        let fs2 = registry
            .register_dfs("registry-reuse-example", Arc::new(MemoryStore::new()))
            .unwrap();
        fs2.close().unwrap();
    }

    #[test]
    fn lookup_of_an_unregistered_name_is_not_found() {
        let err = Registry::global().lookup_dfs("registry-never-registered").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
