//! The `gitjfs://` URI codec (C8, §6): composes and parses the bit-exact
//! grammar linking an authority (`FILE<dir>/` or `DFS/<name>`) and a query
//! string (`root=`, `internal-path=`) to a live [`FileSystemInstance`] and
//! the [`LogicalPath`] one of its paths names.

use std::path::{Path, PathBuf};

use jfs_path::{InternalPath, LogicalPath, RevisionToken};

use crate::error::Error;
use crate::instance::FileSystemInstance;
use crate::registry::Registry;

/// Which `gitjfs://` authority a live instance is bound under. Stored on
/// the instance itself so `to_uri` never needs a reverse registry lookup.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Identity {
    File(PathBuf),
    Dfs(String),
}

impl FileSystemInstance {
    /// This instance's URI plus `path`'s query parameters: `root=` when
    /// `path` is absolute, always `internal-path=`. Both are percent-escaped
    /// per [`jfs_path::uri::encode`].
    pub fn to_uri(&self, path: &LogicalPath<Self>) -> Result<String, Error> {
        let authority_path = match self.identity() {
            Identity::File(dir) => {
                let bytes = gix_path::into_bytes(std::borrow::Cow::Borrowed(dir.as_path()))
                    .map_err(|err| Error::InvalidPath(err.to_string()))?;
                let mut s =
                    String::from_utf8(bytes.into_owned()).map_err(|err| Error::InvalidPath(err.to_string()))?;
                if !s.ends_with('/') {
                    s.push('/');
                }
                format!("FILE{s}")
            }
            Identity::Dfs(name) => format!("DFS/{}", jfs_path::uri::encode(name.as_bytes())),
        };

        let mut query = String::new();
        if let Some(root) = path.root_token() {
            query.push_str("root=");
            query.push_str(&jfs_path::uri::encode(&root.to_component_string()));
            query.push('&');
        }
        query.push_str("internal-path=");
        query.push_str(&jfs_path::uri::encode(&path.internal().to_bstring()));

        Ok(format!("gitjfs://{authority_path}?{query}"))
    }
}

/// Parses a `gitjfs://...` URI, looks the live instance it names up via
/// the global [`Registry`], and reconstructs the [`LogicalPath`] its query
/// parameters describe. Fails with *not-found* if no instance is bound to
/// the parsed authority, *invalid-path* on any grammar violation.
pub fn from_uri(uri: &str) -> Result<LogicalPath<FileSystemInstance>, Error> {
    let rest = uri
        .strip_prefix("gitjfs://")
        .ok_or_else(|| Error::InvalidPath(format!("not a gitjfs uri: {uri}")))?;
    let (authority_and_path, query) = match rest.split_once('?') {
        Some((a, q)) => (a, Some(q)),
        None => (rest, None),
    };

    let fs = if let Some(dir) = authority_and_path.strip_prefix("FILE") {
        Registry::global().lookup_on_disk(Path::new(dir.trim_end_matches('/')))?
    } else if let Some(name) = authority_and_path.strip_prefix("DFS/") {
        let name = String::from_utf8(jfs_path::uri::decode(name)).map_err(|err| Error::InvalidPath(err.to_string()))?;
        Registry::global().lookup_dfs(&name)?
    } else {
        return Err(Error::InvalidPath(format!(
            "unknown gitjfs authority: {authority_and_path}"
        )));
    };

    let mut root: Option<RevisionToken> = None;
    let mut internal = InternalPath::empty();
    for pair in query.unwrap_or_default().split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::InvalidPath(format!("malformed query parameter: {pair}")))?;
        let decoded = jfs_path::uri::decode(value);
        match key {
            "root" => root = Some(RevisionToken::parse_component(&decoded)?),
            "internal-path" => internal = InternalPath::parse(&decoded),
            other => return Err(Error::InvalidPath(format!("unknown query parameter: {other}"))),
        }
    }

    Ok(match root {
        Some(token) => LogicalPath::absolute(fs, token, internal),
        None => LogicalPath::relative(fs, internal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jfs_odb::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn round_trips_a_dfs_absolute_path() {
        let fs = Registry::global()
            .register_dfs("uri-round-trip-example", Arc::new(MemoryStore::new()))
            .unwrap();
        let path = fs.get_path_root(gix_hash::ObjectId::null(gix_hash::Kind::Sha1));
        let path = path.resolve(&LogicalPath::relative(fs.clone(), InternalPath::parse(b"a/b")));

        let uri = fs.to_uri(&path).unwrap();
        assert!(uri.starts_with("gitjfs://DFS/uri-round-trip-example"));

        let parsed = from_uri(&uri).unwrap();
        assert_eq!(parsed, path);

        fs.close().unwrap();
    }
}
