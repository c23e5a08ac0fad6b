//! Integration tests exercising the concrete scenarios and a handful of
//! the invariants from the specification's testable-properties section,
//! against hand-built [`MemoryStore`] fixtures (no on-disk git repository
//! is available in this environment).

use std::io::Read as _;
use std::sync::Arc;

use gix_date::{time::Sign, Time};
use jfs::{ChangeType, Error, FileMode, MemoryStore, Registry, TreeEntry};
use jfs_odb::CommitInfo;

const MAIN: &str = "refs/heads/main";

fn sig(name: &str) -> gix_actor::Signature {
    gix_actor::Signature {
        name: name.into(),
        email: format!("{name}@example.com").into(),
        time: Time { seconds: 1_700_000_000, offset: 0, sign: Sign::Plus },
    }
}

fn commit(store: &MemoryStore, tree: gix_hash::ObjectId, parents: Vec<gix_hash::ObjectId>) -> gix_hash::ObjectId {
    store.put_commit(CommitInfo {
        id: gix_hash::ObjectId::null(gix_hash::Kind::Sha1),
        tree,
        author: sig("author"),
        committer: sig("author"),
        parents,
    })
}

fn read_to_string(channel: &mut jfs::ByteChannel) -> String {
    let mut buf = Vec::new();
    channel.read_to_end(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

/// S1. Basic read: a relative path, a dotted relative path, and an
/// absolute path rooted explicitly at the commit all read the same blob.
#[test]
fn s1_basic_read() {
    let store = MemoryStore::new();
    let blob = store.put_blob(b"Hello, world");
    let tree = store.put_tree(vec![TreeEntry { name: "file1.txt".into(), id: blob, mode: FileMode::RegularFile }]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("s1-basic-read", Arc::new(store)).unwrap();

    let relative = fs.get_path("file1.txt", &[]).unwrap();
    let mut channel = fs.new_byte_channel(&relative, true).unwrap();
    assert_eq!(read_to_string(&mut channel), "Hello, world");

    let dotted = fs.get_path("./file1.txt", &[]).unwrap();
    let mut channel = fs.new_byte_channel(&dotted, true).unwrap();
    assert_eq!(read_to_string(&mut channel), "Hello, world");

    let absolute = fs.get_absolute_path(&format!("/{c1}//file1.txt")).unwrap();
    let mut channel = fs.new_byte_channel(&absolute, true).unwrap();
    assert_eq!(read_to_string(&mut channel), "Hello, world");

    fs.close().unwrap();
}

/// S2. Reading a name absent from the tree raises no-such-file.
#[test]
fn s2_missing_file() {
    let store = MemoryStore::new();
    let tree = store.put_tree(vec![]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("s2-missing-file", Arc::new(store)).unwrap();

    let path = fs.get_path("missing.txt", &[]).unwrap();
    assert!(!fs.exists(&path, true).unwrap());
    let err = fs.new_byte_channel(&path, true).unwrap_err();
    assert!(matches!(err, Error::NoSuchFile(_)));

    fs.close().unwrap();
}

/// S3. A symbolic link is transparently followed by default; requesting
/// no-follow on a path that terminates in a link instead fails.
#[test]
fn s3_link_follow() {
    let store = MemoryStore::new();
    let content = store.put_blob(b"X");
    let link = store.put_blob(b"real.txt");
    let tree = store.put_tree(vec![
        TreeEntry { name: "link.txt".into(), id: link, mode: FileMode::Symlink },
        TreeEntry { name: "real.txt".into(), id: content, mode: FileMode::RegularFile },
    ]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("s3-link-follow", Arc::new(store)).unwrap();
    let path = fs.get_path("link.txt", &[]).unwrap();

    let mut channel = fs.new_byte_channel(&path, true).unwrap();
    assert_eq!(read_to_string(&mut channel), "X");

    let err = fs.new_byte_channel(&path, false).unwrap_err();
    assert!(matches!(err, Error::PathCouldNotBeFound(_)));

    fs.close().unwrap();
}

/// S4. A symlink that refers back to itself through its parent directory
/// is detected and fails rather than looping forever.
#[test]
fn s4_cycle() {
    let store = MemoryStore::new();
    let link = store.put_blob(b"../dir/cyclingLink");
    let dir = store.put_tree(vec![TreeEntry { name: "cyclingLink".into(), id: link, mode: FileMode::Symlink }]);
    let tree = store.put_tree(vec![TreeEntry { name: "dir".into(), id: dir, mode: FileMode::Tree }]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("s4-cycle", Arc::new(store)).unwrap();

    let path = fs.get_path("dir/cyclingLink", &[]).unwrap();
    let err = fs.new_byte_channel(&path, true).unwrap_err();
    assert!(matches!(err, Error::PathCouldNotBeFound(_)));

    // S4: existence is ambiguous (false) once links are followed, but the
    // link itself is a perfectly good leaf under no-follow.
    assert!(!fs.exists(&path, true).unwrap());
    assert!(fs.exists(&path, false).unwrap());

    fs.close().unwrap();
}

/// S5. A symlink whose stored target is an absolute path (`/etc/passwd`)
/// cannot be resolved within this file system: reading its raw target
/// fails distinctly from reading through it.
#[test]
fn s5_absolute_link() {
    let store = MemoryStore::new();
    let link = store.put_blob(b"/etc/passwd");
    let tree = store.put_tree(vec![TreeEntry { name: "abslink".into(), id: link, mode: FileMode::Symlink }]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("s5-absolute-link", Arc::new(store)).unwrap();
    let path = fs.get_path("abslink", &[]).unwrap();

    let err = fs.read_symbolic_link(&path).unwrap_err();
    match err {
        Error::AbsoluteLink { target } => assert_eq!(target, "/etc/passwd"),
        other => panic!("expected AbsoluteLink, got {other:?}"),
    }

    let err = fs.new_byte_channel(&path, true).unwrap_err();
    assert!(matches!(err, Error::PathCouldNotBeFound(_)));

    fs.close().unwrap();
}

/// S6. The commit graph reaches every ancestor of a ref tip, and an
/// instance's graph is memoized until the observed ref tips move.
#[test]
fn s6_parents_and_graph() {
    let store = MemoryStore::new();
    let empty_tree = store.put_tree(vec![]);
    let root = commit(&store, empty_tree, vec![]);
    let middle = commit(&store, empty_tree, vec![root]);
    let tip = commit(&store, empty_tree, vec![middle]);
    store.put_ref(MAIN, tip);

    let fs = Registry::global().register_dfs("s6-parents-and-graph", Arc::new(store)).unwrap();

    let graph = fs.graph().unwrap();
    assert!(graph.contains(root));
    assert_eq!(graph.parents(tip), &[middle]);
    assert_eq!(graph.len(), 3);

    let graph_again = fs.graph().unwrap();
    assert!(Arc::ptr_eq(&graph, &graph_again));

    fs.close().unwrap();
}

/// S7. Diffing two path-roots reports every added, modified, and deleted
/// leaf by its full path, not by the subtree object that wraps it; diffing
/// a root against itself is empty.
#[test]
fn s7_diff() {
    let store = MemoryStore::new();
    let file1 = store.put_blob(b"unchanged");
    let tree_c1 = store.put_tree(vec![TreeEntry { name: "file1.txt".into(), id: file1, mode: FileMode::RegularFile }]);
    let c1 = commit(&store, tree_c1, vec![]);

    let nested = store.put_blob(b"nested content");
    let dir = store.put_tree(vec![TreeEntry { name: "file".into(), id: nested, mode: FileMode::RegularFile }]);
    let file2 = store.put_blob(b"second file");
    let tree_c3 = store.put_tree(vec![
        TreeEntry { name: "dir".into(), id: dir, mode: FileMode::Tree },
        TreeEntry { name: "file1.txt".into(), id: file1, mode: FileMode::RegularFile },
        TreeEntry { name: "file2".into(), id: file2, mode: FileMode::RegularFile },
    ]);
    let c3 = commit(&store, tree_c3, vec![c1]);

    store.put_ref(MAIN, c3);
    let fs = Registry::global().register_dfs("s7-diff", Arc::new(store)).unwrap();

    let root_c1 = fs.get_path_root(c1);
    let root_c3 = fs.get_path_root(c3);

    let diff = fs.diff(&root_c1, &root_c3).unwrap();
    assert_eq!(diff.len(), 2);
    assert_eq!(diff[0].change_type, ChangeType::Add);
    assert_eq!(diff[0].new_path.as_ref().unwrap().to_string(), "/dir/file");
    assert_eq!(diff[1].change_type, ChangeType::Add);
    assert_eq!(diff[1].new_path.as_ref().unwrap().to_string(), "/file2");

    let empty = fs.diff(&root_c1, &root_c1).unwrap();
    assert!(empty.is_empty());

    fs.close().unwrap();
}

/// S8. The registry binds a live instance to a unique name, refuses a
/// second registration under the same name, and frees the name once the
/// first instance is closed.
#[test]
fn s8_registry() {
    let registry = Registry::global();

    let store_a = MemoryStore::new();
    let fs_a = registry.register_dfs("s8-registry", Arc::new(store_a)).unwrap();

    let looked_up = registry.lookup_dfs("s8-registry").unwrap();
    assert_eq!(fs_a, looked_up);

    let store_b = MemoryStore::new();
    let err = registry.register_dfs("s8-registry", Arc::new(store_b)).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    fs_a.close().unwrap();
    assert!(matches!(registry.lookup_dfs("s8-registry").unwrap_err(), Error::NotFound(_)));

    let store_c = MemoryStore::new();
    let fs_c = registry.register_dfs("s8-registry", Arc::new(store_c)).unwrap();
    fs_c.close().unwrap();
}

/// The `gitjfs://` URI a path renders to round-trips back to an equal
/// path through the same registered instance.
#[test]
fn uri_round_trips() {
    let store = MemoryStore::new();
    let blob = store.put_blob(b"content");
    let tree = store.put_tree(vec![TreeEntry { name: "a.txt".into(), id: blob, mode: FileMode::RegularFile }]);
    let c1 = commit(&store, tree, vec![]);
    store.put_ref(MAIN, c1);

    let fs = Registry::global().register_dfs("uri-round-trip-scenario", Arc::new(store)).unwrap();
    let path = fs.get_absolute_path(&format!("/{c1}//a.txt")).unwrap();

    let uri = fs.to_uri(&path).unwrap();
    let parsed = jfs::from_uri(&uri).unwrap();
    assert_eq!(parsed, path);

    fs.close().unwrap();
}
