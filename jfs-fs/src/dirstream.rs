use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jfs_odb::TreeEntry;
use jfs_path::{InternalPath, LogicalPath};

use crate::error::Error;
use crate::instance::FileSystemInstance;

/// A single-use, one-element-lookahead iterator over a directory's
/// entries (§5, §9 "Directory-stream iterator contract").
///
/// `iterator()` may be obtained at most once from the value that created
/// this stream; that is enforced one level up, by
/// [`FileSystemInstance::new_directory_stream`] handing out an already-
/// constructed `DirectoryStream` rather than a re-callable factory.
/// `has_next`-style read-ahead is implemented by eagerly pre-fetching the
/// next element the moment the previous one is yielded, so once
/// `peek`/`next` has observed an element, producing it again performs no
/// further I/O.
pub struct DirectoryStream {
    fs: FileSystemInstance,
    dir_path: LogicalPath<FileSystemInstance>,
    remaining: std::vec::IntoIter<TreeEntry>,
    lookahead: Option<Result<LogicalPath<FileSystemInstance>, Error>>,
    closed: Arc<AtomicBool>,
}

impl DirectoryStream {
    pub(crate) fn new(
        fs: FileSystemInstance,
        dir_path: LogicalPath<FileSystemInstance>,
        entries: Vec<TreeEntry>,
        closed: Arc<AtomicBool>,
    ) -> Self {
        let mut stream = DirectoryStream {
            fs,
            dir_path,
            remaining: entries.into_iter(),
            lookahead: None,
            closed,
        };
        stream.advance();
        stream
    }

    fn advance(&mut self) {
        self.lookahead = self.remaining.next().map(|entry| {
            let name_path = LogicalPath::relative(self.fs.clone(), InternalPath::parse(&entry.name));
            Ok(self.dir_path.resolve(&name_path))
        });
    }
}

impl Iterator for DirectoryStream {
    type Item = Result<LogicalPath<FileSystemInstance>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        let item = self.lookahead.take()?;
        self.advance();
        Some(item)
    }
}

impl Drop for DirectoryStream {
    fn drop(&mut self) {
        self.fs.stream_dropped(&self.closed);
    }
}
