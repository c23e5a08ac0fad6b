use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

/// A size-bounded, random-access, read-only view over a blob's bytes.
///
/// Implements [`Read`] and [`Seek`] the way a real byte channel would;
/// there is no write half since every mutating path fails earlier, at
/// `newByteChannel`'s option check.
pub struct ByteChannel {
    cursor: Cursor<Arc<[u8]>>,
}

impl ByteChannel {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        ByteChannel {
            cursor: Cursor::new(Arc::from(bytes)),
        }
    }

    /// The total size of the underlying blob, independent of the current
    /// read position.
    pub fn size(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }
}

impl Read for ByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for ByteChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_content_and_reports_size() {
        let mut channel = ByteChannel::new(b"hello world".to_vec());
        assert_eq!(channel.size(), 11);
        let mut buf = Vec::new();
        channel.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello world");
    }

    #[test]
    fn supports_random_access_via_seek() {
        let mut channel = ByteChannel::new(b"0123456789".to_vec());
        channel.seek(SeekFrom::Start(5)).unwrap();
        let mut buf = [0u8; 3];
        channel.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"567");
    }
}
