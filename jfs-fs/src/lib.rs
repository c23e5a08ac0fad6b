//! The public file-system instance and registry for `gitjfs` (C7, C8): byte
//! channels, directory streams, attribute reads, real-path resolution,
//! tree diffing, access checks, and the `gitjfs://` URI codec binding a
//! live [`FileSystemInstance`] to its two possible authorities.
#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod channel;
mod dirstream;
mod error;
mod instance;
mod registry;
mod uri;

pub use channel::ByteChannel;
pub use dirstream::DirectoryStream;
pub use error::Error;
pub use instance::{AccessMode, Attributes, FileSystemInstance};
pub use registry::Registry;
pub use uri::{from_uri, Identity};
