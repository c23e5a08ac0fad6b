//! The object-store collaborator contract for `gitjfs`.
//!
//! [`ObjectStore`] is the seam between the path/resolver/graph layers and
//! git object storage: nothing above this crate knows whether objects come
//! from a real repository on disk or were assembled by hand for a test.
#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
#[cfg(feature = "gix-backend")]
mod gix_store;
mod memory;
mod store;
mod types;

pub use error::{backend_error, Error};
#[cfg(feature = "gix-backend")]
pub use gix_store::GixStore;
pub use memory::MemoryStore;
pub use store::ObjectStore;
pub use types::{ChangeType, CommitInfo, DiffEntry, FileMode, GitObjectRef, TreeEntry};
