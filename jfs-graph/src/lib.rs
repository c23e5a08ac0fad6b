//! The commit graph builder for `gitjfs`.
//!
//! [`CommitGraph`] is built by enumerating every `refs/...` entry and
//! walking the full history reachable from each; [`GraphCache`] memoizes
//! that result and rebuilds only when the observed ref tips move.
#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod builder;
mod error;

pub use builder::{CommitGraph, GraphCache};
pub use error::Error;
