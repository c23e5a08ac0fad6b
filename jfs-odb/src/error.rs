/// Errors surfaced by an [`crate::ObjectStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("object {0} not found")]
    NotFound(gix_hash::ObjectId),
    #[error("object {0} is unreachable from any ref")]
    Unreachable(gix_hash::ObjectId),
    #[error("object {0} is not a {1}")]
    WrongType(gix_hash::ObjectId, &'static str),
    #[error("ref {0} not found")]
    RefNotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("object store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Wraps an arbitrary backend error (e.g. from `gix`) without committing
/// this crate's public API to that backend's exact error types.
pub fn backend_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Backend(Box::new(err))
}
