/// Errors produced while parsing or combining paths.
///
/// These map onto the `invalid-path` and `illegal-argument` kinds of the
/// overall error taxonomy; higher layers (`jfs-fs`) fold them into their own
/// error type rather than re-exposing this one directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
}
