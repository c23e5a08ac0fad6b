#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Odb(#[from] jfs_odb::Error),
}
