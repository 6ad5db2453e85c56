use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("index database storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("index database transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("index database table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("index database commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}
