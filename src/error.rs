use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The fetched batch cannot be normalized (e.g. a track without artists).
    #[error("Malformed source data: {0}")]
    SourceData(String),

    /// The external source could not produce a batch.
    #[error("Failed to fetch batch: {0}")]
    Fetch(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// A uniqueness or foreign-key check failed on a table the merge
    /// expected to be conflict-free.
    #[error("Constraint violation writing {table}: {source}")]
    ConstraintViolation {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Maps a write failure on `table` to the right variant.
    pub fn from_write(table: &'static str, err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                SyncError::ConstraintViolation { table, source: err }
            }
            _ => SyncError::StorageUnavailable(err),
        }
    }
}
