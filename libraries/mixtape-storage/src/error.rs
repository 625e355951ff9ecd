/// Storage-specific errors
use mixtape_core::{Code, CodeKind, MixtapeError};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Requested schema version is not one of the known migrations
    #[error("Unknown schema version: {0}")]
    UnknownVersion(i64),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for MixtapeError {
    fn from(err: StorageError) -> Self {
        MixtapeError::Database(err.to_string())
    }
}

/// SQLite constraint a failed write tripped over
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Violation {
    /// `UNIQUE` or primary key; carries SQLite's `table.column` list
    Unique(String),
    ForeignKey,
    Check,
}

pub(crate) fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    match db_err.kind() {
        ErrorKind::UniqueViolation => {
            // "UNIQUE constraint failed: playlist_entry.playlist_id, playlist_entry.position"
            let columns = db_err
                .message()
                .split_once(": ")
                .map(|(_, cols)| cols.to_string())
                .unwrap_or_default();
            Some(Violation::Unique(columns))
        }
        ErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey),
        ErrorKind::CheckViolation => Some(Violation::Check),
        _ => None,
    }
}

/// Translate a failed insert of a coded row.
///
/// A unique violation on the `code` column means the allocator handed out a
/// value twice, which is an integrity failure and never retried.
pub(crate) fn coded_insert_error(
    err: sqlx::Error,
    table: &str,
    kind: CodeKind,
    code: &Code,
) -> MixtapeError {
    match violation(&err) {
        Some(Violation::Unique(columns)) if columns == format!("{table}.code") => {
            tracing::error!(%kind, %code, "allocated code already present");
            MixtapeError::DuplicateCode {
                kind,
                code: code.clone(),
            }
        }
        _ => err.into(),
    }
}
