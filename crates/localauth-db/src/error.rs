//! Database-specific error types and conversions.

use localauth_core::error::LocalAuthError;
use rusqlite::ErrorCode;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Store is closed")]
    Closed,

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// If this error is a UNIQUE constraint violation, return the
    /// offending `(table, column)`.
    pub fn unique_violation(&self) -> Option<(&str, &str)> {
        let DbError::Sqlite(rusqlite::Error::SqliteFailure(err, Some(msg))) = self else {
            return None;
        };
        if err.code != ErrorCode::ConstraintViolation {
            return None;
        }
        let target = msg.strip_prefix("UNIQUE constraint failed: ")?;
        // Composite constraints list several columns; the first is enough.
        let first = target.split(',').next()?.trim();
        first.split_once('.')
    }
}

impl From<DbError> for LocalAuthError {
    fn from(err: DbError) -> Self {
        if let Some((table, column)) = err.unique_violation() {
            let entity = match table {
                "users" => "user",
                "apps" => "app",
                other => other,
            };
            return LocalAuthError::AlreadyExists {
                entity: entity.into(),
                field: column.into(),
            };
        }
        match err {
            DbError::NotFound { entity, id } => LocalAuthError::NotFound { entity, id },
            other => LocalAuthError::Storage(other.to_string()),
        }
    }
}
