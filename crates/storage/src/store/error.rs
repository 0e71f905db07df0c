#![forbid(unsafe_code)]

use rusqlite::ErrorCode;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    StorageUnavailable {
        path: PathBuf,
        source: rusqlite::Error,
    },
    StorageClosed,
    RecordNotFound {
        position: i64,
    },
    ConstraintViolation(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sql(_) => "SQLITE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            Self::StorageClosed => "STORAGE_CLOSED",
            Self::RecordNotFound { .. } => "NOT_FOUND",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::StorageUnavailable { path, source } => {
                write!(f, "storage unavailable ({}): {source}", path.display())
            }
            Self::StorageClosed => write!(f, "storage is closed"),
            Self::RecordNotFound { position } => {
                write!(f, "no todo at position {position}")
            }
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            Self::StorageUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, message) = &value
            && code.code == ErrorCode::ConstraintViolation
        {
            let detail = message
                .clone()
                .unwrap_or_else(|| "constraint failed".to_string());
            return Self::ConstraintViolation(detail);
        }
        Self::Sql(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_map_to_constraint_violation() {
        let sqlite = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed: todos.position".to_string()),
        );
        let err = StoreError::from(sqlite);
        assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
        assert!(err.to_string().contains("todos.position"));
    }

    #[test]
    fn other_sqlite_failures_stay_sql() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.code(), "SQLITE");
    }

    #[test]
    fn not_found_reports_position() {
        let err = StoreError::RecordNotFound { position: 4 };
        assert_eq!(err.to_string(), "no todo at position 4");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
