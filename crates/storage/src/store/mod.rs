#![forbid(unsafe_code)]

mod error;
mod support;
mod todos;

pub use error::StoreError;
pub use support::time::now_rfc3339;
pub use todos::TodoRepository;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const IN_MEMORY_PATH: &str = ":memory:";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Option<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).and_then(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            // Forces SQLite to read the header so a non-database file fails here.
            conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
            Ok(conn)
        });
        let conn = match conn {
            Ok(conn) => conn,
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "failed to open todo store");
                return Err(StoreError::StorageUnavailable { path, source });
            }
        };

        tracing::info!(path = %path.display(), "opened todo store");
        Ok(Self {
            conn: Some(conn),
            path,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let path = PathBuf::from(IN_MEMORY_PATH);
        let conn = Connection::open_in_memory()
            .map_err(|source| StoreError::StorageUnavailable {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            conn: Some(conn),
            path,
        })
    }

    // Closes on both paths; an error from `f` wins over a close error.
    pub fn with_open<T, E>(
        path: impl AsRef<Path>,
        f: impl FnOnce(&mut SqliteStore) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut store = Self::open(path)?;
        let result = f(&mut store);
        let closed = store.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    pub fn connection(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::StorageClosed)
    }

    pub fn connection_mut(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::StorageClosed)
    }

    pub fn close(&mut self) -> Result<(), StoreError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "closed todo store");
                Ok(())
            }
            // The connection is dropped with the error; SQLite finalizes it on drop.
            Err((_conn, err)) => Err(StoreError::Sql(err)),
        }
    }
}
