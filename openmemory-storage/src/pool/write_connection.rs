//! The single writer connection. SQLite allows only one writer at a time;
//! serializing writes through one connection behind a mutex avoids
//! `SQLITE_BUSY` storms under WAL (spec.md §5: "a single writer
//! connection, serialized").

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use openmemory_core::config::StorageConfig;
use openmemory_core::OpenMemoryResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> OpenMemoryResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> OpenMemoryResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure with exclusive access to the writer connection.
    pub fn with_conn<F, T>(&self, f: F) -> OpenMemoryResult<T>
    where
        F: FnOnce(&Connection) -> OpenMemoryResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
