//! PRAGMA configuration applied to every connection: WAL journal mode,
//! NORMAL sync, configurable mmap/cache sizes, busy timeout, foreign keys,
//! incremental auto_vacuum.

use rusqlite::Connection;

use openmemory_core::config::StorageConfig;

use crate::to_storage_err;
use openmemory_core::OpenMemoryResult;

/// Apply the full read/write pragma set to a connection.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> OpenMemoryResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA mmap_size = {mmap};
        PRAGMA cache_size = {cache};
        PRAGMA busy_timeout = {busy};
        PRAGMA foreign_keys = ON;
        PRAGMA auto_vacuum = INCREMENTAL;
        PRAGMA wal_autocheckpoint = {wal_pages};
        ",
        mmap = config.mmap_size_bytes,
        cache = config.cache_size_kib,
        busy = config.busy_timeout_ms,
        wal_pages = config.wal_autocheckpoint_pages,
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Lighter pragma set for read-only pool connections: no point paying for
/// a second writer-grade mmap/cache footprint per connection.
pub fn apply_read_pragmas(conn: &Connection, config: &StorageConfig) -> OpenMemoryResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA busy_timeout = {busy};
        PRAGMA foreign_keys = ON;
        ",
        busy = config.busy_timeout_ms,
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify WAL mode is actually active, for startup diagnostics.
pub fn verify_wal_mode(conn: &Connection) -> OpenMemoryResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
