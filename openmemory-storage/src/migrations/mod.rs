//! Versioned, idempotent schema migrations, applied in order at startup.

mod v001_initial;

use rusqlite::Connection;

use openmemory_core::OpenMemoryResult;

use crate::to_storage_err;

type Migration = fn(&Connection) -> OpenMemoryResult<()>;

const MIGRATIONS: &[(i64, Migration)] = &[(1, v001_initial::migrate)];

pub fn run_migrations(conn: &Connection) -> OpenMemoryResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
                [version.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        if already_applied {
            continue;
        }
        migrate(conn)?;
        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version.to_string()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::info!(version, "applied migration");
    }
    Ok(())
}
