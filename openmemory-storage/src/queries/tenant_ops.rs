//! Tenant-wide lifecycle and aggregate operations (spec.md §4.A
//! `cascade_delete_user`, §4.J).

use rusqlite::{params, Connection};

use openmemory_core::tenant::TenantId;
use openmemory_core::OpenMemoryResult;

use crate::codec::tenant_column;
use crate::to_storage_err;

/// Deletes, within the caller's transaction, every row this store owns for
/// `user_id`: waypoints, temporal edges, temporal facts, classifier state,
/// then memories themselves. Vectors are the caller's (`openmemory-vectors`)
/// responsibility and are dropped separately per spec.md §4.A's note that
/// `cascade_delete_user` "asks the Vector Store to drop any external
/// artifacts" after this step.
pub fn cascade_delete_memories_and_waypoints(
    conn: &Connection,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    let column = tenant_column(user_id);
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let run = || -> rusqlite::Result<()> {
        conn.execute("DELETE FROM waypoints WHERE user_id = ?1", params![column])?;
        conn.execute(
            "DELETE FROM temporal_edges WHERE user_id = ?1",
            params![column],
        )?;
        conn.execute(
            "DELETE FROM temporal_facts WHERE user_id = ?1",
            params![column],
        )?;
        conn.execute(
            "DELETE FROM classifier_weights WHERE user_id = ?1",
            params![column],
        )?;
        conn.execute(
            "DELETE FROM classifier_label_counters WHERE user_id = ?1",
            params![column],
        )?;
        conn.execute("DELETE FROM memories WHERE user_id = ?1", params![column])?;
        if let Some(uid) = user_id.as_str() {
            conn.execute("DELETE FROM users WHERE user_id = ?1", params![uid])?;
        }
        Ok(())
    };

    if let Err(e) = run() {
        let _ = conn.execute_batch("ROLLBACK");
        return Err(to_storage_err(e.to_string()));
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn count_for_tenant(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<u64> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
            params![tenant_column(user_id)],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as u64)
}

pub fn average_salience(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<f64> {
    let avg: Option<f64> = conn
        .query_row(
            "SELECT AVG(salience) FROM memories WHERE user_id = ?1",
            params![tenant_column(user_id)],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(avg.unwrap_or(0.0))
}

pub fn vacuum(conn: &Connection) -> OpenMemoryResult<()> {
    conn.execute_batch("PRAGMA incremental_vacuum;")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
