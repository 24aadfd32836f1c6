//! Waypoint graph edges: upsert, lookup, reinforcement, cascade removal.

use rusqlite::{params, Connection, OptionalExtension};

use openmemory_core::models::Waypoint;
use openmemory_core::tenant::TenantId;
use openmemory_core::OpenMemoryResult;

use crate::codec::tenant_column;
use crate::to_storage_err;

pub fn upsert_waypoint(conn: &Connection, waypoint: &Waypoint) -> OpenMemoryResult<()> {
    conn.execute(
        "INSERT INTO waypoints (src_id, dst_id, user_id, weight, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(src_id, dst_id) DO UPDATE SET
            weight = excluded.weight,
            updated_at = excluded.updated_at",
        params![
            waypoint.src_id,
            waypoint.dst_id,
            tenant_column(&waypoint.user_id),
            Waypoint::clamp_weight(waypoint.weight),
            waypoint.created_at.to_rfc3339(),
            waypoint.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_waypoint(
    conn: &Connection,
    src_id: &str,
    dst_id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<Option<Waypoint>> {
    conn.query_row(
        "SELECT src_id, dst_id, user_id, weight, created_at, updated_at
         FROM waypoints WHERE src_id = ?1 AND dst_id = ?2 AND user_id = ?3",
        params![src_id, dst_id, tenant_column(user_id)],
        row_to_waypoint,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_waypoints_from(
    conn: &Connection,
    src_id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<Vec<Waypoint>> {
    let mut stmt = conn
        .prepare(
            "SELECT src_id, dst_id, user_id, weight, created_at, updated_at
             FROM waypoints WHERE src_id = ?1 AND user_id = ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.query_map(params![src_id, tenant_column(user_id)], row_to_waypoint)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn delete_waypoints_for_memory(
    conn: &Connection,
    memory_id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    conn.execute(
        "DELETE FROM waypoints WHERE (src_id = ?1 OR dst_id = ?1) AND user_id = ?2",
        params![memory_id, tenant_column(user_id)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn reinforce_waypoints(
    conn: &Connection,
    pairs: &[(String, String)],
    delta: f64,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if pairs.is_empty() {
        return Ok(());
    }
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (src, dst) in pairs {
        let result = conn.execute(
            "UPDATE waypoints SET
                weight = MIN(1.0, MAX(0.0, weight + ?4)),
                updated_at = ?5
             WHERE src_id = ?1 AND dst_id = ?2 AND user_id = ?3",
            params![src, dst, tenant_column(user_id), delta, now],
        );
        if let Err(e) = result {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(e.to_string()));
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Repoint every waypoint touching `from_memory_id` onto `to_memory_id`,
/// used when consolidation merges a memory into a survivor (spec.md §4.G).
pub fn repoint_waypoints(
    conn: &Connection,
    from_memory_id: &str,
    to_memory_id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let repoint = |conn: &Connection| -> rusqlite::Result<()> {
        conn.execute(
            "UPDATE OR IGNORE waypoints SET src_id = ?2 WHERE src_id = ?1 AND user_id = ?3",
            params![from_memory_id, to_memory_id, tenant_column(user_id)],
        )?;
        conn.execute(
            "UPDATE OR IGNORE waypoints SET dst_id = ?2 WHERE dst_id = ?1 AND user_id = ?3",
            params![from_memory_id, to_memory_id, tenant_column(user_id)],
        )?;
        conn.execute(
            "DELETE FROM waypoints WHERE (src_id = ?1 OR dst_id = ?1) AND user_id = ?2",
            params![from_memory_id, tenant_column(user_id)],
        )?;
        conn.execute(
            "DELETE FROM waypoints WHERE src_id = dst_id AND user_id = ?1",
            params![tenant_column(user_id)],
        )?;
        Ok(())
    };

    if let Err(e) = repoint(conn) {
        let _ = conn.execute_batch("ROLLBACK");
        return Err(to_storage_err(e.to_string()));
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn row_to_waypoint(row: &rusqlite::Row<'_>) -> rusqlite::Result<Waypoint> {
    let user_id_str: String = row.get(2)?;
    let created_at_str: String = row.get(4)?;
    let updated_at_str: String = row.get(5)?;
    Ok(Waypoint {
        src_id: row.get(0)?,
        dst_id: row.get(1)?,
        user_id: crate::codec::tenant_from_column(&user_id_str),
        weight: row.get(3)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
            })?,
        updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?,
    })
}
