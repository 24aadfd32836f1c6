//! Per-tenant user record: rolling summary and reflection counter.

use rusqlite::{params, Connection, OptionalExtension};

use openmemory_core::models::User;
use openmemory_core::OpenMemoryResult;

use crate::to_storage_err;

pub fn get_user(conn: &Connection, user_id: &str) -> OpenMemoryResult<Option<User>> {
    conn.query_row(
        "SELECT user_id, summary, reflection_count, created_at, updated_at
         FROM users WHERE user_id = ?1",
        params![user_id],
        row_to_user,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn upsert_user(conn: &Connection, user: &User) -> OpenMemoryResult<()> {
    conn.execute(
        "INSERT INTO users (user_id, summary, reflection_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            summary = excluded.summary,
            reflection_count = excluded.reflection_count,
            updated_at = excluded.updated_at",
        params![
            user.user_id,
            user.summary,
            user.reflection_count as i64,
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn list_tenant_ids(conn: &Connection) -> OpenMemoryResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM users ORDER BY user_id ASC")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(ids)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_at_str: String = row.get(3)?;
    let updated_at_str: String = row.get(4)?;
    let parse = |idx: usize, s: &str| -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
    };
    Ok(User {
        user_id: row.get(0)?,
        summary: row.get(1)?,
        reflection_count: row.get::<_, i64>(2)? as u64,
        created_at: parse(3, &created_at_str)?,
        updated_at: parse(4, &updated_at_str)?,
    })
}
