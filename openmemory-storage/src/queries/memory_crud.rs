//! Insert, update, get, delete, and batch operations for memories.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use openmemory_core::constants::{MAX_BATCH_INSERT_SIZE, MAX_IDS_PER_BULK_GET};
use openmemory_core::models::Memory;
use openmemory_core::sector::Sector;
use openmemory_core::tenant::TenantId;
use openmemory_core::{OpenMemoryError, OpenMemoryResult};

use crate::codec::{
    decode_sector_set, decode_string_set, decode_vec_f32, decode_vec_i8, encode_sector_set,
    encode_string_set, encode_vec_f32, encode_vec_i8, tenant_column, tenant_from_column,
};
use crate::to_storage_err;

/// Flatten the two layers of fallibility `query_map` leaves us with: the
/// driver-level `rusqlite::Error` from fetching a row, and the
/// `OpenMemoryError` from decoding it.
fn collect_memory_rows(
    mapped: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<OpenMemoryResult<Memory>>>,
) -> OpenMemoryResult<Vec<Memory>> {
    let rows: Vec<OpenMemoryResult<Memory>> = mapped
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().collect()
}

const SELECT_COLUMNS: &str = "id, user_id, content, primary_sector, auxiliary_sectors, tags,
    metadata, created_at, updated_at, last_seen_at, salience, decay_lambda, version, segment,
    simhash, mean_vec, compressed_vec, feedback_score, generated_summary";

pub fn insert_memory(conn: &Connection, memory: &Memory) -> OpenMemoryResult<()> {
    let metadata_json =
        serde_json::to_string(&memory.metadata).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        &format!(
            "INSERT INTO memories ({SELECT_COLUMNS}) VALUES
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ),
        params![
            memory.id,
            tenant_column(&memory.user_id),
            memory.content,
            memory.primary_sector.as_str(),
            encode_sector_set(&memory.auxiliary_sectors)?,
            encode_string_set(&memory.tags)?,
            metadata_json,
            memory.created_at.to_rfc3339(),
            memory.updated_at.to_rfc3339(),
            memory.last_seen_at.to_rfc3339(),
            memory.salience,
            memory.decay_lambda,
            memory.version as i64,
            memory.segment,
            memory.simhash as i64,
            encode_vec_f32(&memory.mean_vec),
            memory.compressed_vec.as_deref().map(encode_vec_i8),
            memory.feedback_score,
            memory.generated_summary,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn batch_insert_memories(conn: &Connection, memories: &[Memory]) -> OpenMemoryResult<usize> {
    if memories.is_empty() {
        return Ok(0);
    }
    let mut inserted = 0;
    for chunk in memories.chunks(MAX_BATCH_INSERT_SIZE) {
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| to_storage_err(e.to_string()))?;
        for memory in chunk {
            if let Err(e) = insert_memory(conn, memory) {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e);
            }
            inserted += 1;
        }
        conn.execute_batch("COMMIT")
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(inserted)
}

pub fn get_memory(
    conn: &Connection,
    id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<Option<Memory>> {
    conn.query_row(
        &format!("SELECT {SELECT_COLUMNS} FROM memories WHERE id = ?1 AND user_id = ?2"),
        params![id, tenant_column(user_id)],
        row_to_memory,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .transpose()
}

pub fn get_memories_by_ids(
    conn: &Connection,
    ids: &[String],
    user_id: &TenantId,
) -> OpenMemoryResult<Vec<Memory>> {
    if ids.len() > MAX_IDS_PER_BULK_GET {
        return Err(OpenMemoryError::invalid_input(format!(
            "get_memories_by_ids accepts at most {MAX_IDS_PER_BULK_GET} ids, got {}",
            ids.len()
        )));
    }
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(memory) = get_memory(conn, id, user_id)? {
            out.push(memory);
        }
    }
    Ok(out)
}

pub fn update_memory(conn: &Connection, memory: &Memory) -> OpenMemoryResult<()> {
    let metadata_json =
        serde_json::to_string(&memory.metadata).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = conn
        .execute(
            "UPDATE memories SET
                content = ?3, primary_sector = ?4, auxiliary_sectors = ?5, tags = ?6,
                metadata = ?7, updated_at = ?8, last_seen_at = ?9, salience = ?10,
                decay_lambda = ?11, version = ?12, segment = ?13, simhash = ?14,
                mean_vec = ?15, compressed_vec = ?16, feedback_score = ?17,
                generated_summary = ?18
             WHERE id = ?1 AND user_id = ?2",
            params![
                memory.id,
                tenant_column(&memory.user_id),
                memory.content,
                memory.primary_sector.as_str(),
                encode_sector_set(&memory.auxiliary_sectors)?,
                encode_string_set(&memory.tags)?,
                metadata_json,
                memory.updated_at.to_rfc3339(),
                memory.last_seen_at.to_rfc3339(),
                memory.salience,
                memory.decay_lambda,
                memory.version as i64,
                memory.segment,
                memory.simhash as i64,
                encode_vec_f32(&memory.mean_vec),
                memory.compressed_vec.as_deref().map(encode_vec_i8),
                memory.feedback_score,
                memory.generated_summary,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(OpenMemoryError::not_found("memory", memory.id.clone()));
    }
    Ok(())
}

pub fn delete_memory(conn: &Connection, id: &str, user_id: &TenantId) -> OpenMemoryResult<()> {
    let rows = conn
        .execute(
            "DELETE FROM memories WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if rows == 0 {
        return Err(OpenMemoryError::not_found("memory", id));
    }
    Ok(())
}

pub fn delete_memories(
    conn: &Connection,
    ids: &[String],
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    for id in ids {
        if let Err(e) = conn.execute(
            "DELETE FROM memories WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id)],
        ) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(e.to_string()));
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_salience_batch(
    conn: &Connection,
    updates: &[(String, f64, DateTime<Utc>)],
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if updates.is_empty() {
        return Ok(());
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (id, salience, last_seen_at) in updates {
        if let Err(e) = conn.execute(
            "UPDATE memories SET salience = ?3, last_seen_at = ?4 WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id), salience, last_seen_at.to_rfc3339()],
        ) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(e.to_string()));
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_mean_vec(
    conn: &Connection,
    id: &str,
    user_id: &TenantId,
    mean_vec: &[f32],
) -> OpenMemoryResult<()> {
    let rows = conn
        .execute(
            "UPDATE memories SET mean_vec = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id), encode_vec_f32(mean_vec)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if rows == 0 {
        return Err(OpenMemoryError::not_found("memory", id));
    }
    Ok(())
}

pub fn update_summary_batch(
    conn: &Connection,
    updates: &[(String, String)],
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if updates.is_empty() {
        return Ok(());
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (id, summary) in updates {
        if let Err(e) = conn.execute(
            "UPDATE memories SET generated_summary = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id), summary],
        ) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(e.to_string()));
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_feedback(
    conn: &Connection,
    id: &str,
    user_id: &TenantId,
    delta: f64,
) -> OpenMemoryResult<()> {
    let rows = conn
        .execute(
            "UPDATE memories SET feedback_score = feedback_score + ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id), delta],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if rows == 0 {
        return Err(OpenMemoryError::not_found("memory", id));
    }
    Ok(())
}

pub fn find_by_simhash(
    conn: &Connection,
    user_id: &TenantId,
    simhash: u64,
) -> OpenMemoryResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM memories WHERE user_id = ?1 AND simhash = ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![tenant_column(user_id), simhash as i64], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_memory_rows(rows)
}

pub fn list_by_segment(
    conn: &Connection,
    user_id: &TenantId,
    segment: i64,
) -> OpenMemoryResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM memories WHERE user_id = ?1 AND segment = ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![tenant_column(user_id), segment], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_memory_rows(rows)
}

pub fn list_all_for_tenant(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<Vec<Memory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM memories WHERE user_id = ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![tenant_column(user_id)], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_memory_rows(rows)
}

pub fn list(
    conn: &Connection,
    user_id: &TenantId,
    limit: usize,
    cursor: Option<openmemory_core::traits::Cursor>,
) -> OpenMemoryResult<(Vec<Memory>, Option<openmemory_core::traits::Cursor>)> {
    let fetch_limit = limit.saturating_add(1).max(1);
    let rows: Vec<Memory> = match cursor {
        None => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM memories WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2"
                ))
                .map_err(|e| to_storage_err(e.to_string()))?;
            let mapped = stmt
                .query_map(params![tenant_column(user_id), fetch_limit as i64], row_to_memory)
                .map_err(|e| to_storage_err(e.to_string()))?;
            collect_memory_rows(mapped)?
        }
        Some(cur) => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM memories WHERE user_id = ?1
                     AND (created_at < ?2 OR (created_at = ?2 AND id < ?3))
                     ORDER BY created_at DESC, id DESC LIMIT ?4"
                ))
                .map_err(|e| to_storage_err(e.to_string()))?;
            let mapped = stmt
                .query_map(
                    params![
                        tenant_column(user_id),
                        cur.created_at.to_rfc3339(),
                        cur.id,
                        fetch_limit as i64
                    ],
                    row_to_memory,
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
            collect_memory_rows(mapped)?
        }
    };

    let mut page = rows;
    let next_cursor = if page.len() > limit {
        page.truncate(limit);
        page.last()
            .map(|m| openmemory_core::traits::Cursor {
                created_at: m.created_at,
                id: m.id.clone(),
            })
    } else {
        None
    };
    Ok((page, next_cursor))
}

/// Escape `%`, `_`, and the escape character itself so a raw user-supplied
/// substring can be safely used in a `LIKE ... ESCAPE '|'` clause.
pub fn escape_like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 8);
    for ch in needle.chars() {
        match ch {
            '%' | '_' | '|' => {
                escaped.push('|');
                escaped.push(ch);
            }
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn search_content_like(
    conn: &Connection,
    user_id: &TenantId,
    needle: &str,
    limit: usize,
) -> OpenMemoryResult<Vec<Memory>> {
    let pattern = format!("%{}%", escape_like_pattern(needle));
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM memories
             WHERE user_id = ?1 AND content LIKE ?2 ESCAPE '|'
             ORDER BY created_at DESC, id DESC LIMIT ?3"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(
            params![tenant_column(user_id), pattern, limit as i64],
            row_to_memory,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_memory_rows(rows)
}

fn row_to_memory(row: &rusqlite::Row<'_>) -> rusqlite::Result<OpenMemoryResult<Memory>> {
    let get_str = |idx: usize| -> Result<String, rusqlite::Error> { row.get(idx) };
    macro_rules! try_col {
        ($e:expr) => {
            match $e {
                Ok(v) => v,
                Err(err) => return Ok(Err(to_storage_err(err.to_string()))),
            }
        };
    }

    let primary_sector_str = try_col!(get_str(3));
    let auxiliary_sectors_json = try_col!(get_str(4));
    let tags_json = try_col!(get_str(5));
    let metadata_json = try_col!(get_str(6));
    let created_at_str = try_col!(get_str(7));
    let updated_at_str = try_col!(get_str(8));
    let last_seen_at_str = try_col!(get_str(9));
    let simhash_i64: i64 = try_col!(row.get(14));
    let mean_vec_bytes: Vec<u8> = try_col!(row.get(15));
    let compressed_vec_bytes: Option<Vec<u8>> = try_col!(row.get(16));
    let id: String = try_col!(row.get(0));
    let user_id_str: String = try_col!(row.get(1));
    let content: String = try_col!(row.get(2));
    let salience: f64 = try_col!(row.get(10));
    let decay_lambda: f64 = try_col!(row.get(11));
    let version: i64 = try_col!(row.get(12));
    let segment: i64 = try_col!(row.get(13));
    let feedback_score: f64 = try_col!(row.get(17));
    let generated_summary: Option<String> = try_col!(row.get(18));

    let build = || -> OpenMemoryResult<Memory> {
        let primary_sector = Sector::from_str_name(&primary_sector_str)
            .ok_or_else(|| to_storage_err(format!("unknown sector '{primary_sector_str}'")))?;

        let parse_dt = |s: &str| -> OpenMemoryResult<DateTime<Utc>> {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
        };

        Ok(Memory {
            id,
            user_id: tenant_from_column(&user_id_str),
            content,
            primary_sector,
            auxiliary_sectors: decode_sector_set(&auxiliary_sectors_json)?,
            tags: decode_string_set(&tags_json)?,
            metadata: serde_json::from_str(&metadata_json)
                .map_err(|e| to_storage_err(format!("parse metadata: {e}")))?,
            created_at: parse_dt(&created_at_str)?,
            updated_at: parse_dt(&updated_at_str)?,
            last_seen_at: parse_dt(&last_seen_at_str)?,
            salience,
            decay_lambda,
            version: version as u64,
            segment,
            simhash: simhash_i64 as u64,
            mean_vec: decode_vec_f32(&mean_vec_bytes),
            compressed_vec: compressed_vec_bytes.as_deref().map(decode_vec_i8),
            feedback_score,
            generated_summary,
        })
    };

    Ok(build())
}
