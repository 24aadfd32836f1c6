//! Temporal facts and edges (spec.md §4.H, §6 `temporal_facts`/`temporal_edges`).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use openmemory_core::models::{FactQuery, TemporalEdge, TemporalFact};
use openmemory_core::tenant::TenantId;
use openmemory_core::OpenMemoryResult;

use crate::codec::{tenant_column, tenant_from_column};
use crate::to_storage_err;

const FACT_COLUMNS: &str = "id, user_id, subject, predicate, object, valid_from, valid_to,
    confidence, metadata, last_updated";

pub fn insert_fact(conn: &Connection, fact: &TemporalFact) -> OpenMemoryResult<()> {
    let metadata_json =
        serde_json::to_string(&fact.metadata).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        &format!(
            "INSERT INTO temporal_facts ({FACT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            fact.id,
            tenant_column(&fact.user_id),
            fact.subject,
            fact.predicate,
            fact.object,
            fact.valid_from.to_rfc3339(),
            fact.valid_to.map(|t| t.to_rfc3339()),
            fact.confidence,
            metadata_json,
            fact.last_updated.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_fact(
    conn: &Connection,
    id: &str,
    user_id: &TenantId,
) -> OpenMemoryResult<Option<TemporalFact>> {
    conn.query_row(
        &format!("SELECT {FACT_COLUMNS} FROM temporal_facts WHERE id = ?1 AND user_id = ?2"),
        params![id, tenant_column(user_id)],
        row_to_fact,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .transpose()
}

pub fn update_fact(conn: &Connection, fact: &TemporalFact) -> OpenMemoryResult<()> {
    let metadata_json =
        serde_json::to_string(&fact.metadata).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        "UPDATE temporal_facts SET
            subject = ?3, predicate = ?4, object = ?5, valid_from = ?6, valid_to = ?7,
            confidence = ?8, metadata = ?9, last_updated = ?10
         WHERE id = ?1 AND user_id = ?2",
        params![
            fact.id,
            tenant_column(&fact.user_id),
            fact.subject,
            fact.predicate,
            fact.object,
            fact.valid_from.to_rfc3339(),
            fact.valid_to.map(|t| t.to_rfc3339()),
            fact.confidence,
            metadata_json,
            fact.last_updated.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_open_fact(
    conn: &Connection,
    user_id: &TenantId,
    subject: &str,
    predicate: &str,
) -> OpenMemoryResult<Option<TemporalFact>> {
    conn.query_row(
        &format!(
            "SELECT {FACT_COLUMNS} FROM temporal_facts
             WHERE user_id = ?1 AND subject = ?2 AND predicate = ?3 AND valid_to IS NULL"
        ),
        params![tenant_column(user_id), subject, predicate],
        row_to_fact,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .transpose()
}

pub fn query_facts(
    conn: &Connection,
    user_id: &TenantId,
    query: &FactQuery,
) -> OpenMemoryResult<Vec<TemporalFact>> {
    let mut sql = format!("SELECT {FACT_COLUMNS} FROM temporal_facts WHERE user_id = ?1");
    let mut clauses: Vec<String> = Vec::new();
    if query.subject.is_some() {
        clauses.push("subject = ?".to_string());
    }
    if query.predicate.is_some() {
        clauses.push("predicate = ?".to_string());
    }
    if query.object.is_some() {
        clauses.push("object = ?".to_string());
    }
    // valid_at is applied in Rust below since it needs half-open interval
    // semantics rusqlite's typed params don't express cleanly inline.
    let mut idx = 2;
    for clause in &clauses {
        sql.push_str(" AND ");
        sql.push_str(&clause.replace('?', &format!("?{idx}")));
        idx += 1;
    }

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let mut bound: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(tenant_column(user_id).to_string())];
    if let Some(s) = &query.subject {
        bound.push(Box::new(s.clone()));
    }
    if let Some(p) = &query.predicate {
        bound.push(Box::new(p.clone()));
    }
    if let Some(o) = &query.object {
        bound.push(Box::new(o.clone()));
    }
    let params_ref: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let rows = stmt
        .query_map(params_ref.as_slice(), row_to_fact)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let facts: Vec<TemporalFact> = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?
        .into_iter()
        .collect::<OpenMemoryResult<Vec<_>>>()?;

    match query.valid_at {
        Some(at) => Ok(facts.into_iter().filter(|f| f.contains(at)).collect()),
        None => Ok(facts),
    }
}

pub fn list_facts_for_subject(
    conn: &Connection,
    user_id: &TenantId,
    subject: &str,
    predicate: Option<&str>,
) -> OpenMemoryResult<Vec<TemporalFact>> {
    let rows = match predicate {
        Some(pred) => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {FACT_COLUMNS} FROM temporal_facts
                     WHERE user_id = ?1 AND subject = ?2 AND predicate = ?3
                     ORDER BY valid_from ASC"
                ))
                .map_err(|e| to_storage_err(e.to_string()))?;
            stmt.query_map(params![tenant_column(user_id), subject, pred], row_to_fact)
                .map_err(|e| to_storage_err(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_storage_err(e.to_string()))?
        }
        None => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {FACT_COLUMNS} FROM temporal_facts
                     WHERE user_id = ?1 AND subject = ?2
                     ORDER BY valid_from ASC"
                ))
                .map_err(|e| to_storage_err(e.to_string()))?;
            stmt.query_map(params![tenant_column(user_id), subject], row_to_fact)
                .map_err(|e| to_storage_err(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_storage_err(e.to_string()))?
        }
    };
    rows.into_iter().collect()
}

pub fn insert_edge(conn: &Connection, edge: &TemporalEdge) -> OpenMemoryResult<()> {
    conn.execute(
        "INSERT INTO temporal_edges
            (id, user_id, source_fact_id, target_fact_id, relation, weight, valid_from, valid_to)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            edge.id,
            tenant_column(&edge.user_id),
            edge.source_fact_id,
            edge.target_fact_id,
            edge.relation,
            edge.weight,
            edge.valid_from.to_rfc3339(),
            edge.valid_to.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_edge(conn: &Connection, edge: &TemporalEdge) -> OpenMemoryResult<()> {
    conn.execute(
        "UPDATE temporal_edges SET
            relation = ?3, weight = ?4, valid_from = ?5, valid_to = ?6
         WHERE id = ?1 AND user_id = ?2",
        params![
            edge.id,
            tenant_column(&edge.user_id),
            edge.relation,
            edge.weight,
            edge.valid_from.to_rfc3339(),
            edge.valid_to.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_open_edge(
    conn: &Connection,
    user_id: &TenantId,
    source_fact_id: &str,
    target_fact_id: &str,
    relation: &str,
) -> OpenMemoryResult<Option<TemporalEdge>> {
    conn.query_row(
        "SELECT id, user_id, source_fact_id, target_fact_id, relation, weight, valid_from, valid_to
         FROM temporal_edges
         WHERE user_id = ?1 AND source_fact_id = ?2 AND target_fact_id = ?3 AND relation = ?4
           AND valid_to IS NULL",
        params![tenant_column(user_id), source_fact_id, target_fact_id, relation],
        row_to_edge,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn delete_facts_for_user(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<()> {
    conn.execute(
        "DELETE FROM temporal_facts WHERE user_id = ?1",
        params![tenant_column(user_id)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn delete_edges_for_user(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<()> {
    conn.execute(
        "DELETE FROM temporal_edges WHERE user_id = ?1",
        params![tenant_column(user_id)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn list_facts_older_than(
    conn: &Connection,
    user_id: &TenantId,
    horizon: DateTime<Utc>,
) -> OpenMemoryResult<Vec<TemporalFact>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {FACT_COLUMNS} FROM temporal_facts WHERE user_id = ?1 AND valid_from < ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![tenant_column(user_id), horizon.to_rfc3339()], row_to_fact)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?
        .into_iter()
        .collect()
}

pub fn update_confidence_batch(
    conn: &Connection,
    updates: &[(String, f64)],
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if updates.is_empty() {
        return Ok(());
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (id, confidence) in updates {
        if let Err(e) = conn.execute(
            "UPDATE temporal_facts SET confidence = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, tenant_column(user_id), confidence],
        ) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(e.to_string()));
        }
    }
    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn row_to_fact(row: &rusqlite::Row<'_>) -> rusqlite::Result<OpenMemoryResult<TemporalFact>> {
    let id: String = row.get(0)?;
    let user_id_str: String = row.get(1)?;
    let subject: String = row.get(2)?;
    let predicate: String = row.get(3)?;
    let object: String = row.get(4)?;
    let valid_from_str: String = row.get(5)?;
    let valid_to_str: Option<String> = row.get(6)?;
    let confidence: f64 = row.get(7)?;
    let metadata_json: String = row.get(8)?;
    let last_updated_str: String = row.get(9)?;

    let build = || -> OpenMemoryResult<TemporalFact> {
        let parse_dt = |s: &str| -> OpenMemoryResult<DateTime<Utc>> {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
        };
        Ok(TemporalFact {
            id,
            user_id: tenant_from_column(&user_id_str),
            subject,
            predicate,
            object,
            valid_from: parse_dt(&valid_from_str)?,
            valid_to: valid_to_str.as_deref().map(parse_dt).transpose()?,
            confidence,
            metadata: serde_json::from_str(&metadata_json)
                .map_err(|e| to_storage_err(format!("parse metadata: {e}")))?,
            last_updated: parse_dt(&last_updated_str)?,
        })
    };
    Ok(build())
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemporalEdge> {
    let user_id_str: String = row.get(1)?;
    let valid_from_str: String = row.get(6)?;
    let valid_to_str: Option<String> = row.get(7)?;
    let parse = |idx: usize, s: &str| -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
    };
    Ok(TemporalEdge {
        id: row.get(0)?,
        user_id: tenant_from_column(&user_id_str),
        source_fact_id: row.get(2)?,
        target_fact_id: row.get(3)?,
        relation: row.get(4)?,
        weight: row.get(5)?,
        valid_from: parse(6, &valid_from_str)?,
        valid_to: valid_to_str.as_deref().map(|s| parse(7, s)).transpose()?,
    })
}
