//! v001: memories, waypoints, users, temporal_facts, temporal_edges,
//! classifier_weights.

use rusqlite::Connection;

use openmemory_core::OpenMemoryResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> OpenMemoryResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id                 TEXT PRIMARY KEY,
            user_id            TEXT NOT NULL,
            content            TEXT NOT NULL,
            primary_sector     TEXT NOT NULL,
            auxiliary_sectors  TEXT NOT NULL DEFAULT '[]',
            tags               TEXT NOT NULL DEFAULT '[]',
            metadata           TEXT NOT NULL DEFAULT '{}',
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL,
            last_seen_at       TEXT NOT NULL,
            salience           REAL NOT NULL DEFAULT 0.5,
            decay_lambda       REAL NOT NULL,
            version            INTEGER NOT NULL DEFAULT 1,
            segment            INTEGER NOT NULL,
            simhash            INTEGER NOT NULL,
            mean_vec           BLOB NOT NULL,
            compressed_vec     BLOB,
            feedback_score     REAL NOT NULL DEFAULT 0.0,
            generated_summary  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_memories_user ON memories(user_id);
        CREATE INDEX IF NOT EXISTS idx_memories_user_created ON memories(user_id, created_at DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_memories_user_segment ON memories(user_id, segment);
        CREATE INDEX IF NOT EXISTS idx_memories_user_simhash ON memories(user_id, simhash);

        CREATE TABLE IF NOT EXISTS waypoints (
            src_id     TEXT NOT NULL,
            dst_id     TEXT NOT NULL,
            user_id    TEXT NOT NULL,
            weight     REAL NOT NULL DEFAULT 0.5,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (src_id, dst_id),
            FOREIGN KEY (src_id) REFERENCES memories(id) ON DELETE CASCADE,
            FOREIGN KEY (dst_id) REFERENCES memories(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_waypoints_user ON waypoints(user_id);
        CREATE INDEX IF NOT EXISTS idx_waypoints_dst ON waypoints(dst_id);

        CREATE TABLE IF NOT EXISTS users (
            user_id          TEXT PRIMARY KEY,
            summary          TEXT,
            reflection_count INTEGER NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS temporal_facts (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL,
            subject      TEXT NOT NULL,
            predicate    TEXT NOT NULL,
            object       TEXT NOT NULL,
            valid_from   TEXT NOT NULL,
            valid_to     TEXT,
            confidence   REAL NOT NULL DEFAULT 1.0,
            metadata     TEXT NOT NULL DEFAULT '{}',
            last_updated TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_facts_user_subject_pred
            ON temporal_facts(user_id, subject, predicate);
        CREATE INDEX IF NOT EXISTS idx_facts_open
            ON temporal_facts(user_id, subject, predicate, valid_to);

        CREATE TABLE IF NOT EXISTS temporal_edges (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL,
            source_fact_id  TEXT NOT NULL,
            target_fact_id  TEXT NOT NULL,
            relation        TEXT NOT NULL,
            weight          REAL NOT NULL DEFAULT 1.0,
            valid_from      TEXT NOT NULL,
            valid_to        TEXT,
            FOREIGN KEY (source_fact_id) REFERENCES temporal_facts(id) ON DELETE CASCADE,
            FOREIGN KEY (target_fact_id) REFERENCES temporal_facts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_edges_user ON temporal_edges(user_id);
        CREATE INDEX IF NOT EXISTS idx_edges_source_target_relation
            ON temporal_edges(source_fact_id, target_fact_id, relation);

        CREATE TABLE IF NOT EXISTS classifier_weights (
            user_id          TEXT PRIMARY KEY,
            weights_json     TEXT NOT NULL,
            bias_json        TEXT NOT NULL,
            trained_on_labels INTEGER NOT NULL DEFAULT 0,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS classifier_label_counters (
            user_id            TEXT PRIMARY KEY,
            unlabeled_since_training INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
