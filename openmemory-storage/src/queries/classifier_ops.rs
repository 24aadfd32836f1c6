//! Per-tenant learned sector-classifier weights (spec.md §4.D) and the
//! unlabeled-since-training counter the Maintenance Scheduler's
//! `classifier_retrain` job consults.

use rusqlite::{params, Connection, OptionalExtension};

use openmemory_core::tenant::TenantId;
use openmemory_core::traits::SectorWeights;
use openmemory_core::OpenMemoryResult;

use crate::codec::tenant_column;
use crate::to_storage_err;

pub fn get_weights(
    conn: &Connection,
    user_id: &TenantId,
) -> OpenMemoryResult<Option<SectorWeights>> {
    conn.query_row(
        "SELECT weights_json, bias_json, trained_on_labels
         FROM classifier_weights WHERE user_id = ?1",
        params![tenant_column(user_id)],
        |row| {
            let weights_json: String = row.get(0)?;
            let bias_json: String = row.get(1)?;
            let trained_on_labels: i64 = row.get(2)?;
            Ok((weights_json, bias_json, trained_on_labels))
        },
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))?
    .map(|(weights_json, bias_json, trained_on_labels)| {
        Ok(SectorWeights {
            weights: serde_json::from_str(&weights_json)
                .map_err(|e| to_storage_err(format!("parse classifier weights: {e}")))?,
            bias: serde_json::from_str(&bias_json)
                .map_err(|e| to_storage_err(format!("parse classifier bias: {e}")))?,
            trained_on_labels: trained_on_labels as u64,
        })
    })
    .transpose()
}

pub fn save_weights(
    conn: &Connection,
    user_id: &TenantId,
    weights: &SectorWeights,
) -> OpenMemoryResult<()> {
    let weights_json =
        serde_json::to_string(&weights.weights).map_err(|e| to_storage_err(e.to_string()))?;
    let bias_json =
        serde_json::to_string(&weights.bias).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        "INSERT INTO classifier_weights (user_id, weights_json, bias_json, trained_on_labels, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            weights_json = excluded.weights_json,
            bias_json = excluded.bias_json,
            trained_on_labels = excluded.trained_on_labels,
            updated_at = excluded.updated_at",
        params![
            tenant_column(user_id),
            weights_json,
            bias_json,
            weights.trained_on_labels as i64,
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    // Retraining resets the counter of memories added since last training.
    conn.execute(
        "INSERT INTO classifier_label_counters (user_id, unlabeled_since_training)
         VALUES (?1, 0)
         ON CONFLICT(user_id) DO UPDATE SET unlabeled_since_training = 0",
        params![tenant_column(user_id)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn count_unlabeled_since_training(
    conn: &Connection,
    user_id: &TenantId,
) -> OpenMemoryResult<u64> {
    let count: i64 = conn
        .query_row(
            "SELECT unlabeled_since_training FROM classifier_label_counters WHERE user_id = ?1",
            params![tenant_column(user_id)],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .unwrap_or(0);
    Ok(count as u64)
}

/// Bump the unlabeled-since-training counter; called once per `add` from
/// `openmemory-service` so the scheduler's `classifier_retrain` job (spec.md
/// §4.D, §4.I) knows when `retrain_min_new_labels` memories have accumulated.
pub fn increment_unlabeled_counter(conn: &Connection, user_id: &TenantId) -> OpenMemoryResult<()> {
    conn.execute(
        "INSERT INTO classifier_label_counters (user_id, unlabeled_since_training)
         VALUES (?1, 1)
         ON CONFLICT(user_id) DO UPDATE SET
            unlabeled_since_training = unlabeled_since_training + 1",
        params![tenant_column(user_id)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
