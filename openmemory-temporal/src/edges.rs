//! Temporal edges between facts (spec.md §4.H invariant: "edges follow the
//! same [overlap-invalidation] rule over `(source_fact_id, target_fact_id,
//! relation)`"). Mirrors `facts::insert_fact`'s overlap handling.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};
use openmemory_core::models::TemporalEdge;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;

pub fn insert_edge(
    store: &dyn TemporalStore,
    source_fact_id: &str,
    target_fact_id: &str,
    relation: &str,
    weight: f64,
    valid_from: Option<DateTime<Utc>>,
    user_id: &TenantId,
) -> OpenMemoryResult<String> {
    let now = Utc::now();
    let mut new_valid_from = valid_from.unwrap_or(now);

    if let Some(mut existing) = store.get_open_edge(user_id, source_fact_id, target_fact_id, relation)? {
        if existing.valid_from == new_valid_from {
            existing.valid_to = Some(new_valid_from - Duration::milliseconds(1));
            store.update_edge(&existing)?;
            new_valid_from += Duration::milliseconds(1);
        } else if existing.valid_from < new_valid_from {
            existing.valid_to = Some(new_valid_from - Duration::milliseconds(1));
            store.update_edge(&existing)?;
        }
    }

    let edge = TemporalEdge {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        source_fact_id: source_fact_id.to_string(),
        target_fact_id: target_fact_id.to_string(),
        relation: relation.to_string(),
        weight: weight.clamp(0.0, 1.0),
        valid_from: new_valid_from,
        valid_to: None,
    };
    store.insert_edge(&edge)?;
    Ok(edge.id)
}

/// Close an open edge at `valid_to`.
pub fn invalidate_edge(
    store: &dyn TemporalStore,
    mut edge: TemporalEdge,
    valid_to: DateTime<Utc>,
) -> OpenMemoryResult<()> {
    if valid_to < edge.valid_from {
        return Err(OpenMemoryError::invalid_input(
            "invalidate_edge: valid_to precedes valid_from",
        ));
    }
    edge.valid_to = Some(valid_to);
    store.update_edge(&edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use openmemory_core::config::StorageConfig;
    use openmemory_storage::engine::SqliteStore;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn superseding_edge_closes_the_older_open_one() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_edge(&s, "f1", "f2", "causes", 0.8, Some(t0), &user).unwrap();
        let t1 = t0 + ChronoDuration::days(1);
        insert_edge(&s, "f1", "f2", "causes", 0.9, Some(t1), &user).unwrap();

        let open = s.get_open_edge(&user, "f1", "f2", "causes").unwrap();
        assert!(open.is_some());
        assert_eq!(open.unwrap().weight, 0.9);
    }

    #[test]
    fn weight_is_clamped() {
        let s = store();
        let user = TenantId::user("u1");
        insert_edge(&s, "f1", "f2", "causes", 5.0, None, &user).unwrap();
        let open = s.get_open_edge(&user, "f1", "f2", "causes").unwrap().unwrap();
        assert_eq!(open.weight, 1.0);
    }
}
