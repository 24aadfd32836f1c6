//! `decay` job (spec.md §4.I): apply dual-phase decay to every memory
//! whose `last_seen_at` is stale, batched per `MAX_BATCH_INSERT_SIZE`
//! rows (spec.md §5 backpressure note).

use chrono::{Duration, Utc};
use tracing::info;

use openmemory_core::config::DecayConfig;
use openmemory_core::constants::MAX_BATCH_INSERT_SIZE;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;
use openmemory_dynamics::decay::process_batch;

/// Memories are only decayed once they've gone quiet for this long
/// (spec.md §4.I: "memories whose `last_seen_at` is older than 24h").
const STALE_AFTER_HOURS: i64 = 24;

/// Recompute and persist live salience for one tenant's stale memories.
/// Returns the number of rows updated.
pub fn run(store: &dyn MetadataStore, user_id: &TenantId, config: &DecayConfig) -> OpenMemoryResult<usize> {
    let now = Utc::now();
    let cutoff = now - Duration::hours(STALE_AFTER_HOURS);
    let stale: Vec<_> = store
        .list_all_for_tenant(user_id)?
        .into_iter()
        .filter(|m| m.last_seen_at < cutoff)
        .collect();

    if stale.is_empty() {
        return Ok(0);
    }

    let mut updated = 0usize;
    for chunk in stale.chunks(MAX_BATCH_INSERT_SIZE) {
        let updates = process_batch(chunk, now, config);
        store.update_salience_batch(&updates, user_id)?;
        updated += updates.len();
    }
    info!(user_id = %user_id, updated, "decay job applied dual-phase decay");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_core::models::Memory;
    use openmemory_core::sector::Sector;
    use openmemory_storage::engine::SqliteStore;
    use std::collections::{BTreeMap, BTreeSet};

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    fn memory(id: &str, user_id: &TenantId, last_seen_at: chrono::DateTime<Utc>) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.to_string(),
            user_id: user_id.clone(),
            content: "x".to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now - Duration::days(30),
            updated_at: now,
            last_seen_at,
            salience: 0.8,
            decay_lambda: 0.05,
            version: 1,
            segment: 0,
            simhash: 0,
            mean_vec: vec![],
            compressed_vec: None,
            feedback_score: 0.0,
            generated_summary: None,
        }
    }

    #[test]
    fn only_stale_memories_are_decayed() {
        let s = store();
        let user = TenantId::user("u1");
        let now = Utc::now();
        let stale = memory("stale", &user, now - Duration::hours(48));
        let fresh = memory("fresh", &user, now);
        s.insert_memory(&stale).unwrap();
        s.insert_memory(&fresh).unwrap();

        let updated = run(&s, &user, &DecayConfig::default()).unwrap();
        assert_eq!(updated, 1);

        let fresh_after = s.get_memory("fresh", &user).unwrap().unwrap();
        assert_eq!(fresh_after.salience, 0.8);
    }

    #[test]
    fn no_stale_memories_is_a_noop() {
        let s = store();
        let user = TenantId::user("u1");
        let fresh = memory("fresh", &user, Utc::now());
        s.insert_memory(&fresh).unwrap();
        assert_eq!(run(&s, &user, &DecayConfig::default()).unwrap(), 0);
    }
}
