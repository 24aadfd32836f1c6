//! `user_summary` job (spec.md §4.I, §4.G reflection): regenerate every
//! memory's `generated_summary` from its own content plus its one-hop
//! waypoint neighbors, then fold the top-N high-salience memories into
//! the tenant-level `User.summary`.

use std::collections::HashMap;

use tracing::info;

use openmemory_core::constants::WAYPOINT_EXPANSION_MIN_WEIGHT;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::User;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;
use openmemory_dynamics::reflection::{regenerate_memory_summary, regenerate_user_summary, DEFAULT_SUMMARY_TOP_N};

pub fn run(store: &dyn MetadataStore, tenant: &str, user_id: &TenantId) -> OpenMemoryResult<()> {
    let memories = store.list_all_for_tenant(user_id)?;
    if memories.is_empty() {
        return Ok(());
    }

    let content_by_id: HashMap<&str, &str> =
        memories.iter().map(|m| (m.id.as_str(), m.content.as_str())).collect();

    let mut summary_updates = Vec::with_capacity(memories.len());
    for memory in &memories {
        let neighbor_contents: Vec<&str> = store
            .get_waypoints_from(&memory.id, user_id)?
            .into_iter()
            .filter(|w| w.weight >= WAYPOINT_EXPANSION_MIN_WEIGHT)
            .filter_map(|w| content_by_id.get(w.dst_id.as_str()).copied())
            .collect();
        let summary = regenerate_memory_summary(memory, &neighbor_contents);
        summary_updates.push((memory.id.clone(), summary));
    }
    store.update_summary_batch(&summary_updates, user_id)?;

    let user_summary = regenerate_user_summary(&memories, DEFAULT_SUMMARY_TOP_N);
    let now = chrono::Utc::now();
    let mut user = store
        .get_user(tenant)?
        .unwrap_or_else(|| User::new(tenant, now));
    user.summary = Some(user_summary);
    user.reflection_count += 1;
    user.updated_at = now;
    store.upsert_user(&user)?;

    info!(user_id = %user_id, memories = memories.len(), "user_summary job regenerated summaries");
    Ok(())
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

    fn memory(id: &str, content: &str, salience: f64) -> Memory {
        let now = chrono::Utc::now();
        Memory {
            id: id.to_string(),
            user_id: TenantId::user("u1"),
            content: content.to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience,
            decay_lambda: 0.03,
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
    fn regenerates_user_summary_and_bumps_reflection_count() {
        let s = store();
        let user = TenantId::user("u1");
        s.insert_memory(&memory("a", "alpha content", 0.9)).unwrap();
        s.insert_memory(&memory("b", "beta content", 0.2)).unwrap();

        run(&s, "u1", &user).unwrap();
        let record = s.get_user("u1").unwrap().unwrap();
        assert_eq!(record.reflection_count, 1);
        assert_eq!(record.summary.as_deref(), Some("alpha content\nbeta content"));

        run(&s, "u1", &user).unwrap();
        assert_eq!(s.get_user("u1").unwrap().unwrap().reflection_count, 2);
    }

    #[test]
    fn memory_summary_folds_in_strong_neighbor() {
        let s = store();
        let user = TenantId::user("u1");
        s.insert_memory(&memory("a", "origin", 0.5)).unwrap();
        s.insert_memory(&memory("b", "neighbor", 0.5)).unwrap();
        s.upsert_waypoint(&openmemory_core::models::Waypoint {
            src_id: "a".into(),
            dst_id: "b".into(),
            user_id: user.clone(),
            weight: 0.9,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        })
        .unwrap();

        run(&s, "u1", &user).unwrap();
        let a = s.get_memory("a", &user).unwrap().unwrap();
        assert_eq!(a.generated_summary.as_deref(), Some("origin\nneighbor"));
    }

    #[test]
    fn empty_tenant_is_a_noop() {
        let s = store();
        let user = TenantId::user("empty");
        run(&s, "empty", &user).unwrap();
        assert!(s.get_user("empty").unwrap().is_none());
    }
}
