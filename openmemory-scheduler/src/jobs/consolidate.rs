//! `consolidate` job (spec.md §4.I, §4.G): plan merges for one tenant,
//! then apply them — repoint waypoints to the survivor, fold summed
//! feedback onto it, and delete the rest.

use std::collections::HashMap;

use tracing::info;

use openmemory_core::config::ConsolidationConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;
use openmemory_dynamics::consolidation::plan_merges;

/// Run one consolidation pass for `user_id`. Returns the number of
/// memories merged away (not counting survivors).
pub fn run(store: &dyn MetadataStore, user_id: &TenantId, config: &ConsolidationConfig) -> OpenMemoryResult<usize> {
    let memories = store.list_all_for_tenant(user_id)?;
    let original_feedback: HashMap<&str, f64> =
        memories.iter().map(|m| (m.id.as_str(), m.feedback_score)).collect();

    let decisions = plan_merges(&memories, config);
    if decisions.is_empty() {
        return Ok(0);
    }

    let mut merged_count = 0usize;
    let mut all_merged_ids = Vec::new();
    for decision in &decisions {
        for merged_id in &decision.merged_ids {
            store.repoint_waypoints(merged_id, &decision.survivor_id, user_id)?;
        }
        let survivor_original = original_feedback.get(decision.survivor_id.as_str()).copied().unwrap_or(0.0);
        let delta = decision.survivor_feedback_score - survivor_original;
        if delta.abs() > f64::EPSILON {
            store.update_feedback(&decision.survivor_id, user_id, delta)?;
        }
        merged_count += decision.merged_ids.len();
        all_merged_ids.extend(decision.merged_ids.iter().cloned());
    }

    store.delete_memories(&all_merged_ids, user_id)?;
    info!(
        user_id = %user_id,
        clusters = decisions.len(),
        merged = merged_count,
        "consolidation job merged near-duplicate memories"
    );
    Ok(merged_count)
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

    fn memory(id: &str, simhash: u64, mean_vec: Vec<f32>, salience: f64, feedback: f64) -> Memory {
        let now = chrono::Utc::now();
        Memory {
            id: id.to_string(),
            user_id: TenantId::user("u1"),
            content: "x".to_string(),
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
            simhash,
            mean_vec,
            compressed_vec: None,
            feedback_score: feedback,
            generated_summary: None,
        }
    }

    #[test]
    fn merges_duplicates_and_sums_feedback_onto_survivor() {
        let s = store();
        let user = TenantId::user("u1");
        let a = memory("a", 0b1010, vec![1.0, 0.0, 0.0, 0.0], 0.3, 1.0);
        let b = memory("b", 0b1011, vec![1.0, 0.0, 0.0, 0.0], 0.9, 2.0);
        s.insert_memory(&a).unwrap();
        s.insert_memory(&b).unwrap();

        let merged = run(&s, &user, &ConsolidationConfig::default()).unwrap();
        assert_eq!(merged, 1);

        assert!(s.get_memory("a", &user).unwrap().is_none());
        let survivor = s.get_memory("b", &user).unwrap().unwrap();
        assert_eq!(survivor.feedback_score, 3.0);
    }

    #[test]
    fn dissimilar_memories_are_left_alone() {
        let s = store();
        let user = TenantId::user("u1");
        let a = memory("a", 0, vec![1.0, 0.0], 0.5, 0.0);
        let b = memory("b", u64::MAX, vec![0.0, 1.0], 0.5, 0.0);
        s.insert_memory(&a).unwrap();
        s.insert_memory(&b).unwrap();

        assert_eq!(run(&s, &user, &ConsolidationConfig::default()).unwrap(), 0);
        assert!(s.get_memory("a", &user).unwrap().is_some());
        assert!(s.get_memory("b", &user).unwrap().is_some());
    }
}
