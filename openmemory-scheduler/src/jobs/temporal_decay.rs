//! `temporal_decay` job (spec.md §4.H, §4.I): thin per-tenant wrapper
//! around `openmemory_temporal::confidence_decay`.

use tracing::info;

use openmemory_core::config::TemporalConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;
use openmemory_temporal::confidence_decay;

pub fn run(store: &dyn TemporalStore, user_id: &TenantId, config: &TemporalConfig) -> OpenMemoryResult<usize> {
    let updated = confidence_decay(store, user_id, config)?;
    info!(user_id = %user_id, updated, "temporal_decay job decayed fact confidence");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use openmemory_core::config::StorageConfig;
    use openmemory_storage::engine::SqliteStore;
    use openmemory_temporal::insert_fact;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn decays_overdue_fact_confidence() {
        let s = store();
        let user = TenantId::user("u1");
        let config = TemporalConfig {
            confidence_decay_per_day: 0.5,
            decay_horizon_days: 1,
            min_confidence: 0.1,
        };
        let old_from = Utc::now() - Duration::days(400);
        let id = insert_fact(&s, "A", "p", "v", Some(old_from), None, 1.0, serde_json::Value::Null, &user).unwrap();

        let updated = run(&s, &user, &config).unwrap();
        assert_eq!(updated, 1);
        let fact = s.get_fact(&id, &user).unwrap().unwrap();
        assert_eq!(fact.confidence, 0.1);
    }
}
