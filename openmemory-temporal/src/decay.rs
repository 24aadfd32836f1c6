//! Confidence decay (spec.md §4.H `confidence_decay`, §4.I
//! `temporal_decay`): facts older than a horizon lose confidence by an
//! exponential factor, never below a configured floor.

use chrono::{Duration, Utc};

use openmemory_core::config::TemporalConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;

/// Apply `confidence_decay_per_day` compounding decay to every fact older
/// than `decay_horizon_days`, clamped to `min_confidence`, and persist the
/// batch in one call (spec.md §4.H, §4.I).
pub fn confidence_decay(
    store: &dyn TemporalStore,
    user_id: &TenantId,
    config: &TemporalConfig,
) -> OpenMemoryResult<usize> {
    let now = Utc::now();
    let horizon = now - Duration::days(config.decay_horizon_days);
    let facts = store.list_facts_older_than(user_id, horizon)?;

    let updates: Vec<(String, f64)> = facts
        .iter()
        .map(|fact| {
            let age_days = (now - fact.valid_from).num_milliseconds() as f64 / 86_400_000.0;
            let overdue_days = (age_days - config.decay_horizon_days as f64).max(0.0);
            let decayed = fact.confidence * (1.0 - config.confidence_decay_per_day).powf(overdue_days);
            (fact.id.clone(), decayed.max(config.min_confidence))
        })
        .collect();

    let count = updates.len();
    store.update_confidence_batch(&updates, user_id)?;
    Ok(count)
}
