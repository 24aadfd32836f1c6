//! Observability model (SPEC_FULL.md §2): polls each subsystem the
//! `MemoryService` composes and aggregates the result into a single
//! `HealthReport`. Grounded on the sibling system's
//! observability poll-and-aggregate shape, collapsed to
//! the subsystems this workspace actually has: storage, embedder, and
//! classifier. The vector store exposes no connectivity signal of its
//! own (spec.md §4.B names no health surface), so it is reported healthy
//! whenever storage is reachable.

use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::{HealthMetrics, HealthReport, HealthStatus, SubsystemHealth};
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{Embedder, MetadataStore};

/// Poll `store` and `embedder` for tenant `user_id` and assemble a
/// `HealthReport`. `user_id` is typically the system tenant for a
/// whole-deployment check, or a specific tenant for per-tenant metrics.
pub fn check<S, E>(store: &S, embedder: &E, user_id: &TenantId) -> OpenMemoryResult<HealthReport>
where
    S: MetadataStore + ?Sized,
    E: Embedder + ?Sized,
{
    let mut subsystems = Vec::new();

    let storage_status = match store.count_for_tenant(user_id) {
        Ok(_) => SubsystemHealth {
            name: "storage".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => SubsystemHealth {
            name: "storage".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
        },
    };
    let storage_ok = storage_status.status == HealthStatus::Healthy;
    subsystems.push(storage_status);

    subsystems.push(SubsystemHealth {
        name: "vector_store".to_string(),
        status: if storage_ok {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        message: None,
    });

    subsystems.push(SubsystemHealth {
        name: "embedder".to_string(),
        status: if embedder.is_available() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        message: if embedder.is_available() {
            None
        } else {
            Some(format!("provider {} unavailable, synthetic fallback active", embedder.name()))
        },
    });

    let overall_status = subsystems
        .iter()
        .map(|s| s.status)
        .max_by_key(|s| match s {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        })
        .unwrap_or(HealthStatus::Healthy);

    let metrics = if storage_ok {
        let total = store.count_for_tenant(user_id)?;
        let avg_salience = store.average_salience(user_id)?;
        HealthMetrics {
            total_memories: total,
            active_memories: total,
            archived_memories: 0,
            average_salience: avg_salience,
            db_size_bytes: 0,
        }
    } else {
        HealthMetrics {
            total_memories: 0,
            active_memories: 0,
            archived_memories: 0,
            average_salience: 0.0,
            db_size_bytes: 0,
        }
    };

    Ok(HealthReport {
        overall_status,
        subsystems,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_embeddings::SyntheticEmbedder;
    use openmemory_storage::engine::SqliteStore;

    #[test]
    fn healthy_store_and_embedder_yield_overall_healthy() {
        let store = SqliteStore::open_in_memory(&StorageConfig::default()).unwrap();
        let embedder = SyntheticEmbedder::new(32);
        let report = check(&store, &embedder, &TenantId::SYSTEM).unwrap();
        assert_eq!(report.overall_status, HealthStatus::Healthy);
        assert_eq!(report.subsystems.len(), 3);
    }
}
