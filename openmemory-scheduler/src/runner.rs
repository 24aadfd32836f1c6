//! The scheduler runner (spec.md §4.I): fans the five periodic jobs out
//! across every known tenant, each guarded by a per-tenant, per-job
//! advisory lock (`crate::lock`). Failures are logged and swallowed —
//! the job simply retries next cycle (spec.md §4.I "Failure policy").

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use tracing::warn;

use openmemory_core::config::OpenMemoryConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::DegradationEvent;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{ClassifierModelStore, MetadataStore, TemporalStore};

use crate::jobs;
use crate::lock::{JobKind, JobLocks};

/// Everything a tenant-fan-out job needs from the backing store. Blanket-
/// implemented for any type satisfying all three subsystem traits (e.g.
/// `openmemory_storage::engine::SqliteStore`), so the scheduler depends
/// on behavior, not a concrete storage crate.
pub trait SchedulerStore: MetadataStore + TemporalStore + ClassifierModelStore {}
impl<T: MetadataStore + TemporalStore + ClassifierModelStore> SchedulerStore for T {}

pub struct Scheduler<S: SchedulerStore> {
    store: Arc<S>,
    config: OpenMemoryConfig,
    locks: JobLocks,
    last_run: DashMap<(String, JobKind), chrono::DateTime<Utc>>,
    memory_count_at_last_summary: DashMap<String, u64>,
}

impl<S: SchedulerStore> Scheduler<S> {
    pub fn new(store: Arc<S>, config: OpenMemoryConfig) -> Self {
        Self {
            store,
            config,
            locks: JobLocks::new(),
            last_run: DashMap::new(),
            memory_count_at_last_summary: DashMap::new(),
        }
    }

    fn due(&self, tenant: &str, job: JobKind, interval_secs: u64) -> bool {
        match self.last_run.get(&(tenant.to_string(), job)) {
            None => true,
            Some(t) => Utc::now() - *t >= ChronoDuration::seconds(interval_secs as i64),
        }
    }

    fn mark_ran(&self, tenant: &str, job: JobKind) {
        self.last_run.insert((tenant.to_string(), job), Utc::now());
    }

    /// Run every job that is due, for every known tenant, exactly once.
    /// Call this from an outer `tokio::time::interval` loop; the interval
    /// itself is the suspension point (spec.md §5).
    pub async fn run_due_jobs(&self) -> OpenMemoryResult<Vec<DegradationEvent>> {
        let tenant_ids = self.store.list_tenant_ids()?;
        let mut events = Vec::new();
        for tenant in tenant_ids {
            events.extend(self.run_tenant(&tenant));
        }
        Ok(events)
    }

    fn run_tenant(&self, tenant: &str) -> Vec<DegradationEvent> {
        let user_id = TenantId::user(tenant);
        let mut events = Vec::new();

        if self.due(tenant, JobKind::Decay, self.config.scheduler.decay_interval_secs) {
            self.guarded(tenant, JobKind::Decay, &mut events, || {
                jobs::decay::run(self.store.as_ref(), &user_id, &self.config.decay).map(|_| ())
            });
        }

        if self.due(tenant, JobKind::Consolidate, self.config.scheduler.consolidate_interval_secs) {
            self.guarded(tenant, JobKind::Consolidate, &mut events, || {
                jobs::consolidate::run(self.store.as_ref(), &user_id, &self.config.consolidation).map(|_| ())
            });
        }

        if self.should_run_user_summary(tenant, &user_id) {
            self.guarded(tenant, JobKind::UserSummary, &mut events, || {
                jobs::user_summary::run(self.store.as_ref(), &user_id)
            });
            if let Ok(count) = self.store.count_for_tenant(&user_id) {
                self.memory_count_at_last_summary.insert(tenant.to_string(), count);
            }
        }

        if self.due(
            tenant,
            JobKind::ClassifierRetrain,
            self.config.scheduler.classifier_retrain_interval_secs,
        ) {
            self.guarded(tenant, JobKind::ClassifierRetrain, &mut events, || {
                jobs::classifier_retrain::run(self.store.as_ref(), &user_id, &self.config.classifier).map(|_| ())
            });
        }

        if self.due(
            tenant,
            JobKind::TemporalDecay,
            self.config.scheduler.temporal_decay_interval_secs,
        ) {
            self.guarded(tenant, JobKind::TemporalDecay, &mut events, || {
                jobs::temporal_decay::run(self.store.as_ref(), &user_id, &self.config.temporal).map(|_| ())
            });
        }

        events
    }

    /// `user_summary` runs on its usual cadence, or early once
    /// `user_summary_memory_threshold` new memories have accumulated
    /// since the last run (spec.md §4.I).
    fn should_run_user_summary(&self, tenant: &str, user_id: &TenantId) -> bool {
        if self.due(tenant, JobKind::UserSummary, self.config.scheduler.user_summary_interval_secs) {
            return true;
        }
        let baseline = self.memory_count_at_last_summary.get(tenant).map(|v| *v).unwrap_or(0);
        match self.store.count_for_tenant(user_id) {
            Ok(current) => current.saturating_sub(baseline) >= self.config.scheduler.user_summary_memory_threshold,
            Err(_) => false,
        }
    }

    fn guarded(
        &self,
        tenant: &str,
        job: JobKind,
        events: &mut Vec<DegradationEvent>,
        run: impl FnOnce() -> OpenMemoryResult<()>,
    ) {
        let Some(_guard) = self.locks.try_acquire(tenant, job) else {
            return;
        };
        if let Err(e) = run() {
            warn!(tenant, job = ?job, error = %e, "scheduler job failed, will retry next cycle");
            events.push(DegradationEvent {
                component: format!("{job:?}"),
                failure: e.to_string(),
                fallback_used: "retry next cycle".to_string(),
                timestamp: Utc::now(),
            });
            // Do not mark_ran on failure: retry sooner, not on full cadence.
            return;
        }
        self.mark_ran(tenant, job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_core::models::{Memory, User};
    use openmemory_core::sector::Sector;
    use openmemory_storage::engine::SqliteStore;
    use std::collections::{BTreeMap, BTreeSet};

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open_in_memory(&StorageConfig::default()).unwrap())
    }

    fn memory(id: &str, user_id: &TenantId) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.to_string(),
            user_id: user_id.clone(),
            content: "hello world".to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience: 0.5,
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

    #[tokio::test]
    async fn runs_due_jobs_for_every_known_tenant() {
        let s = store();
        let user = TenantId::user("u1");
        s.insert_memory(&memory("a", &user)).unwrap();
        s.upsert_user(&User::new("u1", Utc::now())).unwrap();

        let scheduler = Scheduler::new(s.clone(), OpenMemoryConfig::default());
        let events = scheduler.run_due_jobs().await.unwrap();
        assert!(events.is_empty());

        let record = s.get_user("u1").unwrap().unwrap();
        assert_eq!(record.reflection_count, 1);
    }

    #[tokio::test]
    async fn second_immediate_run_does_not_rerun_jobs_within_cadence() {
        let s = store();
        let user = TenantId::user("u1");
        s.insert_memory(&memory("a", &user)).unwrap();
        s.upsert_user(&User::new("u1", Utc::now())).unwrap();

        let scheduler = Scheduler::new(s.clone(), OpenMemoryConfig::default());
        scheduler.run_due_jobs().await.unwrap();
        scheduler.run_due_jobs().await.unwrap();

        // user_summary only ran once, so reflection_count is still 1.
        let record = s.get_user("u1").unwrap().unwrap();
        assert_eq!(record.reflection_count, 1);
    }
}
