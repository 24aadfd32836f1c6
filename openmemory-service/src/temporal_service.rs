//! Temporal service facade (spec.md §4.H, §4.J): wraps
//! `openmemory_temporal`'s free functions with the same Tenant Guard
//! enforcement `MemoryService` applies to memory operations, so every
//! `temporal.*` external entry point resolves its own tenant rather than
//! trusting a caller-supplied `TenantId` directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use openmemory_core::config::OpenMemoryConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::{FactQuery, TemporalFact, TimelineEvent};
use openmemory_core::traits::TemporalStore;
use openmemory_temporal::CompareResult;

use crate::tenant_guard;

/// `temporal.*` entry points (spec.md §4.H), tenant-scoped via the same
/// guard `MemoryService` uses.
pub struct TemporalService<T>
where
    T: TemporalStore + Send + Sync + 'static,
{
    store: Arc<T>,
    config: OpenMemoryConfig,
}

impl<T> TemporalService<T>
where
    T: TemporalStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<T>, config: OpenMemoryConfig) -> Self {
        Self { store, config }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_fact(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
        confidence: f64,
        metadata: serde_json::Value,
        user_id: Option<&str>,
    ) -> OpenMemoryResult<String> {
        let tenant = tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, "temporal.insert_fact")?;
        openmemory_temporal::insert_fact(
            self.store.as_ref(),
            subject,
            predicate,
            object,
            valid_from,
            valid_to,
            confidence,
            metadata,
            &tenant,
        )
    }

    pub async fn invalidate_fact(&self, id: &str, valid_to: DateTime<Utc>, user_id: Option<&str>) -> OpenMemoryResult<()> {
        let tenant = tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, "temporal.invalidate_fact")?;
        openmemory_temporal::invalidate_fact(self.store.as_ref(), id, valid_to, &tenant)
    }

    pub async fn get_facts(&self, mut query: FactQuery, user_id: Option<&str>) -> OpenMemoryResult<Vec<TemporalFact>> {
        let tenant = tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, "temporal.get_facts")?;
        // spec.md §4.H: omitting `at` means "right now," not "entire history."
        // `query_facts` itself treats `None` as no time filter, so the default
        // lives here at the public surface.
        query.valid_at = Some(query.valid_at.unwrap_or_else(Utc::now));
        self.store.query_facts(&tenant, &query)
    }

    pub async fn get_subject_timeline(
        &self,
        subject: &str,
        predicate: Option<&str>,
        user_id: Option<&str>,
    ) -> OpenMemoryResult<Vec<TimelineEvent>> {
        let tenant = tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, "temporal.get_subject_timeline")?;
        openmemory_temporal::get_subject_timeline(self.store.as_ref(), &tenant, subject, predicate)
    }

    pub async fn compare(
        &self,
        subject: &str,
        t1: DateTime<Utc>,
        t2: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> OpenMemoryResult<CompareResult> {
        let tenant = tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, "temporal.compare")?;
        openmemory_temporal::compare(self.store.as_ref(), &tenant, subject, t1, t2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_core::errors::OpenMemoryError;
    use openmemory_storage::engine::SqliteStore;

    fn service() -> TemporalService<SqliteStore> {
        let store = Arc::new(SqliteStore::open_in_memory(&StorageConfig::default()).unwrap());
        TemporalService::new(store, OpenMemoryConfig::default())
    }

    #[tokio::test]
    async fn insert_then_query_round_trips() {
        let svc = service();
        svc.insert_fact("OpenAI", "has_CEO", "Sam Altman", None, None, 1.0, serde_json::Value::Null, Some("u1"))
            .await
            .unwrap();

        let facts = svc
            .get_facts(
                FactQuery {
                    subject: Some("OpenAI".to_string()),
                    ..Default::default()
                },
                Some("u1"),
            )
            .await
            .unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].object, "Sam Altman");
    }

    #[tokio::test]
    async fn missing_user_id_rejected_in_strict_mode() {
        let svc = service();
        let err = svc
            .get_facts(FactQuery::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OpenMemoryError::TenantScopeMissing { .. }));
    }

    #[tokio::test]
    async fn timeline_reports_created_event() {
        let svc = service();
        svc.insert_fact("A", "p", "v", None, None, 1.0, serde_json::Value::Null, Some("u1"))
            .await
            .unwrap();
        let timeline = svc.get_subject_timeline("A", None, Some("u1")).await.unwrap();
        assert_eq!(timeline.len(), 1);
    }

    #[tokio::test]
    async fn get_facts_without_at_defaults_to_now_not_entire_history() {
        let svc = service();
        let t0 = chrono::Utc::now() - chrono::Duration::days(60);
        let t1 = t0 + chrono::Duration::days(30);

        svc.insert_fact("OpenAI", "has_CEO", "Someone Old", Some(t0), Some(t1), 1.0, serde_json::Value::Null, Some("u1"))
            .await
            .unwrap();
        svc.insert_fact("OpenAI", "has_CEO", "Sam Altman", Some(t1), None, 1.0, serde_json::Value::Null, Some("u1"))
            .await
            .unwrap();

        let facts = svc
            .get_facts(
                FactQuery {
                    subject: Some("OpenAI".to_string()),
                    ..Default::default()
                },
                Some("u1"),
            )
            .await
            .unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].object, "Sam Altman");
    }
}
