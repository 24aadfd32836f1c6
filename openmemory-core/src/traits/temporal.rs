use crate::errors::OpenMemoryResult;
use crate::models::{FactQuery, TemporalEdge, TemporalFact};
use crate::tenant::TenantId;

/// Durable storage for the Temporal Graph (spec.md §4.H): time-bound
/// facts and the edges between them. Implemented by the same backend as
/// `MetadataStore` (spec.md §6 persisted layout: `temporal_facts`,
/// `temporal_edges`), exposed as its own trait so the temporal reasoning
/// logic in `openmemory-temporal` depends only on this narrow surface.
pub trait TemporalStore: Send + Sync {
    fn insert_fact(&self, fact: &TemporalFact) -> OpenMemoryResult<()>;
    fn get_fact(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<Option<TemporalFact>>;
    fn update_fact(&self, fact: &TemporalFact) -> OpenMemoryResult<()>;
    /// The single open fact (if any) for `(user_id, subject, predicate)`.
    fn get_open_fact(
        &self,
        user_id: &TenantId,
        subject: &str,
        predicate: &str,
    ) -> OpenMemoryResult<Option<TemporalFact>>;
    fn query_facts(
        &self,
        user_id: &TenantId,
        query: &FactQuery,
    ) -> OpenMemoryResult<Vec<TemporalFact>>;
    fn list_facts_for_subject(
        &self,
        user_id: &TenantId,
        subject: &str,
        predicate: Option<&str>,
    ) -> OpenMemoryResult<Vec<TemporalFact>>;

    fn insert_edge(&self, edge: &TemporalEdge) -> OpenMemoryResult<()>;
    fn update_edge(&self, edge: &TemporalEdge) -> OpenMemoryResult<()>;
    fn get_open_edge(
        &self,
        user_id: &TenantId,
        source_fact_id: &str,
        target_fact_id: &str,
        relation: &str,
    ) -> OpenMemoryResult<Option<TemporalEdge>>;

    fn delete_facts_for_user(&self, user_id: &TenantId) -> OpenMemoryResult<()>;
    fn delete_edges_for_user(&self, user_id: &TenantId) -> OpenMemoryResult<()>;

    /// All facts for a tenant older than `horizon`, for `confidence_decay`
    /// (spec.md §4.H, §4.I `temporal_decay`).
    fn list_facts_older_than(
        &self,
        user_id: &TenantId,
        horizon: chrono::DateTime<chrono::Utc>,
    ) -> OpenMemoryResult<Vec<TemporalFact>>;
    fn update_confidence_batch(
        &self,
        updates: &[(String, f64)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;
}
