use chrono::{DateTime, Utc};

use crate::errors::OpenMemoryResult;
use crate::models::{Memory, User, Waypoint};
use crate::tenant::TenantId;

/// Opaque cursor for `list`'s `(created_at desc, id desc)` pagination
/// (spec.md §4.A, §4.E `list`, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

/// The Metadata Store (spec.md §4.A): durable, tenant-scoped CRUD over
/// memories, waypoints, users, and the classifier's learned model weights.
/// Implementations MUST enforce the tenant guard (spec.md §4.J) on every
/// method that takes a `user_id`.
pub trait MetadataStore: Send + Sync {
    // --- Memory CRUD ---
    fn insert_memory(&self, memory: &Memory) -> OpenMemoryResult<()>;
    /// Chunked into transactions of at most `MAX_BATCH_INSERT_SIZE` rows
    /// each (spec.md §4.A, §5).
    fn batch_insert_memories(&self, memories: &[Memory]) -> OpenMemoryResult<usize>;
    fn get_memory(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<Option<Memory>>;
    /// Hard cap of `MAX_IDS_PER_BULK_GET` ids per call (spec.md §4.A).
    fn get_memories_by_ids(
        &self,
        ids: &[String],
        user_id: &TenantId,
    ) -> OpenMemoryResult<Vec<Memory>>;
    fn update_memory(&self, memory: &Memory) -> OpenMemoryResult<()>;
    fn delete_memory(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<()>;
    /// Also removes dependent waypoints and vectors transactionally
    /// (spec.md §4.A).
    fn delete_memories(&self, ids: &[String], user_id: &TenantId) -> OpenMemoryResult<()>;

    // --- Batched updates (spec.md §4.A) ---
    fn update_salience_batch(
        &self,
        updates: &[(String, f64, DateTime<Utc>)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;
    fn update_mean_vec(
        &self,
        id: &str,
        user_id: &TenantId,
        mean_vec: &[f32],
    ) -> OpenMemoryResult<()>;
    fn update_summary_batch(
        &self,
        updates: &[(String, String)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;
    fn update_feedback(&self, id: &str, user_id: &TenantId, delta: f64) -> OpenMemoryResult<()>;

    // --- Query ---
    fn find_by_simhash(&self, user_id: &TenantId, simhash: u64) -> OpenMemoryResult<Vec<Memory>>;
    fn list_by_segment(&self, user_id: &TenantId, segment: i64) -> OpenMemoryResult<Vec<Memory>>;
    fn list_all_for_tenant(&self, user_id: &TenantId) -> OpenMemoryResult<Vec<Memory>>;
    /// Cursor-paginated scan ordered by `(created_at desc, id desc)`
    /// (spec.md §4.E `list`).
    fn list(
        &self,
        user_id: &TenantId,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> OpenMemoryResult<(Vec<Memory>, Option<Cursor>)>;
    /// `needle` is a raw, user-supplied substring; implementations must
    /// escape `%`, `_`, `|` and search with `ESCAPE '|'` (spec.md §4.A, §8 S8).
    fn search_content_like(
        &self,
        user_id: &TenantId,
        needle: &str,
        limit: usize,
    ) -> OpenMemoryResult<Vec<Memory>>;

    // --- Waypoints ---
    fn upsert_waypoint(&self, waypoint: &Waypoint) -> OpenMemoryResult<()>;
    fn get_waypoint(
        &self,
        src_id: &str,
        dst_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<Option<Waypoint>>;
    fn get_waypoints_from(&self, src_id: &str, user_id: &TenantId) -> OpenMemoryResult<Vec<Waypoint>>;
    fn delete_waypoints_for_memory(
        &self,
        memory_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;
    fn reinforce_waypoints(
        &self,
        pairs: &[(String, String)],
        delta: f64,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;
    fn repoint_waypoints(
        &self,
        from_memory_id: &str,
        to_memory_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()>;

    // --- Users ---
    fn get_user(&self, user_id: &str) -> OpenMemoryResult<Option<User>>;
    fn upsert_user(&self, user: &User) -> OpenMemoryResult<()>;
    /// All known tenant ids, for the Maintenance Scheduler's per-tenant
    /// job fan-out (spec.md §4.I). System scope is never included.
    fn list_tenant_ids(&self) -> OpenMemoryResult<Vec<String>>;

    // --- Tenant lifecycle ---
    /// Deletes, in order: waypoints, temporal edges, temporal facts,
    /// vectors (via the caller's `VectorStore`), memories, user record —
    /// all within one transaction that rolls back on failure (spec.md
    /// §4.A `cascade_delete_user`).
    fn cascade_delete_memories_and_waypoints(&self, user_id: &TenantId) -> OpenMemoryResult<()>;

    // --- Aggregation / maintenance ---
    fn count_for_tenant(&self, user_id: &TenantId) -> OpenMemoryResult<u64>;
    fn average_salience(&self, user_id: &TenantId) -> OpenMemoryResult<f64>;
    fn vacuum(&self) -> OpenMemoryResult<()>;
}
