use crate::errors::OpenMemoryResult;
use crate::sector::Sector;
use crate::tenant::TenantId;

/// A single similarity search hit: memory id and cosine score in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub memory_id: String,
    pub score: f64,
}

/// Optional metadata filter applied during `search_similar` (spec.md §4.B).
/// Kept as a plain key/value equality predicate — more expressive
/// filtering happens after candidates are loaded from the Metadata Store.
pub type MetadataFilter = std::collections::BTreeMap<String, serde_json::Value>;

/// The Vector Store (spec.md §4.B): maps `(user_id, sector, memory_id) ->
/// vector[dim]`. Exhaustive-scan reference semantics; SIMD-accelerated
/// implementations must preserve the same ordering contract.
pub trait VectorStore: Send + Sync {
    fn store_vector(
        &self,
        user_id: &TenantId,
        sector: Sector,
        memory_id: &str,
        vector: &[f32],
    ) -> OpenMemoryResult<()>;

    fn store_vectors(
        &self,
        user_id: &TenantId,
        sector: Sector,
        vectors: &[(String, Vec<f32>)],
    ) -> OpenMemoryResult<()>;

    /// Results sorted by descending similarity, stable on ties by
    /// `memory_id` ascending (spec.md §4.B contract).
    fn search_similar(
        &self,
        user_id: &TenantId,
        sector: Sector,
        query_vec: &[f32],
        top_k: usize,
        metadata_filter: Option<&MetadataFilter>,
    ) -> OpenMemoryResult<Vec<VectorMatch>>;

    fn delete_vector(
        &self,
        user_id: &TenantId,
        sector: Sector,
        memory_id: &str,
    ) -> OpenMemoryResult<()>;

    fn delete_vectors(&self, user_id: &TenantId, memory_ids: &[String]) -> OpenMemoryResult<()>;

    fn delete_vectors_by_user(&self, user_id: &TenantId) -> OpenMemoryResult<()>;

    fn get_vectors_by_id(
        &self,
        user_id: &TenantId,
        memory_id: &str,
    ) -> OpenMemoryResult<Vec<(Sector, Vec<f32>)>>;
}
