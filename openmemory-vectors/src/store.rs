//! `InMemoryVectorStore`: the reference Vector Store implementation
//! (spec.md §4.B) — exhaustive SIMD cosine scan per `(user_id, sector)`
//! bucket. Concurrency matches spec.md §5: "multiple `search_similar`
//! calls may run in parallel; writers serialize per `(user_id, sector)`",
//! modeled on the sibling system's session manager's `DashMap`
//! usage but with an explicit per-bucket `RwLock` so a writer excludes
//! only readers of the *same* bucket, never other tenants or sectors.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rayon::prelude::*;

use openmemory_core::sector::Sector;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{MetadataFilter, VectorMatch, VectorStore};
use openmemory_core::OpenMemoryResult;

use crate::simd::cosine_similarity;

#[derive(Debug, Clone)]
struct Entry {
    memory_id: String,
    vector: Vec<f32>,
    metadata: Option<MetadataFilter>,
}

type Bucket = Arc<RwLock<Vec<Entry>>>;
type BucketKey = (String, Sector);

/// Below this row count per bucket, the sequential scan is cheaper than
/// paying rayon's task-spawn overhead.
const PARALLEL_SCAN_THRESHOLD: usize = 4_096;

pub struct InMemoryVectorStore {
    buckets: DashMap<BucketKey, Bucket>,
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    fn key(user_id: &TenantId, sector: Sector) -> BucketKey {
        (user_id.as_str().unwrap_or("__system__").to_string(), sector)
    }

    fn bucket(&self, user_id: &TenantId, sector: Sector) -> Bucket {
        self.buckets
            .entry(Self::key(user_id, sector))
            .or_insert_with(|| Arc::new(RwLock::new(Vec::new())))
            .clone()
    }

    fn metadata_matches(filter: &MetadataFilter, entry_metadata: &Option<MetadataFilter>) -> bool {
        match entry_metadata {
            Some(meta) => filter.iter().all(|(k, v)| meta.get(k) == Some(v)),
            None => filter.is_empty(),
        }
    }

    /// Row count across every sector bucket for `user_id`, for diagnostics
    /// and the observability model's vector-store health check.
    pub fn row_count_for_tenant(&self, user_id: &TenantId) -> usize {
        Sector::ALL
            .iter()
            .map(|&sector| self.bucket(user_id, sector).read().len())
            .sum()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn store_vector(
        &self,
        user_id: &TenantId,
        sector: Sector,
        memory_id: &str,
        vector: &[f32],
    ) -> OpenMemoryResult<()> {
        let bucket = self.bucket(user_id, sector);
        let mut guard = bucket.write();
        match guard.iter_mut().find(|e| e.memory_id == memory_id) {
            Some(existing) => existing.vector = vector.to_vec(),
            None => guard.push(Entry {
                memory_id: memory_id.to_string(),
                vector: vector.to_vec(),
                metadata: None,
            }),
        }
        Ok(())
    }

    fn store_vectors(
        &self,
        user_id: &TenantId,
        sector: Sector,
        vectors: &[(String, Vec<f32>)],
    ) -> OpenMemoryResult<()> {
        let bucket = self.bucket(user_id, sector);
        let mut guard = bucket.write();
        for (memory_id, vector) in vectors {
            match guard.iter_mut().find(|e| &e.memory_id == memory_id) {
                Some(existing) => existing.vector = vector.clone(),
                None => guard.push(Entry {
                    memory_id: memory_id.clone(),
                    vector: vector.clone(),
                    metadata: None,
                }),
            }
        }
        Ok(())
    }

    fn search_similar(
        &self,
        user_id: &TenantId,
        sector: Sector,
        query_vec: &[f32],
        top_k: usize,
        metadata_filter: Option<&MetadataFilter>,
    ) -> OpenMemoryResult<Vec<VectorMatch>> {
        let bucket = self.bucket(user_id, sector);
        let guard = bucket.read();

        let score = |entry: &Entry| -> Option<VectorMatch> {
            if let Some(filter) = metadata_filter {
                if !Self::metadata_matches(filter, &entry.metadata) {
                    return None;
                }
            }
            Some(VectorMatch {
                memory_id: entry.memory_id.clone(),
                score: cosine_similarity(query_vec, &entry.vector),
            })
        };

        let mut scored: Vec<VectorMatch> = if guard.len() >= PARALLEL_SCAN_THRESHOLD {
            guard.par_iter().filter_map(score).collect()
        } else {
            guard.iter().filter_map(score).collect()
        };
        drop(guard);

        // Stable sort: descending score, ties broken by `memory_id` ascending
        // (spec.md §4.B contract).
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.memory_id.cmp(&b.memory_id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    fn delete_vector(
        &self,
        user_id: &TenantId,
        sector: Sector,
        memory_id: &str,
    ) -> OpenMemoryResult<()> {
        let bucket = self.bucket(user_id, sector);
        bucket.write().retain(|e| e.memory_id != memory_id);
        Ok(())
    }

    fn delete_vectors(&self, user_id: &TenantId, memory_ids: &[String]) -> OpenMemoryResult<()> {
        let ids: std::collections::BTreeSet<&str> = memory_ids.iter().map(String::as_str).collect();
        for &sector in Sector::ALL.iter() {
            let bucket = self.bucket(user_id, sector);
            bucket.write().retain(|e| !ids.contains(e.memory_id.as_str()));
        }
        Ok(())
    }

    fn delete_vectors_by_user(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        for &sector in Sector::ALL.iter() {
            self.buckets.remove(&Self::key(user_id, sector));
        }
        Ok(())
    }

    fn get_vectors_by_id(
        &self,
        user_id: &TenantId,
        memory_id: &str,
    ) -> OpenMemoryResult<Vec<(Sector, Vec<f32>)>> {
        let mut out = Vec::new();
        for &sector in Sector::ALL.iter() {
            let bucket = self.bucket(user_id, sector);
            let guard = bucket.read();
            if let Some(entry) = guard.iter().find(|e| e.memory_id == memory_id) {
                out.push((sector, entry.vector.clone()));
            }
        }
        Ok(out)
    }
}

/// Hook for attaching a metadata map to a stored vector (spec.md §3
/// `SectorVector.metadata`); not exposed on the `VectorStore` trait since
/// spec.md §4.B's surface doesn't take metadata on `store_vector` itself,
/// but the reference implementation accepts it via this extension so
/// `search_similar`'s optional filter has something to match against.
impl InMemoryVectorStore {
    pub fn store_vector_with_metadata(
        &self,
        user_id: &TenantId,
        sector: Sector,
        memory_id: &str,
        vector: &[f32],
        metadata: BTreeMap<String, serde_json::Value>,
    ) {
        let bucket = self.bucket(user_id, sector);
        let mut guard = bucket.write();
        match guard.iter_mut().find(|e| e.memory_id == memory_id) {
            Some(existing) => {
                existing.vector = vector.to_vec();
                existing.metadata = Some(metadata);
            }
            None => guard.push(Entry {
                memory_id: memory_id.to_string(),
                vector: vector.to_vec(),
                metadata: Some(metadata),
            }),
        }
    }
}
