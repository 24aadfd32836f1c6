//! `MemoryService` (spec.md §4.E): the public core API. Orchestrates the
//! Sector Classifier, Embedder, Vector Store, Metadata Store, Waypoint
//! Graph, and Dynamics Engine behind `add`/`query`/`reinforce`/`update`/
//! `delete`/`list`, with the Tenant Guard (spec.md §4.J) enforced on
//! every entry point. Shape follows the sibling system's retrieval
//! engine: a struct holding shared
//! references to each subsystem plus one config, exposing a handful of
//! `pub async fn` pipeline methods that read top-to-bottom as the spec's
//! own numbered steps.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use openmemory_core::config::OpenMemoryConfig;
use openmemory_core::constants::{
    AUTO_LINK_INITIAL_WEIGHT, AUTO_LINK_SIMILARITY_THRESHOLD, MAX_IDS_PER_BULK_GET,
    WAYPOINT_EXPANSION_MIN_WEIGHT,
};
use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};
use openmemory_core::models::{
    HealthReport, Memory, MemoryFilters, QueryCandidate, ScoredMemory, User,
};
use openmemory_core::sector::Sector;
use openmemory_core::simhash::simhash64;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{ClassifierModelStore, Cursor, Embedder, MetadataStore, SectorClassifier, VectorStore};
use openmemory_dynamics::{composite_score, recency_score, salience_now};

use crate::{health, tenant_guard};

/// Options accepted by `add` (spec.md §4.E `add`).
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub tags: BTreeSet<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub force_sector: Option<Sector>,
    pub skip_dedupe: bool,
}

/// Whether `add` inserted a new memory or reinforced an existing
/// near-duplicate (spec.md §4.E `add`, §6 `dedupe: "inserted"|"reinforced"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupeDecision {
    Inserted,
    Reinforced,
}

impl DedupeDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Reinforced => "reinforced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResult {
    pub id: String,
    pub primary_sector: Sector,
    pub sectors: Vec<Sector>,
    pub dedupe: DedupeDecision,
}

/// Partial update accepted by `update` (spec.md §4.E `update`).
#[derive(Debug, Clone, Default)]
pub struct UpdatePartial {
    pub content: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResult {
    pub id: String,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReinforceResult {
    pub salience: f64,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// `query`'s response, including the telemetry block from spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub matches: Vec<ScoredMemory>,
    pub sectors_searched: Vec<Sector>,
    pub duration_ms: u64,
}

/// Bound satisfied by any backing store usable by `MemoryService`:
/// `MetadataStore` for CRUD, `ClassifierModelStore` so `add` can bump the
/// per-tenant unlabeled-since-training counter (spec.md §4.D). Blanket
/// implemented, matching `openmemory-scheduler::runner::SchedulerStore`.
pub trait ServiceStore: MetadataStore + ClassifierModelStore {}
impl<T: MetadataStore + ClassifierModelStore> ServiceStore for T {}

/// The public core API (spec.md §4.E), generic over the four subsystem
/// traits it orchestrates so callers can swap in test doubles or
/// alternative backends without this crate depending on any of their
/// concrete types.
pub struct MemoryService<S, V, E, C>
where
    S: ServiceStore + Send + Sync + 'static,
    V: VectorStore + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    C: SectorClassifier + Send + Sync + 'static,
{
    store: Arc<S>,
    vectors: Arc<V>,
    embedder: Arc<E>,
    classifier: Arc<C>,
    config: OpenMemoryConfig,
}

impl<S, V, E, C> MemoryService<S, V, E, C>
where
    S: ServiceStore + Send + Sync + 'static,
    V: VectorStore + Send + Sync + 'static,
    E: Embedder + Send + Sync + 'static,
    C: SectorClassifier + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, vectors: Arc<V>, embedder: Arc<E>, classifier: Arc<C>, config: OpenMemoryConfig) -> Self {
        Self {
            store,
            vectors,
            embedder,
            classifier,
            config,
        }
    }

    fn tenant(&self, user_id: Option<&str>, operation: &str) -> OpenMemoryResult<TenantId> {
        tenant_guard::resolve_request_tenant(user_id, self.config.tenant.strict_tenant, operation)
    }

    fn ensure_user_row(&self, tenant: &TenantId) -> OpenMemoryResult<()> {
        let Some(id) = tenant.as_str() else {
            return Ok(());
        };
        if self.store.get_user(id)?.is_none() {
            self.store.upsert_user(&User::new(id, Utc::now()))?;
        }
        Ok(())
    }

    /// spec.md §4.E `add`.
    pub async fn add(&self, content: &str, user_id: Option<&str>, options: AddOptions) -> OpenMemoryResult<AddResult> {
        if content.trim().is_empty() {
            return Err(OpenMemoryError::invalid_input("memory content must not be empty"));
        }
        let tenant = self.tenant(user_id, "memory.add")?;
        self.ensure_user_row(&tenant)?;

        let hints: Vec<Sector> = options.force_sector.into_iter().collect();
        let mut classification = self.classifier.classify(content, &tenant, &hints)?;
        if let Some(forced) = options.force_sector {
            classification.auxiliary.retain(|&s| s != forced);
            classification.primary = forced;
        }
        let sectors = classification.all_sectors();

        let simhash = simhash64(content);

        if !options.skip_dedupe {
            if let Some(existing) = self.store.find_by_simhash(&tenant, simhash)?.into_iter().next() {
                let now = Utc::now();
                let bumped = (existing.salience + self.config.decay.query_reinforcement_salience_factor).min(1.0);
                self.store
                    .update_salience_batch(&[(existing.id.clone(), bumped, now)], &tenant)?;
                debug!(user_id = %tenant, memory_id = %existing.id, "add: simhash match, reinforcing existing memory");
                return Ok(AddResult {
                    id: existing.id,
                    primary_sector: existing.primary_sector,
                    sectors: existing.all_sectors().into_iter().collect(),
                    dedupe: DedupeDecision::Reinforced,
                });
            }
        }

        let embed_result = self.embedder.embed(content, &sectors)?;
        if embed_result.fallback_used {
            warn!(user_id = %tenant, provider = %embed_result.provider, "add: embedder fell back to synthetic vectors");
        }

        // Top-1 similar existing memory in the primary sector, searched
        // *before* this memory's own vectors are stored so it can't match
        // itself (spec.md §4.E `add`).
        let primary_vec = &embed_result.vectors[&classification.primary];
        let top1 = self
            .vectors
            .search_similar(&tenant, classification.primary, primary_vec, 1, None)?
            .into_iter()
            .next();

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let mean_vec = centroid(&sectors, &embed_result.vectors);

        let memory = Memory {
            id: id.clone(),
            user_id: tenant.clone(),
            content: content.to_string(),
            primary_sector: classification.primary,
            auxiliary_sectors: classification.auxiliary.iter().copied().collect(),
            tags: options.tags,
            metadata: options.metadata,
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience: 0.5,
            decay_lambda: classification.primary.default_decay_lambda(),
            version: 1,
            segment: Memory::segment_for(now),
            simhash,
            mean_vec,
            compressed_vec: None,
            feedback_score: 0.0,
            generated_summary: None,
        };

        self.store.insert_memory(&memory)?;
        for &sector in &sectors {
            self.vectors.store_vector(&tenant, sector, &id, &embed_result.vectors[&sector])?;
        }
        self.store.record_new_label(&tenant)?;

        if let Some(top1) = top1 {
            if top1.score >= AUTO_LINK_SIMILARITY_THRESHOLD {
                openmemory_waypoints::link(self.store.as_ref(), &id, &top1.memory_id, AUTO_LINK_INITIAL_WEIGHT, &tenant)?;
            }
        }

        info!(user_id = %tenant, memory_id = %id, primary_sector = %classification.primary, "memory added");
        Ok(AddResult {
            id,
            primary_sector: classification.primary,
            sectors,
            dedupe: DedupeDecision::Inserted,
        })
    }

    /// spec.md §4.E `query`.
    pub async fn query(&self, text: &str, user_id: Option<&str>, k: usize, filters: MemoryFilters) -> OpenMemoryResult<QueryOutcome> {
        let started = Instant::now();
        let tenant = self.tenant(user_id, "memory.query")?;

        let classification = self.classifier.classify(text, &tenant, &[])?;
        let sectors = classification.all_sectors();
        let embed_result = self.embedder.embed(text, &sectors)?;

        let top_m = (k * self.config.vector.top_m_multiplier).max(self.config.vector.top_m_floor);

        let mut candidates: HashMap<String, QueryCandidate> = HashMap::new();
        for &sector in &sectors {
            let hits = self.vectors.search_similar(&tenant, sector, &embed_result.vectors[&sector], top_m, None)?;
            for hit in hits {
                candidates
                    .entry(hit.memory_id.clone())
                    .or_insert_with(|| QueryCandidate::new(hit.memory_id.clone()))
                    .merge_direct_hit(sector, hit.score);
            }
        }

        // Waypoint expansion from the current top-k by similarity
        // (spec.md §4.E step 5).
        let mut ranked_ids: Vec<&String> = candidates.keys().collect();
        ranked_ids.sort_by(|a, b| {
            let sa = candidates[*a].max_similarity;
            let sb = candidates[*b].max_similarity;
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.cmp(b))
        });
        let expansion_roots: Vec<String> = ranked_ids.into_iter().take(k).cloned().collect();

        let mut expansions: Vec<(String, String, f64)> = Vec::new();
        for root in &expansion_roots {
            let hop = openmemory_waypoints::neighbors(self.store.as_ref(), root, &tenant, WAYPOINT_EXPANSION_MIN_WEIGHT)?;
            for (neighbor_id, weight) in hop {
                expansions.push((root.clone(), neighbor_id, weight));
            }
        }
        for (_root, neighbor_id, weight) in expansions {
            let entry = candidates
                .entry(neighbor_id.clone())
                .or_insert_with(|| {
                    let mut c = QueryCandidate::new(neighbor_id.clone());
                    c.expanded = true;
                    c
                });
            if weight > entry.max_link_weight {
                entry.max_link_weight = weight;
            }
        }

        if candidates.is_empty() {
            return Ok(QueryOutcome {
                matches: Vec::new(),
                sectors_searched: sectors,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        let ids: Vec<String> = candidates.keys().cloned().collect();
        let now = Utc::now();
        let mut scored: Vec<ScoredMemory> = Vec::new();

        for chunk in ids.chunks(MAX_IDS_PER_BULK_GET) {
            let memories = self.store.get_memories_by_ids(chunk, &tenant)?;
            for memory in memories {
                if !passes_filters(&memory, &filters, now, &self.config) {
                    continue;
                }
                let Some(candidate) = candidates.get(&memory.id) else {
                    continue;
                };
                let sim = if candidate.max_similarity.is_finite() && candidate.max_similarity > f64::MIN {
                    candidate.max_similarity
                } else {
                    0.0
                };
                let salience = salience_now(&memory, now, &self.config.decay);
                let recency = recency_score(memory.last_seen_at, now, &self.config.decay);
                let score = composite_score(sim, salience, recency, candidate.max_link_weight, &self.config.decay);

                scored.push(ScoredMemory {
                    id: memory.id.clone(),
                    score,
                    sim,
                    salience,
                    primary_sector: memory.primary_sector,
                    matched_sectors: candidate.matched_sectors.iter().copied().collect(),
                    content: memory.content.clone(),
                    expanded: candidate.expanded,
                });
            }
        }

        scored.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(k);

        self.reinforce_query_results(&scored, &tenant, now);

        debug!(user_id = %tenant, matches = scored.len(), "query complete");
        Ok(QueryOutcome {
            matches: scored,
            sectors_searched: sectors,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Best-effort post-return reinforcement (spec.md §4.E `query`:
    /// "schedule an async `reinforce`"). Failures are logged and
    /// swallowed — this never turns a successful query into an error.
    fn reinforce_query_results(&self, matches: &[ScoredMemory], tenant: &TenantId, now: DateTime<Utc>) {
        if matches.is_empty() {
            return;
        }
        let factor = self.config.decay.query_reinforcement_salience_factor;
        let updates: Vec<(String, f64, DateTime<Utc>)> = matches
            .iter()
            .map(|m| (m.id.clone(), (m.salience + factor * m.sim).min(1.0), now))
            .collect();
        if let Err(e) = self.store.update_salience_batch(&updates, tenant) {
            warn!(user_id = %tenant, error = %e, "query reinforcement: salience bump failed");
        }

        let mut pairs = Vec::new();
        for i in 0..matches.len() {
            for j in (i + 1)..matches.len() {
                pairs.push((matches[i].id.clone(), matches[j].id.clone()));
            }
        }
        let delta = self.config.decay.query_reinforcement_link_delta;
        if let Err(e) = openmemory_waypoints::reinforce_pairs(self.store.as_ref(), &pairs, tenant, delta) {
            warn!(user_id = %tenant, error = %e, "query reinforcement: waypoint bump failed");
        }
    }

    /// spec.md §4.E `reinforce`.
    pub async fn reinforce(&self, id: &str, boost: f64, user_id: Option<&str>) -> OpenMemoryResult<ReinforceResult> {
        let tenant = self.tenant(user_id, "memory.reinforce")?;
        let memory = self
            .store
            .get_memory(id, &tenant)?
            .ok_or_else(|| OpenMemoryError::not_found("memory", id))?;
        let now = Utc::now();
        let salience = (memory.salience + boost).clamp(0.0, 1.0);
        self.store.update_salience_batch(&[(id.to_string(), salience, now)], &tenant)?;
        Ok(ReinforceResult {
            salience,
            last_seen_at: now,
        })
    }

    /// spec.md §4.E `update`.
    pub async fn update(&self, id: &str, partial: UpdatePartial, user_id: Option<&str>) -> OpenMemoryResult<UpdateResult> {
        let tenant = self.tenant(user_id, "memory.update")?;
        let mut memory = self
            .store
            .get_memory(id, &tenant)?
            .ok_or_else(|| OpenMemoryError::not_found("memory", id))?;

        let content_changed = partial.content.as_deref().is_some_and(|c| c != memory.content);

        if let Some(content) = partial.content {
            memory.content = content;
            memory.simhash = simhash64(&memory.content);
        }
        if let Some(tags) = partial.tags {
            memory.tags = tags;
        }
        if let Some(metadata) = partial.metadata {
            memory.metadata = metadata;
        }
        memory.version += 1;
        memory.updated_at = Utc::now();

        if content_changed {
            let sectors = memory.all_sectors().into_iter().collect::<Vec<_>>();
            let embed_result = self.embedder.embed(&memory.content, &sectors)?;
            for &sector in &sectors {
                self.vectors.store_vector(&tenant, sector, id, &embed_result.vectors[&sector])?;
            }
            memory.mean_vec = centroid(&sectors, &embed_result.vectors);
        }

        self.store.update_memory(&memory)?;
        Ok(UpdateResult {
            id: id.to_string(),
            version: memory.version,
        })
    }

    /// spec.md §4.E `delete`.
    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> OpenMemoryResult<DeleteResult> {
        let tenant = self.tenant(user_id, "memory.delete")?;
        if self.store.get_memory(id, &tenant)?.is_none() {
            return Ok(DeleteResult { deleted: false });
        }
        self.store.delete_waypoints_for_memory(id, &tenant)?;
        self.vectors.delete_vectors(&tenant, std::slice::from_ref(&id.to_string()))?;
        self.store.delete_memory(id, &tenant)?;
        Ok(DeleteResult { deleted: true })
    }

    /// spec.md §4.E `list`.
    pub async fn list(&self, user_id: Option<&str>, limit: usize, cursor: Option<Cursor>) -> OpenMemoryResult<(Vec<Memory>, Option<Cursor>)> {
        let tenant = self.tenant(user_id, "memory.list")?;
        self.store.list(&tenant, limit, cursor)
    }

    /// spec.md §4.A `cascade_delete_user`: deletes every metadata row this
    /// tenant owns and then asks the Vector Store to drop its vectors, so
    /// property 3 (all counts zero afterward) holds across both stores.
    /// `user_id` is mandatory here — there is no system tenant to cascade-delete.
    pub async fn cascade_delete_user(&self, user_id: &str) -> OpenMemoryResult<()> {
        let tenant = TenantId::user(user_id);
        self.store.cascade_delete_memories_and_waypoints(&tenant)?;
        self.vectors.delete_vectors_by_user(&tenant)?;
        Ok(())
    }

    /// Aggregate subsystem health, scoped to `user_id` (or system-wide
    /// when `None`), per SPEC_FULL.md §2.
    pub fn health(&self, user_id: Option<&str>) -> OpenMemoryResult<HealthReport> {
        let tenant = user_id.map(TenantId::user).unwrap_or(TenantId::SYSTEM);
        health::check(self.store.as_ref(), self.embedder.as_ref(), &tenant)
    }
}

/// Elementwise centroid of the requested sectors' vectors, in `sectors`
/// order (spec.md §3: `mean_vec` is "centroid of the per-sector vectors").
fn centroid(sectors: &[Sector], vectors: &BTreeMap<Sector, Vec<f32>>) -> Vec<f32> {
    let Some(dim) = sectors.first().and_then(|s| vectors.get(s)).map(|v| v.len()) else {
        return Vec::new();
    };
    let mut sum = vec![0.0f32; dim];
    for sector in sectors {
        if let Some(v) = vectors.get(sector) {
            for (acc, x) in sum.iter_mut().zip(v.iter()) {
                *acc += x;
            }
        }
    }
    let n = sectors.len().max(1) as f32;
    for x in sum.iter_mut() {
        *x /= n;
    }
    sum
}

fn passes_filters(memory: &Memory, filters: &MemoryFilters, now: DateTime<Utc>, config: &OpenMemoryConfig) -> bool {
    if let Some(sector) = filters.sector {
        if memory.primary_sector != sector {
            return false;
        }
    }
    if let Some(tags) = &filters.tags {
        if !tags.is_subset(&memory.tags) {
            return false;
        }
    }
    if let Some(metadata) = &filters.metadata {
        for (k, v) in metadata {
            if memory.metadata.get(k) != Some(v) {
                return false;
            }
        }
    }
    if let Some(min_salience) = filters.min_salience {
        if salience_now(memory, now, &config.decay) < min_salience {
            return false;
        }
    }
    if let Some(range) = filters.time_range {
        if !range.contains(memory.created_at) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_classifier::CompositeClassifier;
    use openmemory_core::config::{ClassifierConfig, StorageConfig};
    use openmemory_embeddings::SyntheticEmbedder;
    use openmemory_storage::engine::SqliteStore;
    use openmemory_vectors::store::InMemoryVectorStore;

    fn service() -> MemoryService<SqliteStore, InMemoryVectorStore, SyntheticEmbedder, CompositeClassifier<SqliteStore>> {
        let store = Arc::new(SqliteStore::open_in_memory(&StorageConfig::default()).unwrap());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let config = OpenMemoryConfig::default();
        let embedder = Arc::new(SyntheticEmbedder::new(config.vector.dim));
        let classifier = Arc::new(CompositeClassifier::new(store.clone(), ClassifierConfig::default()));
        MemoryService::new(store, vectors, embedder, classifier, config)
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let svc = service();
        let result = svc
            .add("the quick brown fox", Some("u1"), AddOptions::default())
            .await
            .unwrap();
        assert_eq!(result.dedupe, DedupeDecision::Inserted);

        let fetched = svc.store.get_memory(&result.id, &TenantId::user("u1")).unwrap().unwrap();
        assert_eq!(fetched.content, "the quick brown fox");
        assert_eq!(fetched.primary_sector, result.primary_sector);
    }

    #[tokio::test]
    async fn add_missing_user_id_rejected_in_strict_mode() {
        let svc = service();
        let err = svc.add("hello", None, AddOptions::default()).await.unwrap_err();
        assert!(matches!(err, OpenMemoryError::TenantScopeMissing { .. }));
    }

    #[tokio::test]
    async fn dedupe_by_simhash_reinforces_instead_of_inserting() {
        let svc = service();
        let first = svc
            .add("the quick brown fox", Some("u1"), AddOptions::default())
            .await
            .unwrap();
        let second = svc
            .add("the quick brown fox", Some("u1"), AddOptions::default())
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.dedupe, DedupeDecision::Reinforced);

        let memory = svc.store.get_memory(&first.id, &TenantId::user("u1")).unwrap().unwrap();
        assert!((memory.salience - 0.55).abs() < 1e-9);
    }

    #[tokio::test]
    async fn tenant_isolation_on_get_and_query() {
        let svc = service();
        let added = svc.add("secret", Some("u1"), AddOptions::default()).await.unwrap();

        assert!(svc.store.get_memory(&added.id, &TenantId::user("u2")).unwrap().is_none());

        let outcome = svc
            .query("secret", Some("u2"), 3, MemoryFilters::default())
            .await
            .unwrap();
        assert!(!outcome.matches.iter().any(|m| m.id == added.id));
    }

    #[tokio::test]
    async fn query_returns_the_memory_it_was_built_from() {
        let svc = service();
        let added = svc
            .add("I felt anxious before the exam", Some("u1"), AddOptions::default())
            .await
            .unwrap();

        let outcome = svc
            .query("exam anxiety", Some("u1"), 3, MemoryFilters::default())
            .await
            .unwrap();
        assert!(outcome.matches.iter().any(|m| m.id == added.id));
    }

    #[tokio::test]
    async fn update_increments_version_and_changes_content() {
        let svc = service();
        let added = svc.add("original text", Some("u1"), AddOptions::default()).await.unwrap();

        let updated = svc
            .update(
                &added.id,
                UpdatePartial {
                    content: Some("revised text".to_string()),
                    ..Default::default()
                },
                Some("u1"),
            )
            .await
            .unwrap();
        assert_eq!(updated.version, 2);

        let memory = svc.store.get_memory(&added.id, &TenantId::user("u1")).unwrap().unwrap();
        assert_eq!(memory.content, "revised text");
    }

    #[tokio::test]
    async fn delete_cascades_and_is_idempotent() {
        let svc = service();
        let added = svc.add("to be deleted", Some("u1"), AddOptions::default()).await.unwrap();

        let first = svc.delete(&added.id, Some("u1")).await.unwrap();
        assert!(first.deleted);
        assert!(svc.store.get_memory(&added.id, &TenantId::user("u1")).unwrap().is_none());

        let second = svc.delete(&added.id, Some("u1")).await.unwrap();
        assert!(!second.deleted);
    }

    #[tokio::test]
    async fn reinforce_clamps_salience_to_one() {
        let svc = service();
        let added = svc.add("bounded salience", Some("u1"), AddOptions::default()).await.unwrap();
        let result = svc.reinforce(&added.id, 10.0, Some("u1")).await.unwrap();
        assert_eq!(result.salience, 1.0);
    }

    #[tokio::test]
    async fn list_paginates_by_cursor() {
        let svc = service();
        for i in 0..3 {
            svc.add(&format!("memory {i}"), Some("u1"), AddOptions::default()).await.unwrap();
        }
        let (first_page, cursor) = svc.list(Some("u1"), 2, None).await.unwrap();
        assert_eq!(first_page.len(), 2);
        assert!(cursor.is_some());

        let (second_page, _) = svc.list(Some("u1"), 2, cursor).await.unwrap();
        assert_eq!(second_page.len(), 1);
    }

    #[tokio::test]
    async fn cascade_delete_user_zeroes_both_metadata_and_vectors() {
        let svc = service();
        for i in 0..3 {
            svc.add(&format!("memory {i}"), Some("u1"), AddOptions::default()).await.unwrap();
        }
        let tenant = TenantId::user("u1");
        assert!(svc.vectors.row_count_for_tenant(&tenant) > 0);

        svc.cascade_delete_user("u1").await.unwrap();

        let (remaining, _) = svc.list(Some("u1"), 50, None).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(svc.vectors.row_count_for_tenant(&tenant), 0);
    }
}
