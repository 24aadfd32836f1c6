//! `SqliteStore` — owns the `ConnectionPool`, runs migrations at startup,
//! and implements `openmemory_core::traits::{MetadataStore, TemporalStore,
//! ClassifierModelStore}` by dispatching to the `queries` modules on
//! either the writer or the read pool.

use std::path::Path;

use chrono::{DateTime, Utc};

use openmemory_core::config::StorageConfig;
use openmemory_core::models::{FactQuery, Memory, TemporalEdge, TemporalFact, User, Waypoint};
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::{ClassifierModelStore, Cursor, MetadataStore, SectorWeights, TemporalStore};
use openmemory_core::OpenMemoryResult;

use crate::pool::ConnectionPool;
use crate::queries;

pub struct SqliteStore {
    pool: ConnectionPool,
    /// Mirrors the sibling system's storage engine: in-memory read pool
    /// connections are isolated databases, so reads route through the
    /// writer in that mode instead of the (useless) read pool.
    use_read_pool: bool,
}

impl SqliteStore {
    pub fn open(path: &Path, config: &StorageConfig) -> OpenMemoryResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let store = Self {
            pool,
            use_read_pool: true,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory(config: &StorageConfig) -> OpenMemoryResult<Self> {
        let pool = ConnectionPool::open_in_memory(config)?;
        let store = Self {
            pool,
            use_read_pool: false,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| crate::migrations::run_migrations(conn))
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn with_reader<F, T>(&self, f: F) -> OpenMemoryResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> OpenMemoryResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }

    /// Bump the classifier's unlabeled-since-training counter for `user_id`.
    /// Not part of `MetadataStore` (spec.md §4.A's surface is fixed) —
    /// called directly by `openmemory-service`'s `add` path alongside the
    /// memory insert, same transaction boundary as the sibling system's
    /// `AuditLogger::log_create` call inside `create`.
    pub fn bump_classifier_counter(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::classifier_ops::increment_unlabeled_counter(conn, user_id))
    }
}

impl MetadataStore for SqliteStore {
    fn insert_memory(&self, memory: &Memory) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::insert_memory(conn, memory))
    }

    fn batch_insert_memories(&self, memories: &[Memory]) -> OpenMemoryResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::batch_insert_memories(conn, memories))
    }

    fn get_memory(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<Option<Memory>> {
        self.with_reader(|conn| queries::memory_crud::get_memory(conn, id, user_id))
    }

    fn get_memories_by_ids(
        &self,
        ids: &[String],
        user_id: &TenantId,
    ) -> OpenMemoryResult<Vec<Memory>> {
        self.with_reader(|conn| queries::memory_crud::get_memories_by_ids(conn, ids, user_id))
    }

    fn update_memory(&self, memory: &Memory) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::update_memory(conn, memory))
    }

    fn delete_memory(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(|conn| {
            queries::waypoint_ops::delete_waypoints_for_memory(conn, id, user_id)?;
            queries::memory_crud::delete_memory(conn, id, user_id)
        })
    }

    fn delete_memories(&self, ids: &[String], user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(|conn| {
            for id in ids {
                queries::waypoint_ops::delete_waypoints_for_memory(conn, id, user_id)?;
            }
            queries::memory_crud::delete_memories(conn, ids, user_id)
        })
    }

    fn update_salience_batch(
        &self,
        updates: &[(String, f64, DateTime<Utc>)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::update_salience_batch(conn, updates, user_id))
    }

    fn update_mean_vec(
        &self,
        id: &str,
        user_id: &TenantId,
        mean_vec: &[f32],
    ) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::update_mean_vec(conn, id, user_id, mean_vec))
    }

    fn update_summary_batch(
        &self,
        updates: &[(String, String)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::update_summary_batch(conn, updates, user_id))
    }

    fn update_feedback(&self, id: &str, user_id: &TenantId, delta: f64) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::memory_crud::update_feedback(conn, id, user_id, delta))
    }

    fn find_by_simhash(&self, user_id: &TenantId, simhash: u64) -> OpenMemoryResult<Vec<Memory>> {
        self.with_reader(|conn| queries::memory_crud::find_by_simhash(conn, user_id, simhash))
    }

    fn list_by_segment(&self, user_id: &TenantId, segment: i64) -> OpenMemoryResult<Vec<Memory>> {
        self.with_reader(|conn| queries::memory_crud::list_by_segment(conn, user_id, segment))
    }

    fn list_all_for_tenant(&self, user_id: &TenantId) -> OpenMemoryResult<Vec<Memory>> {
        self.with_reader(|conn| queries::memory_crud::list_all_for_tenant(conn, user_id))
    }

    fn list(
        &self,
        user_id: &TenantId,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> OpenMemoryResult<(Vec<Memory>, Option<Cursor>)> {
        self.with_reader(|conn| queries::memory_crud::list(conn, user_id, limit, cursor.clone()))
    }

    fn search_content_like(
        &self,
        user_id: &TenantId,
        needle: &str,
        limit: usize,
    ) -> OpenMemoryResult<Vec<Memory>> {
        self.with_reader(|conn| {
            queries::memory_crud::search_content_like(conn, user_id, needle, limit)
        })
    }

    fn upsert_waypoint(&self, waypoint: &Waypoint) -> OpenMemoryResult<()> {
        if waypoint.src_id == waypoint.dst_id {
            return Err(openmemory_core::OpenMemoryError::invalid_input(
                "waypoint src_id and dst_id must differ",
            ));
        }
        self.pool
            .writer
            .with_conn(|conn| queries::waypoint_ops::upsert_waypoint(conn, waypoint))
    }

    fn get_waypoint(
        &self,
        src_id: &str,
        dst_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<Option<Waypoint>> {
        self.with_reader(|conn| queries::waypoint_ops::get_waypoint(conn, src_id, dst_id, user_id))
    }

    fn get_waypoints_from(&self, src_id: &str, user_id: &TenantId) -> OpenMemoryResult<Vec<Waypoint>> {
        self.with_reader(|conn| queries::waypoint_ops::get_waypoints_from(conn, src_id, user_id))
    }

    fn delete_waypoints_for_memory(
        &self,
        memory_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(|conn| {
            queries::waypoint_ops::delete_waypoints_for_memory(conn, memory_id, user_id)
        })
    }

    fn reinforce_waypoints(
        &self,
        pairs: &[(String, String)],
        delta: f64,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::waypoint_ops::reinforce_waypoints(conn, pairs, delta, user_id))
    }

    fn repoint_waypoints(
        &self,
        from_memory_id: &str,
        to_memory_id: &str,
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(|conn| {
            queries::waypoint_ops::repoint_waypoints(conn, from_memory_id, to_memory_id, user_id)
        })
    }

    fn get_user(&self, user_id: &str) -> OpenMemoryResult<Option<User>> {
        self.with_reader(|conn| queries::user_ops::get_user(conn, user_id))
    }

    fn upsert_user(&self, user: &User) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::user_ops::upsert_user(conn, user))
    }

    fn list_tenant_ids(&self) -> OpenMemoryResult<Vec<String>> {
        self.with_reader(queries::user_ops::list_tenant_ids)
    }

    fn cascade_delete_memories_and_waypoints(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(|conn| {
            queries::tenant_ops::cascade_delete_memories_and_waypoints(conn, user_id)
        })
    }

    fn count_for_tenant(&self, user_id: &TenantId) -> OpenMemoryResult<u64> {
        self.with_reader(|conn| queries::tenant_ops::count_for_tenant(conn, user_id))
    }

    fn average_salience(&self, user_id: &TenantId) -> OpenMemoryResult<f64> {
        self.with_reader(|conn| queries::tenant_ops::average_salience(conn, user_id))
    }

    fn vacuum(&self) -> OpenMemoryResult<()> {
        self.pool.writer.with_conn(queries::tenant_ops::vacuum)
    }
}

impl TemporalStore for SqliteStore {
    fn insert_fact(&self, fact: &TemporalFact) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::insert_fact(conn, fact))
    }

    fn get_fact(&self, id: &str, user_id: &TenantId) -> OpenMemoryResult<Option<TemporalFact>> {
        self.with_reader(|conn| queries::temporal_ops::get_fact(conn, id, user_id))
    }

    fn update_fact(&self, fact: &TemporalFact) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::update_fact(conn, fact))
    }

    fn get_open_fact(
        &self,
        user_id: &TenantId,
        subject: &str,
        predicate: &str,
    ) -> OpenMemoryResult<Option<TemporalFact>> {
        self.with_reader(|conn| queries::temporal_ops::get_open_fact(conn, user_id, subject, predicate))
    }

    fn query_facts(
        &self,
        user_id: &TenantId,
        query: &FactQuery,
    ) -> OpenMemoryResult<Vec<TemporalFact>> {
        self.with_reader(|conn| queries::temporal_ops::query_facts(conn, user_id, query))
    }

    fn list_facts_for_subject(
        &self,
        user_id: &TenantId,
        subject: &str,
        predicate: Option<&str>,
    ) -> OpenMemoryResult<Vec<TemporalFact>> {
        self.with_reader(|conn| {
            queries::temporal_ops::list_facts_for_subject(conn, user_id, subject, predicate)
        })
    }

    fn insert_edge(&self, edge: &TemporalEdge) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::insert_edge(conn, edge))
    }

    fn update_edge(&self, edge: &TemporalEdge) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::update_edge(conn, edge))
    }

    fn get_open_edge(
        &self,
        user_id: &TenantId,
        source_fact_id: &str,
        target_fact_id: &str,
        relation: &str,
    ) -> OpenMemoryResult<Option<TemporalEdge>> {
        self.with_reader(|conn| {
            queries::temporal_ops::get_open_edge(conn, user_id, source_fact_id, target_fact_id, relation)
        })
    }

    fn delete_facts_for_user(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::delete_facts_for_user(conn, user_id))
    }

    fn delete_edges_for_user(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::delete_edges_for_user(conn, user_id))
    }

    fn list_facts_older_than(
        &self,
        user_id: &TenantId,
        horizon: DateTime<Utc>,
    ) -> OpenMemoryResult<Vec<TemporalFact>> {
        self.with_reader(|conn| queries::temporal_ops::list_facts_older_than(conn, user_id, horizon))
    }

    fn update_confidence_batch(
        &self,
        updates: &[(String, f64)],
        user_id: &TenantId,
    ) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::temporal_ops::update_confidence_batch(conn, updates, user_id))
    }
}

impl ClassifierModelStore for SqliteStore {
    fn get_weights(&self, user_id: &TenantId) -> OpenMemoryResult<Option<SectorWeights>> {
        self.with_reader(|conn| queries::classifier_ops::get_weights(conn, user_id))
    }

    fn save_weights(&self, user_id: &TenantId, weights: &SectorWeights) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::classifier_ops::save_weights(conn, user_id, weights))
    }

    fn count_unlabeled_since_training(&self, user_id: &TenantId) -> OpenMemoryResult<u64> {
        self.with_reader(|conn| queries::classifier_ops::count_unlabeled_since_training(conn, user_id))
    }

    fn record_new_label(&self, user_id: &TenantId) -> OpenMemoryResult<()> {
        self.pool
            .writer
            .with_conn(|conn| queries::classifier_ops::increment_unlabeled_counter(conn, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::sector::Sector;
    use std::collections::{BTreeMap, BTreeSet};

    fn test_memory(id: &str, user_id: &str, content: &str) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.to_string(),
            user_id: TenantId::user(user_id),
            content: content.to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience: 0.5,
            decay_lambda: Sector::Semantic.default_decay_lambda(),
            version: 1,
            segment: Memory::segment_for(now),
            simhash: openmemory_core::simhash::simhash64(content),
            mean_vec: vec![0.0; 8],
            compressed_vec: None,
            feedback_score: 0.0,
            generated_summary: None,
        }
    }

    fn open_store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = open_store();
        let memory = test_memory("m1", "u1", "hello world");
        store.insert_memory(&memory).unwrap();
        let fetched = store.get_memory("m1", &TenantId::user("u1")).unwrap().unwrap();
        assert_eq!(fetched.content, "hello world");
    }

    #[test]
    fn tenant_isolation_on_get() {
        let store = open_store();
        store.insert_memory(&test_memory("m1", "u1", "secret")).unwrap();
        assert!(store.get_memory("m1", &TenantId::user("u2")).unwrap().is_none());
    }

    #[test]
    fn cascade_delete_removes_memories_and_waypoints() {
        let store = open_store();
        let u = TenantId::user("u1");
        store.insert_memory(&test_memory("m1", "u1", "a")).unwrap();
        store.insert_memory(&test_memory("m2", "u1", "b")).unwrap();
        let now = Utc::now();
        store
            .upsert_waypoint(&Waypoint {
                src_id: "m1".into(),
                dst_id: "m2".into(),
                user_id: u.clone(),
                weight: 0.5,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        store.cascade_delete_memories_and_waypoints(&u).unwrap();
        assert_eq!(store.count_for_tenant(&u).unwrap(), 0);
        assert!(store.get_waypoints_from("m1", &u).unwrap().is_empty());
    }

    #[test]
    fn self_link_waypoint_rejected() {
        let store = open_store();
        store.insert_memory(&test_memory("m1", "u1", "a")).unwrap();
        let now = Utc::now();
        let result = store.upsert_waypoint(&Waypoint {
            src_id: "m1".into(),
            dst_id: "m1".into(),
            user_id: TenantId::user("u1"),
            weight: 0.5,
            created_at: now,
            updated_at: now,
        });
        assert!(result.is_err());
    }

    #[test]
    fn like_search_treats_percent_literally() {
        let store = open_store();
        let u = TenantId::user("u1");
        store.insert_memory(&test_memory("m1", "u1", "100% done")).unwrap();
        store.insert_memory(&test_memory("m2", "u1", "10000 done")).unwrap();
        let hits = store.search_content_like(&u, "100%", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "m1");
    }
}
