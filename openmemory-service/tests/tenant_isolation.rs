//! Cross-tenant isolation property (spec.md §8: "no query, list, or get
//! under tenant B ever returns a memory added under tenant A").

use std::sync::Arc;

use openmemory_classifier::CompositeClassifier;
use openmemory_core::config::{ClassifierConfig, OpenMemoryConfig, StorageConfig};
use openmemory_core::models::MemoryFilters;
use openmemory_embeddings::SyntheticEmbedder;
use openmemory_service::{AddOptions, MemoryService};
use openmemory_storage::engine::SqliteStore;
use openmemory_vectors::InMemoryVectorStore;
use proptest::prelude::*;

type Service = MemoryService<SqliteStore, InMemoryVectorStore, SyntheticEmbedder, CompositeClassifier<SqliteStore>>;

fn service() -> Service {
    let store = Arc::new(SqliteStore::open_in_memory(&StorageConfig::default()).unwrap());
    let vectors = Arc::new(InMemoryVectorStore::new());
    let config = OpenMemoryConfig::default();
    let embedder = Arc::new(SyntheticEmbedder::new(config.vector.dim));
    let classifier = Arc::new(CompositeClassifier::new(store.clone(), ClassifierConfig::default()));
    MemoryService::new(store, vectors, embedder, classifier, config)
}

fn content_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{4,80}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn memory_added_under_one_tenant_is_invisible_to_another(content in content_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let svc = service();

        let added = rt
            .block_on(svc.add(&content, Some("tenant-a"), AddOptions::default()))
            .unwrap();

        let outcome = rt
            .block_on(svc.query(&content, Some("tenant-b"), 10, MemoryFilters::default()))
            .unwrap();
        prop_assert!(!outcome.matches.iter().any(|m| m.id == added.id));

        let (listed, _) = rt.block_on(svc.list(Some("tenant-b"), 50, None)).unwrap();
        prop_assert!(!listed.iter().any(|m| m.id == added.id));
    }
}
