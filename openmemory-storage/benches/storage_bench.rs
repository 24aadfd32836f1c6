use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};

use openmemory_core::config::StorageConfig;
use openmemory_core::models::Memory;
use openmemory_core::sector::Sector;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;
use openmemory_storage::SqliteStore;

fn make_memory(i: usize) -> Memory {
    let now = Utc::now();
    let content = format!("memory number {i}");
    Memory {
        id: format!("m{i}"),
        user_id: TenantId::user("bench-tenant"),
        content: content.clone(),
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
        simhash: openmemory_core::simhash::simhash64(&content),
        mean_vec: vec![0.1; 768],
        compressed_vec: None,
        feedback_score: 0.0,
        generated_summary: None,
    }
}

fn bench_batch_insert_500(c: &mut Criterion) {
    c.bench_function("batch_insert_memories_500", |b| {
        b.iter(|| {
            let store = SqliteStore::open_in_memory(&StorageConfig::default()).unwrap();
            let memories: Vec<Memory> = (0..500).map(make_memory).collect();
            store.batch_insert_memories(&memories).unwrap();
        });
    });
}

fn bench_list_pagination(c: &mut Criterion) {
    let store = SqliteStore::open_in_memory(&StorageConfig::default()).unwrap();
    let memories: Vec<Memory> = (0..2_000).map(make_memory).collect();
    store.batch_insert_memories(&memories).unwrap();
    let tenant = TenantId::user("bench-tenant");

    c.bench_function("list_first_page_of_2k", |b| {
        b.iter(|| {
            store.list(&tenant, 50, None).unwrap();
        });
    });
}

criterion_group!(benches, bench_batch_insert_500, bench_list_pagination);
criterion_main!(benches);
