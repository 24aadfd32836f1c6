use criterion::{criterion_group, criterion_main, Criterion};

use openmemory_core::sector::Sector;
use openmemory_core::traits::Embedder;
use openmemory_embeddings::synthetic::SyntheticEmbedder;

fn bench_synthetic_embed_single_sector(c: &mut Criterion) {
    let embedder = SyntheticEmbedder::new(768);
    c.bench_function("synthetic_embed_single_sector", |b| {
        b.iter(|| {
            embedder.embed("the quick brown fox jumps over the lazy dog", &[Sector::Semantic]).unwrap();
        });
    });
}

fn bench_synthetic_embed_all_sectors(c: &mut Criterion) {
    let embedder = SyntheticEmbedder::new(768);
    c.bench_function("synthetic_embed_all_sectors", |b| {
        b.iter(|| {
            embedder
                .embed("the quick brown fox jumps over the lazy dog", &Sector::ALL)
                .unwrap();
        });
    });
}

criterion_group!(benches, bench_synthetic_embed_single_sector, bench_synthetic_embed_all_sectors);
criterion_main!(benches);
