//! Deterministic synthetic embedder (spec.md §4.C): "a deterministic
//! synthetic embedder (seeded by hashing text) so that `add` and `query`
//! still succeed" when every configured provider is exhausted. Modeled on
//! the sibling system's `TfIdfFallback` — no external dependencies, always
//! available — but seeded by a `blake3` hash (rather than TF-IDF term
//! buckets) and emits one distinct vector per sector from splitmix64
//! expansion of that seed, so sector vectors for the same text don't
//! collide.

use std::collections::BTreeMap;

use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::sector::Sector;
use openmemory_core::traits::{EmbedResult, Embedder};

/// Splitmix64, used only to expand a 256-bit blake3 hash into as many
/// pseudo-random floats as `dimensions` needs. Not a cryptographic PRNG;
/// determinism (same input → same output, forever) is the only property
/// that matters here.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// A float in `[-1.0, 1.0]`.
    fn next_signed_unit(&mut self) -> f32 {
        let bits = self.next_u64();
        ((bits >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0) as f32
    }
}

pub struct SyntheticEmbedder {
    dims: usize,
}

impl SyntheticEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn vector_for(&self, text: &str, sector: Sector) -> Vec<f32> {
        let hash = blake3::hash(format!("{sector}\u{0}{text}").as_bytes());
        let bytes = hash.as_bytes();
        let seed = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        let mut rng = SplitMix64::new(seed);

        let mut vec: Vec<f32> = (0..self.dims).map(|_| rng.next_signed_unit()).collect();
        let norm: f64 = vec.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in vec.iter_mut() {
                *x = (*x as f64 / norm) as f32;
            }
        }
        vec
    }
}

impl Embedder for SyntheticEmbedder {
    fn embed(&self, text: &str, sectors: &[Sector]) -> OpenMemoryResult<EmbedResult> {
        let vectors: BTreeMap<Sector, Vec<f32>> = sectors
            .iter()
            .map(|&s| (s, self.vector_for(text, s)))
            .collect();
        Ok(EmbedResult {
            vectors,
            provider: self.name().to_string(),
            fallback_used: true,
        })
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "synthetic"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_dimensions() {
        let e = SyntheticEmbedder::new(128);
        let result = e.embed("hello world", &[Sector::Semantic]).unwrap();
        assert_eq!(result.vectors[&Sector::Semantic].len(), 128);
    }

    #[test]
    fn deterministic_for_same_input() {
        let e = SyntheticEmbedder::new(64);
        let a = e.embed("same text", &[Sector::Semantic]).unwrap();
        let b = e.embed("same text", &[Sector::Semantic]).unwrap();
        assert_eq!(
            a.vectors[&Sector::Semantic],
            b.vectors[&Sector::Semantic]
        );
    }

    #[test]
    fn distinct_sectors_get_distinct_vectors() {
        let e = SyntheticEmbedder::new(64);
        let result = e
            .embed("same text", &[Sector::Semantic, Sector::Episodic])
            .unwrap();
        assert_ne!(
            result.vectors[&Sector::Semantic],
            result.vectors[&Sector::Episodic]
        );
    }

    #[test]
    fn output_is_unit_norm() {
        let e = SyntheticEmbedder::new(256);
        let result = e.embed("normalize me", &[Sector::Procedural]).unwrap();
        let v = &result.vectors[&Sector::Procedural];
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn always_marks_fallback_used() {
        let e = SyntheticEmbedder::new(32);
        let result = e.embed("x", &[Sector::Semantic]).unwrap();
        assert!(result.fallback_used);
    }

    #[test]
    fn is_always_available() {
        assert!(SyntheticEmbedder::new(32).is_available());
    }
}
