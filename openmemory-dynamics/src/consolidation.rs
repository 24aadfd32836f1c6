//! Consolidation (spec.md §4.G): cluster near-duplicate memories by
//! simhash Hamming distance and mean-vec cosine similarity, merge each
//! cluster into its highest-salience survivor. Union-find clustering is
//! grounded on the pack's memory-dedup tool; the large-tenant HDBSCAN
//! prefilter is grounded on the sibling system's consolidation
//! pipeline's phase-2 clustering stage — HDBSCAN only
//! prunes candidate pairs, every merge still passes the exact pairwise
//! check below so the result matches spec.md regardless of tenant size.

use std::collections::HashMap;

use hdbscan::{Hdbscan, HdbscanHyperParams};
use openmemory_core::config::ConsolidationConfig;
use openmemory_core::models::Memory;
use openmemory_vectors::simd::cosine_similarity;

/// Above this candidate count, prefilter with HDBSCAN before the exact
/// pairwise check to avoid O(n^2) pairwise comparison over the whole
/// tenant (spec.md §1: exhaustive scan is "good enough" at target scale,
/// but consolidation runs periodically over potentially large tenants).
const HDBSCAN_PREFILTER_THRESHOLD: usize = 512;
const HDBSCAN_MIN_CLUSTER_SIZE: usize = 2;

/// Simple union-find for grouping pairwise-merge-eligible memories into
/// clusters (grounded on the pack's memory-dedup tool).
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return;
        }
        if self.rank[rx] < self.rank[ry] {
            self.parent[rx] = ry;
        } else if self.rank[rx] > self.rank[ry] {
            self.parent[ry] = rx;
        } else {
            self.parent[ry] = rx;
            self.rank[rx] += 1;
        }
    }
}

/// The outcome of merging one cluster: the memory that survives plus the
/// ids of the memories deleted into it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDecision {
    pub survivor_id: String,
    pub merged_ids: Vec<String>,
    pub survivor_salience: f64,
    pub survivor_feedback_score: f64,
}

fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

fn eligible_for_merge(a: &Memory, b: &Memory, config: &ConsolidationConfig) -> bool {
    hamming_distance(a.simhash, b.simhash) <= config.simhash_max_hamming
        && !a.mean_vec.is_empty()
        && a.mean_vec.len() == b.mean_vec.len()
        && cosine_similarity(&a.mean_vec, &b.mean_vec) >= config.min_cosine_similarity
}

/// Candidate pairs from an HDBSCAN prefilter: memories are only compared
/// pairwise within a cluster HDBSCAN thinks might be near-duplicates.
/// Falls back to "compare everything" (all indices in one group) if
/// clustering errors, since the subsequent exact check still applies.
fn hdbscan_candidate_groups(memories: &[Memory]) -> Vec<Vec<usize>> {
    let features: Vec<Vec<f32>> = memories
        .iter()
        .map(|m| {
            if m.mean_vec.is_empty() {
                vec![0.0; 1]
            } else {
                m.mean_vec.clone()
            }
        })
        .collect();

    let hyper_params = HdbscanHyperParams::builder()
        .min_cluster_size(HDBSCAN_MIN_CLUSTER_SIZE)
        .min_samples(1)
        .build();

    let clusterer = Hdbscan::new(&features, hyper_params);
    let labels = match clusterer.cluster() {
        Ok(l) => l,
        Err(_) => return vec![(0..memories.len()).collect()],
    };

    let mut groups: HashMap<i32, Vec<usize>> = HashMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        if label >= 0 {
            groups.entry(label).or_default().push(idx);
        }
        // Noise points (label < 0) are deferred: not compared this round.
    }
    groups.into_values().collect()
}

/// Cluster `memories` (already loaded for one tenant) into merge groups
/// and decide, per group, which memory survives. Idempotent: running
/// consolidation twice on the same input (including on its own output)
/// produces no further merges, since merged memories no longer exist and
/// survivors keep their own simhash/mean_vec (spec.md §4.G, §8 property 7).
pub fn plan_merges(memories: &[Memory], config: &ConsolidationConfig) -> Vec<MergeDecision> {
    if memories.len() < 2 {
        return Vec::new();
    }

    let mut uf = UnionFind::new(memories.len());

    if memories.len() > HDBSCAN_PREFILTER_THRESHOLD {
        for group in hdbscan_candidate_groups(memories) {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    let (a, b) = (group[i], group[j]);
                    if eligible_for_merge(&memories[a], &memories[b], config) {
                        uf.union(a, b);
                    }
                }
            }
        }
    } else {
        for i in 0..memories.len() {
            for j in (i + 1)..memories.len() {
                if eligible_for_merge(&memories[i], &memories[j], config) {
                    uf.union(i, j);
                }
            }
        }
    }

    let mut cluster_map: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..memories.len() {
        cluster_map.entry(uf.find(i)).or_default().push(i);
    }

    cluster_map
        .into_values()
        .filter(|members| members.len() > 1)
        .map(|members| {
            let survivor_idx = *members
                .iter()
                .max_by(|&&a, &&b| {
                    memories[a]
                        .salience
                        .partial_cmp(&memories[b].salience)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| memories[a].id.cmp(&memories[b].id))
                })
                .expect("non-empty cluster");

            let merged_ids: Vec<String> = members
                .iter()
                .filter(|&&i| i != survivor_idx)
                .map(|&i| memories[i].id.clone())
                .collect();

            let summed_feedback: f64 = members.iter().map(|&i| memories[i].feedback_score).sum();

            MergeDecision {
                survivor_id: memories[survivor_idx].id.clone(),
                merged_ids,
                survivor_salience: memories[survivor_idx].salience,
                survivor_feedback_score: summed_feedback,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use openmemory_core::sector::Sector;
    use openmemory_core::tenant::TenantId;
    use std::collections::{BTreeMap, BTreeSet};

    fn memory(id: &str, simhash: u64, mean_vec: Vec<f32>, salience: f64) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.to_string(),
            user_id: TenantId::user("u1"),
            content: "x".to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_seen_at: now,
            salience,
            decay_lambda: 0.03,
            version: 1,
            segment: 0,
            simhash,
            mean_vec,
            compressed_vec: None,
            feedback_score: 1.0,
            generated_summary: None,
        }
    }

    #[test]
    fn near_duplicates_merge_into_highest_salience_survivor() {
        let config = ConsolidationConfig::default();
        let memories = vec![
            memory("a", 0b1010, vec![1.0, 0.0, 0.0, 0.0], 0.3),
            memory("b", 0b1011, vec![1.0, 0.0, 0.0, 0.0], 0.9),
            memory("c", 0xFFFF_FFFF_0000_0000, vec![0.0, 1.0, 0.0, 0.0], 0.5),
        ];
        let decisions = plan_merges(&memories, &config);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].survivor_id, "b");
        assert_eq!(decisions[0].merged_ids, vec!["a".to_string()]);
        assert_eq!(decisions[0].survivor_feedback_score, 2.0);
    }

    #[test]
    fn dissimilar_memories_never_merge() {
        let config = ConsolidationConfig::default();
        let memories = vec![
            memory("a", 0, vec![1.0, 0.0], 0.5),
            memory("b", u64::MAX, vec![0.0, 1.0], 0.5),
        ];
        assert!(plan_merges(&memories, &config).is_empty());
    }

    #[test]
    fn single_memory_never_merges() {
        let config = ConsolidationConfig::default();
        let memories = vec![memory("a", 0, vec![1.0, 0.0], 0.5)];
        assert!(plan_merges(&memories, &config).is_empty());
    }

    #[test]
    fn consolidation_is_idempotent() {
        let config = ConsolidationConfig::default();
        let memories = vec![
            memory("a", 0, vec![1.0, 0.0, 0.0, 0.0], 0.3),
            memory("b", 0, vec![1.0, 0.0, 0.0, 0.0], 0.9),
        ];
        let first = plan_merges(&memories, &config);
        assert_eq!(first.len(), 1);

        let survivors: Vec<Memory> = memories
            .into_iter()
            .filter(|m| m.id == first[0].survivor_id)
            .collect();
        let second = plan_merges(&survivors, &config);
        assert!(second.is_empty());
    }
}
