use serde::{Deserialize, Serialize};

/// Dual-phase decay and composite ranking weights (spec.md §3, §4.G,
/// §4.E step 7). Exposed as config rather than hardcoded so a deployment
/// can retune ranking without a rebuild, matching the sibling system's
/// `DecayConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecayConfig {
    pub alpha: f64,
    pub slow_divisor: f64,
    pub score_weight_similarity: f64,
    pub score_weight_salience: f64,
    pub score_weight_recency: f64,
    pub score_weight_link: f64,
    pub recency_tau_ms: f64,
    pub query_reinforcement_salience_factor: f64,
    pub query_reinforcement_link_delta: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            alpha: crate::constants::DECAY_ALPHA,
            slow_divisor: crate::constants::DECAY_SLOW_DIVISOR,
            score_weight_similarity: crate::constants::SCORE_WEIGHT_SIMILARITY,
            score_weight_salience: crate::constants::SCORE_WEIGHT_SALIENCE,
            score_weight_recency: crate::constants::SCORE_WEIGHT_RECENCY,
            score_weight_link: crate::constants::SCORE_WEIGHT_LINK,
            recency_tau_ms: crate::constants::RECENCY_TAU_MS,
            query_reinforcement_salience_factor: crate::constants::QUERY_REINFORCEMENT_SALIENCE_FACTOR,
            query_reinforcement_link_delta: crate::constants::QUERY_REINFORCEMENT_LINK_DELTA,
        }
    }
}

/// Consolidation thresholds (spec.md §4.G): when two memories are
/// considered near-duplicates eligible for merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub simhash_max_hamming: u32,
    pub min_cosine_similarity: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            simhash_max_hamming: crate::constants::CONSOLIDATION_SIMHASH_MAX_HAMMING,
            min_cosine_similarity: crate::constants::CONSOLIDATION_MIN_COSINE_SIMILARITY,
        }
    }
}
