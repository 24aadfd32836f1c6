use serde::{Deserialize, Serialize};

/// Vector Store tuning (spec.md §4.B): dimensionality and the exhaustive
/// top-M expansion multiplier used before waypoint expansion narrows
/// candidates back down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorConfig {
    pub dim: usize,
    pub top_m_multiplier: usize,
    pub top_m_floor: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dim: 768,
            top_m_multiplier: crate::constants::TOP_M_MULTIPLIER,
            top_m_floor: crate::constants::TOP_M_FLOOR,
        }
    }
}

/// Embedding provider selection and retry policy (spec.md §4.C).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "gemini", "ollama", or "synthetic" for the
    /// deterministic offline fallback.
    pub provider: String,
    pub retry_base_ms: u64,
    pub retry_cap_ms: u64,
    pub retry_min_attempts: u32,
    pub deadline_secs: u64,
    pub api_base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "synthetic".to_string(),
            retry_base_ms: crate::constants::EMBEDDER_RETRY_BASE_MS,
            retry_cap_ms: crate::constants::EMBEDDER_RETRY_CAP_MS,
            retry_min_attempts: crate::constants::EMBEDDER_RETRY_MIN_ATTEMPTS,
            deadline_secs: crate::constants::DEADLINE_EMBED_SECS,
            api_base_url: None,
        }
    }
}
