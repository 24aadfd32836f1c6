//! `RouterEmbedder`: selects the configured provider, retries it per
//! spec.md §4.C's backoff policy, and falls back to the synthetic
//! embedder on terminal failure — emitting a `DegradationEvent` and
//! marking `fallback_used` on the returned result, exactly as spec.md
//! §4.C requires. Grounded on the sibling system's
//! degradation-chain shape, collapsed to a
//! two-tier chain (configured provider, then synthetic) since spec.md
//! only ever names one active provider plus the synthetic fallback.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::warn;

use openmemory_core::config::EmbeddingConfig;
use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::DegradationEvent;
use openmemory_core::sector::Sector;
use openmemory_core::traits::{EmbedResult, Embedder};

use crate::providers::{HttpEmbedProvider, ProviderKind};
use crate::retry::retry_embed;
use crate::synthetic::SyntheticEmbedder;

pub struct RouterEmbedder {
    config: EmbeddingConfig,
    provider: Option<HttpEmbedProvider>,
    synthetic: SyntheticEmbedder,
    events: Mutex<Vec<DegradationEvent>>,
}

impl RouterEmbedder {
    pub fn new(config: EmbeddingConfig, dims: usize) -> Self {
        let provider = ProviderKind::from_name(&config.provider).and_then(|kind| {
            HttpEmbedProvider::new(kind, config.api_base_url.as_deref(), dims, config.deadline_secs).ok()
        });

        Self {
            config,
            provider,
            synthetic: SyntheticEmbedder::new(dims),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Degradation events accumulated since the last drain.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        let mut guard = self.events.lock().expect("degradation event lock poisoned");
        std::mem::take(&mut *guard)
    }

    fn embed_with_fallback(&self, text: &str) -> OpenMemoryResult<(Vec<f32>, &'static str, bool)> {
        if let Some(provider) = &self.provider {
            if provider.is_configured() {
                let result = retry_embed(&self.config, provider.kind().name(), || provider.embed_one(text));
                match result {
                    Ok(vector) => return Ok((vector, provider_name_static(provider.kind()), false)),
                    Err(e) => {
                        warn!(
                            provider = provider.kind().name(),
                            error = %e,
                            "embedder exhausted retries, falling back to synthetic"
                        );
                        self.events.lock().expect("degradation event lock poisoned").push(DegradationEvent {
                            component: "embeddings".to_string(),
                            failure: e.to_string(),
                            fallback_used: "synthetic".to_string(),
                            timestamp: Utc::now(),
                        });
                    }
                }
            }
        }

        let fallback = self.synthetic.embed(text, &[Sector::Semantic])?;
        Ok((
            fallback.vectors[&Sector::Semantic].clone(),
            "synthetic",
            true,
        ))
    }
}

fn provider_name_static(kind: ProviderKind) -> &'static str {
    kind.name()
}

impl Embedder for RouterEmbedder {
    fn embed(&self, text: &str, sectors: &[Sector]) -> OpenMemoryResult<EmbedResult> {
        let (vector, provider, fallback_used) = self.embed_with_fallback(text)?;
        let vectors: BTreeMap<Sector, Vec<f32>> = sectors.iter().map(|&s| (s, vector.clone())).collect();
        Ok(EmbedResult {
            vectors,
            provider: provider.to_string(),
            fallback_used,
        })
    }

    fn dimensions(&self) -> usize {
        self.synthetic.dimensions()
    }

    fn name(&self) -> &str {
        "router"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_synthetic_when_provider_unconfigured() {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            ..EmbeddingConfig::default()
        };
        let router = RouterEmbedder::new(config, 32);
        let result = router.embed("hello", &[Sector::Semantic, Sector::Episodic]).unwrap();
        assert!(result.fallback_used);
        assert_eq!(result.provider, "synthetic");
        assert_eq!(result.vectors.len(), 2);
    }

    #[test]
    fn unknown_provider_name_falls_back_to_synthetic() {
        let config = EmbeddingConfig {
            provider: "not-a-real-provider".to_string(),
            ..EmbeddingConfig::default()
        };
        let router = RouterEmbedder::new(config, 32);
        let result = router.embed("hello", &[Sector::Semantic]).unwrap();
        assert_eq!(result.provider, "synthetic");
    }

    #[test]
    fn records_degradation_event_on_fallback() {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            ..EmbeddingConfig::default()
        };
        let router = RouterEmbedder::new(config, 32);
        router.embed("hello", &[Sector::Semantic]).unwrap();
        let events = router.drain_degradation_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].component, "embeddings");
    }

    #[test]
    fn synthetic_only_config_skips_provider_entirely() {
        let router = RouterEmbedder::new(EmbeddingConfig::default(), 32);
        let result = router.embed("hello", &[Sector::Semantic]).unwrap();
        assert_eq!(result.provider, "synthetic");
        assert!(router.drain_degradation_events().is_empty());
    }
}
