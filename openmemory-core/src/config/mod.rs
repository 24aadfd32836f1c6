//! Configuration surface (spec.md §6). One `OpenMemoryConfig`, composed of
//! per-subsystem structs, each independently defaultable and independently
//! overridable from a partial TOML document — the same composition
//! pattern the sibling system's `CortexConfig` uses.

mod classifier_config;
mod decay_config;
mod scheduler_config;
mod storage_config;
mod temporal_config;
mod tenant_config;
mod vector_config;

pub use classifier_config::ClassifierConfig;
pub use decay_config::{ConsolidationConfig, DecayConfig};
pub use scheduler_config::SchedulerConfig;
pub use storage_config::StorageConfig;
pub use temporal_config::TemporalConfig;
pub use tenant_config::TenantConfig;
pub use vector_config::{EmbeddingConfig, VectorConfig};

use serde::{Deserialize, Serialize};

use crate::errors::{OpenMemoryError, OpenMemoryResult};

/// Root configuration object (spec.md §6 "Configuration surface").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMemoryConfig {
    pub storage: StorageConfig,
    pub vector: VectorConfig,
    pub embedding: EmbeddingConfig,
    pub classifier: ClassifierConfig,
    pub decay: DecayConfig,
    pub consolidation: ConsolidationConfig,
    pub temporal: TemporalConfig,
    pub scheduler: SchedulerConfig,
    pub tenant: TenantConfig,
}

impl Default for OpenMemoryConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            vector: VectorConfig::default(),
            embedding: EmbeddingConfig::default(),
            classifier: ClassifierConfig::default(),
            decay: DecayConfig::default(),
            consolidation: ConsolidationConfig::default(),
            temporal: TemporalConfig::default(),
            scheduler: SchedulerConfig::default(),
            tenant: TenantConfig::default(),
        }
    }
}

impl OpenMemoryConfig {
    /// Parse a (possibly partial) TOML document, layering it over
    /// defaults for any field/section it omits.
    pub fn from_toml(source: &str) -> OpenMemoryResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| OpenMemoryError::invalid_input(format!("invalid config TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants that a plain `#[serde(default)]`
    /// can't express, once at construction time rather than at every call
    /// site (SPEC_FULL.md §1.3).
    pub fn validate(&self) -> OpenMemoryResult<()> {
        if self.vector.dim < 32 {
            return Err(OpenMemoryError::invalid_input(format!(
                "vec_dim must be >= 32, got {}",
                self.vector.dim
            )));
        }

        let weight_sum = self.decay.score_weight_similarity
            + self.decay.score_weight_salience
            + self.decay.score_weight_recency
            + self.decay.score_weight_link;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(OpenMemoryError::invalid_input(format!(
                "composite score weights must sum to 1.0, got {weight_sum}"
            )));
        }

        if self.classifier.tie_break_margin < 0.0 {
            return Err(OpenMemoryError::invalid_input(
                "classifier tie_break_margin must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_all_defaults() {
        let config = OpenMemoryConfig::from_toml("").unwrap();
        assert_eq!(config.vector.dim, 768);
        assert!(config.tenant.strict_tenant);
        assert_eq!(config.scheduler.decay_interval_secs, 3600);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
[vector]
dim = 1536

[tenant]
strict_tenant = false
"#;
        let config = OpenMemoryConfig::from_toml(toml).unwrap();
        assert_eq!(config.vector.dim, 1536);
        assert!(!config.tenant.strict_tenant);
        // untouched sections keep defaults
        assert_eq!(config.decay.score_weight_similarity, 0.6);
    }

    #[test]
    fn rejects_dim_below_32() {
        let toml = "[vector]\ndim = 8\n";
        assert!(OpenMemoryConfig::from_toml(toml).is_err());
    }

    #[test]
    fn rejects_score_weights_not_summing_to_one() {
        let toml = "[decay]\nscore_weight_similarity = 0.9\n";
        assert!(OpenMemoryConfig::from_toml(toml).is_err());
    }
}
