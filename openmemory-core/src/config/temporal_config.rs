use serde::{Deserialize, Serialize};

/// Temporal Graph tuning (spec.md §4.H): confidence decay applied by the
/// Maintenance Scheduler's `temporal_decay` job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemporalConfig {
    /// Daily multiplicative confidence decay applied to open facts older
    /// than `decay_horizon_days`.
    pub confidence_decay_per_day: f64,
    pub decay_horizon_days: i64,
    pub min_confidence: f64,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            confidence_decay_per_day: 0.01,
            decay_horizon_days: 30,
            min_confidence: 0.05,
        }
    }
}
