//! Dual-phase exponential decay and the composite query score (spec.md
//! §4.G, §4.E step 7). Shape follows the sibling decay engine's
//! `compute`/`compute_breakdown` split — one for the hot path, one for
//! diagnostics — though the underlying formula here is additive
//! dual-phase rather than the sibling's multiplicative 5-factor one.

use chrono::{DateTime, Utc};

use openmemory_core::config::DecayConfig;
use openmemory_core::models::Memory;

/// `retention(s, age_days, lambda) = s * (alpha*exp(-lambda_fast*age) +
/// (1-alpha)*exp(-lambda_slow*age))`, `lambda_fast = lambda`,
/// `lambda_slow = lambda / slow_divisor` (spec.md §4.G).
pub fn dual_phase_decay(salience: f64, age_days: f64, lambda: f64, config: &DecayConfig) -> f64 {
    let lambda_fast = lambda;
    let lambda_slow = lambda / config.slow_divisor;
    let fast = config.alpha * (-lambda_fast * age_days).exp();
    let slow = (1.0 - config.alpha) * (-lambda_slow * age_days).exp();
    (salience * (fast + slow)).clamp(0.0, 1.0)
}

/// Per-factor breakdown of a decay computation, for observability.
#[derive(Debug, Clone)]
pub struct DecayBreakdown {
    pub base_salience: f64,
    pub age_days: f64,
    pub fast_component: f64,
    pub slow_component: f64,
    pub retained: f64,
}

pub fn compute_breakdown(salience: f64, age_days: f64, lambda: f64, config: &DecayConfig) -> DecayBreakdown {
    let lambda_fast = lambda;
    let lambda_slow = lambda / config.slow_divisor;
    let fast = config.alpha * (-lambda_fast * age_days).exp();
    let slow = (1.0 - config.alpha) * (-lambda_slow * age_days).exp();
    DecayBreakdown {
        base_salience: salience,
        age_days,
        fast_component: fast,
        slow_component: slow,
        retained: (salience * (fast + slow)).clamp(0.0, 1.0),
    }
}

/// Live salience of `memory` at `now`, applying decay without persisting
/// it — used during `query` (spec.md §4.E step 7).
pub fn salience_now(memory: &Memory, now: DateTime<Utc>, config: &DecayConfig) -> f64 {
    dual_phase_decay(memory.salience, memory.age_days(now), memory.decay_lambda, config)
}

/// `recency = sigmoid(-(now - last_seen_at) / tau)`: closer to 1.0 the
/// more recently the memory was seen (spec.md §4.E step 7).
pub fn recency_score(last_seen_at: DateTime<Utc>, now: DateTime<Utc>, config: &DecayConfig) -> f64 {
    let elapsed_ms = (now - last_seen_at).num_milliseconds() as f64;
    sigmoid(-elapsed_ms / config.recency_tau_ms)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Composite query score (spec.md §4.E step 7):
/// `0.6*sim + 0.2*salience_now + 0.1*recency + 0.1*max_link_weight`.
pub fn composite_score(
    sim: f64,
    salience_now: f64,
    recency: f64,
    max_link_weight: f64,
    config: &DecayConfig,
) -> f64 {
    config.score_weight_similarity * sim
        + config.score_weight_salience * salience_now
        + config.score_weight_recency * recency
        + config.score_weight_link * max_link_weight
}

/// Batch-compute live salience for a set of memories, for the Maintenance
/// Scheduler's `decay` job (spec.md §4.I): returns `(id, decayed_salience,
/// last_seen_at)` ready to hand to `MetadataStore::update_salience_batch`.
pub fn process_batch(
    memories: &[Memory],
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> Vec<(String, f64, DateTime<Utc>)> {
    memories
        .iter()
        .map(|m| (m.id.clone(), salience_now(m, now, config), m.last_seen_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_age_returns_full_salience() {
        let config = DecayConfig::default();
        assert!((dual_phase_decay(0.8, 0.0, 0.05, &config) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn decay_is_monotonically_non_increasing_with_age() {
        let config = DecayConfig::default();
        let mut prev = dual_phase_decay(0.8, 0.0, 0.05, &config);
        for day in 1..200 {
            let next = dual_phase_decay(0.8, day as f64, 0.05, &config);
            assert!(next <= prev + 1e-12, "decay increased at day {day}");
            prev = next;
        }
    }

    #[test]
    fn slow_phase_keeps_a_residual_beyond_fast_half_life() {
        let config = DecayConfig::default();
        let far_future = dual_phase_decay(0.8, 3650.0, 0.05, &config);
        assert!(far_future > 0.0, "slow phase should never fully zero out salience");
    }

    #[test]
    fn recency_is_higher_for_more_recent_timestamps() {
        let config = DecayConfig::default();
        let now = Utc::now();
        let recent = recency_score(now - chrono::Duration::hours(1), now, &config);
        let stale = recency_score(now - chrono::Duration::days(30), now, &config);
        assert!(recent > stale);
    }

    #[test]
    fn composite_score_weights_sum_matches_config() {
        let config = DecayConfig::default();
        let score = composite_score(1.0, 1.0, 1.0, 1.0, &config);
        assert!((score - 1.0).abs() < 1e-9);
    }
}
