use serde::{Deserialize, Serialize};

/// Maintenance Scheduler job cadence (spec.md §4.I). Intervals in
/// seconds, matching how the sibling system's scheduler config is shaped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub decay_interval_secs: u64,
    pub consolidate_interval_secs: u64,
    pub user_summary_interval_secs: u64,
    /// Also run `user_summary` early once this many new memories have
    /// accumulated for a tenant since the last run (spec.md §4.I).
    pub user_summary_memory_threshold: u64,
    pub classifier_retrain_interval_secs: u64,
    pub temporal_decay_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            decay_interval_secs: 3_600,
            consolidate_interval_secs: 6 * 3_600,
            user_summary_interval_secs: 24 * 3_600,
            user_summary_memory_threshold: 200,
            classifier_retrain_interval_secs: 24 * 3_600,
            temporal_decay_interval_secs: 24 * 3_600,
        }
    }
}
