use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A degradation event emitted when a subsystem falls back to a
/// lower-quality mode (SPEC_FULL.md §2, e.g. embedder provider failure,
/// scheduler job retry). Grounded on the sibling system's own
/// degradation-event model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

/// Comprehensive health report aggregated across subsystems
/// (SPEC_FULL.md §2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub subsystems: Vec<SubsystemHealth>,
    pub metrics: HealthMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub total_memories: u64,
    pub active_memories: u64,
    pub archived_memories: u64,
    pub average_salience: f64,
    pub db_size_bytes: u64,
}
