use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// A directed, weighted edge between two memories (spec.md §3, §4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub src_id: String,
    pub dst_id: String,
    pub user_id: TenantId,
    /// Clamped to [0,1].
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Waypoint {
    pub fn clamp_weight(weight: f64) -> f64 {
        weight.clamp(0.0, 1.0)
    }
}
