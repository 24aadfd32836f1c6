use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sector::Sector;
use crate::tenant::TenantId;

/// The canonical memory node (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Opaque 128-bit identifier, rendered as a UUID string.
    pub id: String,
    pub user_id: TenantId,
    pub content: String,
    pub primary_sector: Sector,
    /// Auxiliary sectors classified alongside the primary, each with a
    /// stored per-sector vector (spec.md invariant: "for every sector in
    /// the memory's sector set there is exactly one vector").
    pub auxiliary_sectors: BTreeSet<Sector>,
    pub tags: BTreeSet<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// Real number in [0,1], initial 0.5.
    pub salience: f64,
    pub decay_lambda: f64,
    pub version: u64,
    /// Bucket index derived from `created_at / 24h`, for sharded scans.
    pub segment: i64,
    pub simhash: u64,
    /// Centroid of the per-sector vectors; dimension = configured `dim`.
    pub mean_vec: Vec<f32>,
    /// Optional 8-bit quantized centroid for fast pre-filter.
    pub compressed_vec: Option<Vec<i8>>,
    pub feedback_score: f64,
    pub generated_summary: Option<String>,
}

impl Memory {
    /// All sectors this memory has a stored vector for: primary + auxiliary.
    pub fn all_sectors(&self) -> BTreeSet<Sector> {
        let mut sectors = self.auxiliary_sectors.clone();
        sectors.insert(self.primary_sector);
        sectors
    }

    /// Age in whole days from `created_at` to `now`, used by the decay
    /// formula (spec.md §4.G). Negative ages (clock skew) clamp to 0.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.created_at).num_milliseconds();
        (millis as f64 / 86_400_000.0).max(0.0)
    }

    /// Segment bucket for `created_at`, matching the persisted `segment`
    /// column's derivation (spec.md §3: "derived from created_at / 24h").
    pub fn segment_for(created_at: DateTime<Utc>) -> i64 {
        created_at.timestamp_millis() / 86_400_000
    }
}

/// Filters accepted by `MemoryService::query` (spec.md §4.E).
#[derive(Debug, Clone, Default)]
pub struct MemoryFilters {
    pub sector: Option<Sector>,
    pub tags: Option<BTreeSet<String>>,
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    pub min_salience: Option<f64>,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }
}

/// A candidate memory mid-way through the query pipeline (spec.md §4.E
/// steps 4–6): the maximum per-sector similarity seen so far, which
/// sectors matched, and whether it arrived via waypoint expansion.
#[derive(Debug, Clone)]
pub struct QueryCandidate {
    pub memory_id: String,
    pub max_similarity: f64,
    pub matched_sectors: BTreeSet<Sector>,
    pub expanded: bool,
    pub max_link_weight: f64,
}

impl QueryCandidate {
    pub fn new(memory_id: impl Into<String>) -> Self {
        Self {
            memory_id: memory_id.into(),
            max_similarity: f64::MIN,
            matched_sectors: BTreeSet::new(),
            expanded: false,
            max_link_weight: 0.0,
        }
    }

    pub fn merge_direct_hit(&mut self, sector: Sector, similarity: f64) {
        self.matched_sectors.insert(sector);
        if similarity > self.max_similarity {
            self.max_similarity = similarity;
        }
    }
}

/// A final, ranked query result (spec.md §4.E step 8 / §6 response body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMemory {
    pub id: String,
    pub score: f64,
    pub sim: f64,
    pub salience: f64,
    pub primary_sector: Sector,
    pub matched_sectors: Vec<Sector>,
    pub content: String,
    pub expanded: bool,
}
