/// OpenMemory engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard cap on IDs accepted per `get_memories_by_ids` call (spec.md §4.A) —
/// a security guard against unbounded fan-out.
pub const MAX_IDS_PER_BULK_GET: usize = 5000;

/// Maximum rows per `batch_insert_memories` transaction (spec.md §4.A, §5).
pub const MAX_BATCH_INSERT_SIZE: usize = 500;

/// `top_m = max(k * TOP_M_MULTIPLIER, TOP_M_FLOOR)` per spec.md §4.E step 3.
pub const TOP_M_MULTIPLIER: usize = 4;
pub const TOP_M_FLOOR: usize = 50;

/// Minimum waypoint weight to expand across during query (spec.md §4.E step 5).
pub const WAYPOINT_EXPANSION_MIN_WEIGHT: f64 = 0.3;

/// Similarity threshold above which a newly-added memory is linked to its
/// top-1 neighbor (spec.md §4.E `add`).
pub const AUTO_LINK_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Initial waypoint weight for an auto-created link (spec.md §4.E `add`).
pub const AUTO_LINK_INITIAL_WEIGHT: f64 = 0.5;

/// Composite score weights (spec.md §4.E step 7 / §9 Open Question,
/// resolved in DESIGN.md): similarity, salience, recency, link weight.
pub const SCORE_WEIGHT_SIMILARITY: f64 = 0.6;
pub const SCORE_WEIGHT_SALIENCE: f64 = 0.2;
pub const SCORE_WEIGHT_RECENCY: f64 = 0.1;
pub const SCORE_WEIGHT_LINK: f64 = 0.1;

/// Recency half-scale τ, in milliseconds (spec.md §4.E step 7: "7 days").
pub const RECENCY_TAU_MS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Reinforcement bump applied to salience per similarity unit on a
/// returned query match (spec.md §4.E `query`, post-return reinforcement).
pub const QUERY_REINFORCEMENT_SALIENCE_FACTOR: f64 = 0.05;

/// Waypoint weight bump between co-returned pairs (spec.md §4.E `query`).
pub const QUERY_REINFORCEMENT_LINK_DELTA: f64 = 0.05;

/// Dual-phase decay constants (spec.md §4.G).
pub const DECAY_ALPHA: f64 = 0.7;
pub const DECAY_SLOW_DIVISOR: f64 = 4.0;

/// Consolidation thresholds (spec.md §4.G).
pub const CONSOLIDATION_SIMHASH_MAX_HAMMING: u32 = 3;
pub const CONSOLIDATION_MIN_COSINE_SIMILARITY: f64 = 0.95;

/// Default retraining threshold for the sector classifier's learned model
/// (spec.md §4.D).
pub const CLASSIFIER_RETRAIN_MIN_NEW_LABELS: usize = 500;

/// Tie-break margin: if the top two sector scores differ by less than
/// this, prefer `semantic` (spec.md §4.D).
pub const CLASSIFIER_TIE_BREAK_MARGIN: f64 = 0.02;

/// Maximum auxiliary sectors returned alongside the primary (spec.md §4.D).
pub const CLASSIFIER_MAX_AUX_SECTORS: usize = 2;

/// Retry policy for embedder calls (spec.md §4.C, §7).
pub const EMBEDDER_RETRY_BASE_MS: u64 = 250;
pub const EMBEDDER_RETRY_CAP_MS: u64 = 4_000;
pub const EMBEDDER_RETRY_MIN_ATTEMPTS: u32 = 3;

/// Deadlines per spec.md §5.
pub const DEADLINE_EMBED_SECS: u64 = 15;
pub const DEADLINE_SEARCH_SECS: u64 = 5;
pub const DEADLINE_WRITE_SECS: u64 = 10;
