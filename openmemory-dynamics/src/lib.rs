//! Dynamics Engine (spec.md §4.G): dual-phase decay, consolidation of
//! near-duplicate memories, and reflection/summary regeneration.

pub mod consolidation;
pub mod decay;
pub mod reflection;

pub use consolidation::{plan_merges, MergeDecision};
pub use decay::{composite_score, dual_phase_decay, recency_score, salience_now, DecayBreakdown};
