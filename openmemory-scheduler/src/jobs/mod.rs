//! The five periodic jobs (spec.md §4.I). Each is a plain function over
//! one tenant and the narrow store trait(s) it needs — the runner owns
//! cadence, locking, and fan-out across tenants.

pub mod classifier_retrain;
pub mod consolidate;
pub mod decay;
pub mod temporal_decay;
pub mod user_summary;
