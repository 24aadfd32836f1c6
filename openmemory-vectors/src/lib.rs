//! Vector Store (spec.md §4.B): in-process, per-`(user_id, sector)` dense
//! vector buckets with exhaustive SIMD cosine scan. No ANN index — see
//! spec.md §1 Non-goals and SPEC_FULL.md's re-architecture notes on why
//! that tradeoff holds at the engine's target scale.

pub mod simd;
pub mod store;

pub use store::InMemoryVectorStore;
