//! Temporal Graph (spec.md §4.H): time-bound facts and the edges between
//! them, layered as domain logic over `openmemory_core::traits::TemporalStore`.

pub mod decay;
pub mod edges;
pub mod facts;
pub mod timeline;
pub mod volatility;

pub use decay::confidence_decay;
pub use edges::{insert_edge, invalidate_edge};
pub use facts::{insert_fact, invalidate_fact};
pub use timeline::{compare, get_subject_timeline, CompareResult};
pub use volatility::{get_volatile, VolatileEntry};
