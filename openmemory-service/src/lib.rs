//! Public core API (spec.md §4.E, §4.J; SPEC_FULL.md §2): `MemoryService`
//! orchestrates the Sector Classifier, Embedder, Vector Store, Metadata
//! Store, Waypoint Graph, and Dynamics Engine behind one `add`/`query`/
//! `reinforce`/`update`/`delete`/`list` surface; `TemporalService` is the
//! equivalent facade over the Temporal Graph. Both enforce the Tenant
//! Guard on every entry point rather than trusting a caller-supplied
//! `TenantId`.

pub mod health;
pub mod logging;
pub mod service;
pub mod temporal_service;
pub mod tenant_guard;

pub use service::{
    AddOptions, AddResult, DedupeDecision, DeleteResult, MemoryService, QueryOutcome,
    ReinforceResult, ServiceStore, UpdatePartial, UpdateResult,
};
pub use temporal_service::TemporalService;
