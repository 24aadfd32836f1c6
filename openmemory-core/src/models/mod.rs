mod health;
mod memory;
mod temporal;
mod user;
mod waypoint;

pub use health::{DegradationEvent, HealthMetrics, HealthReport, HealthStatus, SubsystemHealth};
pub use memory::{Memory, MemoryFilters, QueryCandidate, ScoredMemory, TimeRange};
pub use temporal::{FactQuery, TemporalEdge, TemporalFact, TimelineEvent, TimelineEventKind};
pub use user::User;
pub use waypoint::Waypoint;
