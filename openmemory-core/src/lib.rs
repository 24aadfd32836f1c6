//! # openmemory-core
//!
//! Foundation crate for the OpenMemory long-term memory engine.
//! Defines the data model, error taxonomy, configuration surface, and
//! the traits every other crate in the workspace implements or consumes.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod sector;
pub mod simhash;
pub mod tenant;
pub mod traits;

pub use config::OpenMemoryConfig;
pub use errors::{OpenMemoryError, OpenMemoryResult};
pub use sector::Sector;
pub use tenant::TenantId;
