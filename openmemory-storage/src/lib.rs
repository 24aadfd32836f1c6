//! SQLite-backed implementation of `openmemory_core`'s `MetadataStore`,
//! `TemporalStore`, and `ClassifierModelStore` traits: one writer
//! connection, a small read pool, versioned migrations applied at
//! startup.

pub mod codec;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::SqliteStore;

use openmemory_core::OpenMemoryError;

/// Map a lower-level storage failure (SQLite error, serialization error,
/// lock poisoning) into the shared error taxonomy.
pub(crate) fn to_storage_err(reason: impl Into<String>) -> OpenMemoryError {
    OpenMemoryError::StoreUnavailable {
        reason: reason.into(),
    }
}
