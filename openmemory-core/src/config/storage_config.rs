use serde::{Deserialize, Serialize};

/// Embedded SQLite backend tuning (spec.md §6, grounded on the sibling
/// system's connection-pool pragma set).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file. `:memory:` is accepted for tests.
    pub db_path: String,
    pub read_pool_size: u32,
    pub busy_timeout_ms: u32,
    pub mmap_size_bytes: i64,
    pub cache_size_kib: i64,
    pub wal_autocheckpoint_pages: i32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "openmemory.db".to_string(),
            read_pool_size: 4,
            busy_timeout_ms: 5_000,
            mmap_size_bytes: 256 * 1024 * 1024,
            cache_size_kib: -64_000,
            wal_autocheckpoint_pages: 1_000,
        }
    }
}
