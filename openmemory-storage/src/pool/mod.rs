//! Connection pool: one writer, N readers.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use openmemory_core::config::StorageConfig;
use openmemory_core::OpenMemoryResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, config: &StorageConfig) -> OpenMemoryResult<Self> {
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config.read_pool_size, config)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// In-memory pool for tests. Readers are isolated from the writer, so
    /// `MemoryStore` routes all reads through the writer in this mode.
    pub fn open_in_memory(config: &StorageConfig) -> OpenMemoryResult<Self> {
        let writer = WriteConnection::open_in_memory(config)?;
        let readers = ReadPool::open_in_memory(1, config)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
