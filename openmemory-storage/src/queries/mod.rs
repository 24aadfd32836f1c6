//! Raw SQL per concern, grouped the way the sibling system's storage engine groups
//! them: one file per entity family, each exposing free functions that
//! take a `&Connection` rather than `self` so `engine::SqliteStore` can
//! route them through either the writer or the read pool.

pub mod classifier_ops;
pub mod memory_crud;
pub mod temporal_ops;
pub mod tenant_ops;
pub mod user_ops;
pub mod waypoint_ops;
