//! Sector classifier (spec.md §4.D): assigns a primary sector plus up to
//! `max_aux_sectors` auxiliary sectors to a piece of text, using a
//! per-tenant learned linear model when one has been trained and falling
//! back to a hand-curated lexical rule set otherwise.

pub mod engine;
pub mod features;
pub mod learned;
pub mod lexical;

pub use engine::CompositeClassifier;
pub use features::{extract_features, FEATURE_DIM};
