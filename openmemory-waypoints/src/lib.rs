//! Waypoint graph (spec.md §4.F): weighted, directed links between
//! memories. `link`/`neighbors`/`reinforce_pairs` operate directly over
//! the Metadata Store; `graph` offers an in-memory `petgraph` snapshot for
//! callers doing many neighbor lookups in a row (e.g. query-time
//! one-hop expansion, spec.md §4.E step 5).

pub mod graph;
pub mod link;

pub use link::{link, neighbors, reinforce_pairs};
