//! In-memory petgraph snapshot of a tenant's waypoint graph, rebuilt from
//! the Metadata Store on demand. Used for one-hop expansion during query
//! (spec.md §4.E step 5) when the caller wants many neighbor lookups
//! without round-tripping to storage per memory.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;

use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;

pub type WaypointStableGraph = StableGraph<String, f64, Directed>;

/// A rebuildable, indexed view of one tenant's waypoint graph.
pub struct IndexedGraph {
    pub graph: WaypointStableGraph,
    node_index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, memory_id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(memory_id) {
            return idx;
        }
        let idx = self.graph.add_node(memory_id.to_string());
        self.node_index.insert(memory_id.to_string(), idx);
        idx
    }

    pub fn get_node(&self, memory_id: &str) -> Option<NodeIndex> {
        self.node_index.get(memory_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild the full waypoint graph for a tenant from storage. Memory-count
/// bounded by whatever `list_all_for_tenant` returns; callers expecting
/// very large tenants should prefer the direct `link::neighbors` query
/// instead of rebuilding the whole graph.
pub fn rebuild_from_storage(
    store: &dyn MetadataStore,
    user_id: &TenantId,
) -> OpenMemoryResult<IndexedGraph> {
    let mut graph = IndexedGraph::new();
    for memory in store.list_all_for_tenant(user_id)? {
        let src_idx = graph.ensure_node(&memory.id);
        for waypoint in store.get_waypoints_from(&memory.id, user_id)? {
            let dst_idx = graph.ensure_node(&waypoint.dst_id);
            graph.graph.add_edge(src_idx, dst_idx, waypoint.weight);
        }
    }
    Ok(graph)
}

/// Outgoing one-hop neighbors with weight `>= min_weight`, for use once a
/// graph snapshot has already been built (spec.md §4.E step 5).
pub fn expand_one_hop(graph: &IndexedGraph, memory_id: &str, min_weight: f64) -> Vec<(String, f64)> {
    let Some(idx) = graph.get_node(memory_id) else {
        return Vec::new();
    };
    let mut out: Vec<(String, f64)> = graph
        .graph
        .edges(idx)
        .filter(|edge| *edge.weight() >= min_weight)
        .map(|edge| {
            let target = &graph.graph[edge.target()];
            (target.clone(), *edge.weight())
        })
        .collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    out
}
