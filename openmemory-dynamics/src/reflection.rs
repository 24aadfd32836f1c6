//! Reflection (spec.md §4.G): regenerate `generated_summary` per memory
//! and the user-level `summary`, both as plain concatenation of top-N
//! recent, high-salience memories. This is strictly a text operation over
//! data the core already owns — the spec is explicit that the actual
//! summarizer (an LLM or similar) is an external collaborator, so this
//! module only selects and formats, never paraphrases.

use openmemory_core::models::Memory;

/// Default number of source memories folded into a user-level summary.
pub const DEFAULT_SUMMARY_TOP_N: usize = 20;

/// Select and concatenate the top-N recent, high-salience memories into a
/// single user-level summary string. `memories` should already be scoped
/// to one tenant; selection ranks by `(salience desc, last_seen_at desc)`.
pub fn regenerate_user_summary(memories: &[Memory], top_n: usize) -> String {
    let mut ranked: Vec<&Memory> = memories.iter().collect();
    ranked.sort_by(|a, b| {
        b.salience
            .partial_cmp(&a.salience)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.last_seen_at.cmp(&a.last_seen_at))
    });

    ranked
        .into_iter()
        .take(top_n)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Regenerate a single memory's `generated_summary` from its own content
/// plus its top-1-hop waypoint neighbors' content, when neighbor context
/// is available. With no neighbors this just echoes the memory's content.
pub fn regenerate_memory_summary(memory: &Memory, neighbor_contents: &[&str]) -> String {
    if neighbor_contents.is_empty() {
        return memory.content.clone();
    }
    let mut parts = vec![memory.content.as_str()];
    parts.extend(neighbor_contents.iter().copied());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use openmemory_core::sector::Sector;
    use openmemory_core::tenant::TenantId;
    use std::collections::{BTreeMap, BTreeSet};

    fn memory(content: &str, salience: f64, last_seen_at: chrono::DateTime<Utc>) -> Memory {
        let now = Utc::now();
        Memory {
            id: content.to_string(),
            user_id: TenantId::user("u1"),
            content: content.to_string(),
            primary_sector: Sector::Semantic,
            auxiliary_sectors: BTreeSet::new(),
            tags: BTreeSet::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_seen_at,
            salience,
            decay_lambda: 0.03,
            version: 1,
            segment: 0,
            simhash: 0,
            mean_vec: vec![],
            compressed_vec: None,
            feedback_score: 0.0,
            generated_summary: None,
        }
    }

    #[test]
    fn summary_ranks_by_salience_then_recency() {
        let now = Utc::now();
        let memories = vec![
            memory("low", 0.2, now),
            memory("high", 0.9, now - Duration::days(1)),
            memory("mid", 0.5, now),
        ];
        let summary = regenerate_user_summary(&memories, 2);
        assert_eq!(summary, "high\nmid");
    }

    #[test]
    fn top_n_caps_selection() {
        let memories: Vec<Memory> = (0..10)
            .map(|i| memory(&format!("m{i}"), 0.5, Utc::now()))
            .collect();
        let summary = regenerate_user_summary(&memories, 3);
        assert_eq!(summary.lines().count(), 3);
    }

    #[test]
    fn memory_summary_without_neighbors_echoes_content() {
        let m = memory("solo", 0.5, Utc::now());
        assert_eq!(regenerate_memory_summary(&m, &[]), "solo");
    }

    #[test]
    fn memory_summary_folds_in_neighbor_content() {
        let m = memory("origin", 0.5, Utc::now());
        assert_eq!(
            regenerate_memory_summary(&m, &["neighbor one", "neighbor two"]),
            "origin\nneighbor one\nneighbor two"
        );
    }
}
