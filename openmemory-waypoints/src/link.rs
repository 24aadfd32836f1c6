//! Direct waypoint mutation operations (spec.md §4.F): `link`,
//! `neighbors`, `reinforce_pairs`. Thin domain functions over
//! `MetadataStore` — all persistence and the tenant guard already live
//! there (spec.md §4.A, §4.J).

use chrono::Utc;

use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};
use openmemory_core::models::Waypoint;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::MetadataStore;

/// Upsert a weighted link `src -> dst`. Weight is clamped to `[0,1]`.
/// Self-links are forbidden (spec.md §4.F).
pub fn link(
    store: &dyn MetadataStore,
    src: &str,
    dst: &str,
    weight: f64,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    if src == dst {
        return Err(OpenMemoryError::invalid_input(format!(
            "waypoint self-link rejected for memory {src}"
        )));
    }
    let now = Utc::now();
    let existing = store.get_waypoint(src, dst, user_id)?;
    let created_at = existing.as_ref().map(|w| w.created_at).unwrap_or(now);
    let waypoint = Waypoint {
        src_id: src.to_string(),
        dst_id: dst.to_string(),
        user_id: user_id.clone(),
        weight: Waypoint::clamp_weight(weight),
        created_at,
        updated_at: now,
    };
    store.upsert_waypoint(&waypoint)
}

/// One-hop neighbors of `id` with weight `>= min_weight`, deterministically
/// ordered by weight desc, id asc (spec.md §4.F).
pub fn neighbors(
    store: &dyn MetadataStore,
    id: &str,
    user_id: &TenantId,
    min_weight: f64,
) -> OpenMemoryResult<Vec<(String, f64)>> {
    let mut out: Vec<(String, f64)> = store
        .get_waypoints_from(id, user_id)?
        .into_iter()
        .filter(|w| w.weight >= min_weight)
        .map(|w| (w.dst_id, w.weight))
        .collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    Ok(out)
}

/// Batched weight increase for co-occurring pairs, e.g. query-time
/// reinforcement of co-returned memories (spec.md §4.E, §4.F).
pub fn reinforce_pairs(
    store: &dyn MetadataStore,
    pairs: &[(String, String)],
    user_id: &TenantId,
    delta: f64,
) -> OpenMemoryResult<()> {
    let filtered: Vec<(String, String)> = pairs.iter().filter(|(a, b)| a != b).cloned().collect();
    if filtered.is_empty() {
        return Ok(());
    }
    store.reinforce_waypoints(&filtered, delta, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_storage::engine::SqliteStore;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn self_link_rejected() {
        let s = store();
        let user = TenantId::user("u1");
        let err = link(&s, "m1", "m1", 0.5, &user).unwrap_err();
        assert!(matches!(err, OpenMemoryError::InvalidInput { .. }));
    }

    #[test]
    fn weight_clamped_above_one() {
        let s = store();
        let user = TenantId::user("u1");
        link(&s, "m1", "m2", 5.0, &user).unwrap();
        let n = neighbors(&s, "m1", &user, 0.0).unwrap();
        assert_eq!(n, vec![("m2".to_string(), 1.0)]);
    }

    #[test]
    fn neighbors_ordered_by_weight_desc_then_id_asc() {
        let s = store();
        let user = TenantId::user("u1");
        link(&s, "m1", "m3", 0.5, &user).unwrap();
        link(&s, "m1", "m2", 0.5, &user).unwrap();
        link(&s, "m1", "m4", 0.9, &user).unwrap();
        let n = neighbors(&s, "m1", &user, 0.0).unwrap();
        assert_eq!(
            n,
            vec![
                ("m4".to_string(), 0.9),
                ("m2".to_string(), 0.5),
                ("m3".to_string(), 0.5),
            ]
        );
    }

    #[test]
    fn min_weight_filters_weak_links() {
        let s = store();
        let user = TenantId::user("u1");
        link(&s, "m1", "m2", 0.1, &user).unwrap();
        let n = neighbors(&s, "m1", &user, 0.3).unwrap();
        assert!(n.is_empty());
    }

    #[test]
    fn reinforce_pairs_skips_self_pairs() {
        let s = store();
        let user = TenantId::user("u1");
        link(&s, "m1", "m2", 0.5, &user).unwrap();
        reinforce_pairs(
            &s,
            &[("m1".to_string(), "m1".to_string()), ("m1".to_string(), "m2".to_string())],
            &user,
            0.05,
        )
        .unwrap();
        let n = neighbors(&s, "m1", &user, 0.0).unwrap();
        assert_eq!(n[0].1, 0.55);
    }
}
